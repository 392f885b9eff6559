use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::{Flight, Person};

/// A customer's reservation of one or more passengers on a flight
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Booking {
    pub id: i32,
    pub number: String,
    pub customer: Person,
    pub passengers: Vec<Person>,
    pub flight: Flight,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn is_for_flight(&self, flight_number: &str) -> bool {
        self.flight.number == flight_number
    }

    pub fn has_passenger(&self, person_id: i32) -> bool {
        self.passengers.iter().any(|p| p.id == person_id)
    }
}
