use std::sync::Arc;
use wingson_booking::{BookingService, PersonService};
use wingson_core::{Booking, Flight, Person, Repository};

#[derive(Clone)]
pub struct AppState {
    pub persons: Arc<PersonService>,
    pub bookings: Arc<BookingService>,
}

impl AppState {
    pub fn new(
        persons: Arc<dyn Repository<Person>>,
        bookings: Arc<dyn Repository<Booking>>,
        flights: Arc<dyn Repository<Flight>>,
    ) -> Self {
        Self {
            persons: Arc::new(PersonService::new(persons.clone())),
            bookings: Arc::new(BookingService::new(persons, bookings, flights)),
        }
    }
}
