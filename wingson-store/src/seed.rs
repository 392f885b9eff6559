use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use wingson_core::{Booking, Flight, Person, StoreError, StoreResult};
use crate::{InMemoryRepository, MemoryBookingRepository};

/// Initial data set for the memory backend
#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub persons: Vec<Person>,
    #[serde(default)]
    pub flights: Vec<Flight>,
    #[serde(default)]
    pub bookings: Vec<Booking>,
}

pub struct MemoryStores {
    pub persons: Arc<InMemoryRepository<Person>>,
    pub flights: Arc<InMemoryRepository<Flight>>,
    pub bookings: Arc<MemoryBookingRepository>,
}

impl SeedData {
    pub fn from_json(source: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Backend(format!("{}: {}", path.display(), e)))?;
        let seed = Self::from_json(&source)?;
        info!(
            "Loaded seed data from {}: {} persons, {} flights, {} bookings",
            path.display(),
            seed.persons.len(),
            seed.flights.len(),
            seed.bookings.len()
        );
        Ok(seed)
    }

    pub fn into_memory_stores(self) -> MemoryStores {
        let persons = Arc::new(InMemoryRepository::with_items(self.persons));
        let flights = Arc::new(InMemoryRepository::with_items(self.flights));
        let bookings = Arc::new(MemoryBookingRepository::new(
            self.bookings,
            persons.clone(),
            flights.clone(),
        ));
        MemoryStores {
            persons,
            flights,
            bookings,
        }
    }
}
