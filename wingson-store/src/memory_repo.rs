use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use wingson_core::{Booking, Entity, Flight, Person, Repository, StoreResult};

/// Process-local repository keeping entities in insertion order
pub struct InMemoryRepository<T> {
    items: RwLock<Vec<T>>,
}

impl<T: Entity> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self::with_items(Vec::new())
    }

    pub fn with_items(items: Vec<T>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

impl<T: Entity> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for InMemoryRepository<T> {
    async fn get(&self, id: i32) -> StoreResult<Option<T>> {
        let items = self.items.read().await;
        Ok(items.iter().find(|item| item.id() == id).cloned())
    }

    async fn get_all(&self) -> StoreResult<Vec<T>> {
        Ok(self.items.read().await.clone())
    }

    async fn save(&self, entity: &T) -> StoreResult<()> {
        let mut items = self.items.write().await;
        match items.iter_mut().find(|item| item.id() == entity.id()) {
            Some(existing) => *existing = entity.clone(),
            None => items.push(entity.clone()),
        }
        Ok(())
    }
}

/// Bookings whose customer, passengers and flight are read from the live
/// person and flight stores, matching the joins of the Postgres backend.
/// The stored copy is only used for people or flights missing from those stores.
pub struct MemoryBookingRepository {
    bookings: InMemoryRepository<Booking>,
    persons: Arc<InMemoryRepository<Person>>,
    flights: Arc<InMemoryRepository<Flight>>,
}

impl MemoryBookingRepository {
    pub fn new(
        bookings: Vec<Booking>,
        persons: Arc<InMemoryRepository<Person>>,
        flights: Arc<InMemoryRepository<Flight>>,
    ) -> Self {
        Self {
            bookings: InMemoryRepository::with_items(bookings),
            persons,
            flights,
        }
    }

    pub async fn len(&self) -> usize {
        self.bookings.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.bookings.is_empty().await
    }

    async fn resolve(&self, mut booking: Booking) -> StoreResult<Booking> {
        if let Some(customer) = self.persons.get(booking.customer.id).await? {
            booking.customer = customer;
        }
        for passenger in booking.passengers.iter_mut() {
            if let Some(current) = self.persons.get(passenger.id).await? {
                *passenger = current;
            }
        }
        if let Some(flight) = self.flights.get(booking.flight.id).await? {
            booking.flight = flight;
        }
        Ok(booking)
    }
}

#[async_trait]
impl Repository<Booking> for MemoryBookingRepository {
    async fn get(&self, id: i32) -> StoreResult<Option<Booking>> {
        match self.bookings.get(id).await? {
            Some(booking) => self.resolve(booking).await.map(Some),
            None => Ok(None),
        }
    }

    async fn get_all(&self) -> StoreResult<Vec<Booking>> {
        let mut resolved = Vec::new();
        for booking in self.bookings.get_all().await? {
            resolved.push(self.resolve(booking).await?);
        }
        Ok(resolved)
    }

    async fn save(&self, booking: &Booking) -> StoreResult<()> {
        self.bookings.save(booking).await
    }
}
