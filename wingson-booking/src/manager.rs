use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};
use wingson_core::{Booking, Flight, Person, Repository, StoreError};
use crate::locks::FlightLocks;
use crate::numbering::{generate_booking_number, IdAllocator};

/// Validates and creates bookings, and answers passenger queries
pub struct BookingService {
    persons: Arc<dyn Repository<Person>>,
    bookings: Arc<dyn Repository<Booking>>,
    flights: Arc<dyn Repository<Flight>>,
    locks: FlightLocks,
    ids: IdAllocator,
}

impl BookingService {
    pub fn new(
        persons: Arc<dyn Repository<Person>>,
        bookings: Arc<dyn Repository<Booking>>,
        flights: Arc<dyn Repository<Flight>>,
    ) -> Self {
        Self {
            persons,
            bookings,
            flights,
            locks: FlightLocks::new(),
            ids: IdAllocator::new(),
        }
    }

    /// Passengers of every booking on `flight_number`, concatenated in booking order
    pub async fn get_passengers_by_flight_number(
        &self,
        flight_number: &str,
    ) -> Result<Vec<Person>, BookingError> {
        let passengers = self
            .bookings
            .get_all()
            .await?
            .into_iter()
            .filter(|b| b.is_for_flight(flight_number))
            .flat_map(|b| b.passengers)
            .collect();

        Ok(passengers)
    }

    /// Book `target_person_id` on `flight_number` on behalf of `customer_id`.
    ///
    /// Checks run in order and the first failure is returned: customer,
    /// target person, duplicate passenger, flight. Nothing is written unless
    /// every check passes.
    pub async fn create_booking_for_flight(
        &self,
        customer_id: i32,
        target_person_id: i32,
        flight_number: &str,
    ) -> Result<Booking, BookingError> {
        let customer = self
            .persons
            .get(customer_id)
            .await?
            .ok_or(BookingError::CustomerNotFound(customer_id))?;

        let target = self
            .persons
            .get(target_person_id)
            .await?
            .ok_or(BookingError::PersonNotFound(target_person_id))?;

        // Held until the booking is saved
        let _flight_guard = self.locks.acquire(flight_number).await;

        let all_bookings = self.bookings.get_all().await?;
        let already_booked = all_bookings
            .iter()
            .filter(|b| b.is_for_flight(flight_number))
            .any(|b| b.has_passenger(target_person_id));
        if already_booked {
            warn!("Person {} is already booked on flight {}", target_person_id, flight_number);
            return Err(BookingError::AlreadyBooked);
        }

        let flight = self.find_flight(flight_number).await?;

        let id = self
            .ids
            .next_id(all_bookings.iter().map(|b| b.id))
            .await
            .ok_or_else(|| {
                error!("Booking id space exhausted");
                BookingError::IdExhausted
            })?;
        let booking = Booking {
            id,
            number: generate_booking_number(),
            customer,
            passengers: vec![target],
            flight,
            created_at: Utc::now(),
        };

        self.bookings.save(&booking).await?;

        info!(
            "Booking {} ({}) created on flight {} for person {} by customer {}",
            booking.id, booking.number, flight_number, target_person_id, customer_id
        );
        Ok(booking)
    }

    async fn find_flight(&self, flight_number: &str) -> Result<Flight, BookingError> {
        let mut matches = self
            .flights
            .get_all()
            .await?
            .into_iter()
            .filter(|f| f.number == flight_number);

        let flight = matches
            .next()
            .ok_or_else(|| BookingError::FlightNotFound(flight_number.to_string()))?;

        if matches.next().is_some() {
            error!("Flight number {} is not unique in storage", flight_number);
            return Err(BookingError::DuplicateFlightNumber(flight_number.to_string()));
        }

        Ok(flight)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("A customer with id={0} was not found")]
    CustomerNotFound(i32),

    #[error("A person with id={0} was not found")]
    PersonNotFound(i32),

    #[error("A passenger has already registered for this flight")]
    AlreadyBooked,

    #[error("A flight with number={0} does not exist")]
    FlightNotFound(String),

    #[error("More than one flight has number={0}")]
    DuplicateFlightNumber(String),

    #[error("No booking identifiers left to assign")]
    IdExhausted,

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use wingson_core::{Gender, StoreResult};
    use wingson_store::InMemoryRepository;

    struct Fixture {
        persons: Arc<InMemoryRepository<Person>>,
        bookings: Arc<InMemoryRepository<Booking>>,
        flights: Arc<InMemoryRepository<Flight>>,
    }

    impl Fixture {
        fn new(bookings: Vec<Booking>, flights: Vec<Flight>) -> Self {
            Self {
                persons: Arc::new(InMemoryRepository::with_items(vec![
                    person(1),
                    person(2),
                    person(3),
                ])),
                bookings: Arc::new(InMemoryRepository::with_items(bookings)),
                flights: Arc::new(InMemoryRepository::with_items(flights)),
            }
        }

        fn service(&self) -> BookingService {
            BookingService::new(self.persons.clone(), self.bookings.clone(), self.flights.clone())
        }
    }

    fn person(id: i32) -> Person {
        let gender = if id % 2 == 0 { Gender::Female } else { Gender::Male };
        Person::new(id, format!("Person {}", id), gender, format!("Street {}", id))
    }

    fn booking(id: i32, flight: &Flight, passenger_ids: &[i32]) -> Booking {
        Booking {
            id,
            number: format!("WO-{:06}", id),
            customer: person(1),
            passengers: passenger_ids.iter().map(|p| person(*p)).collect(),
            flight: flight.clone(),
            created_at: Utc::now(),
        }
    }

    fn pz696() -> Flight {
        Flight::new(1, "PZ696")
    }

    fn bb124() -> Flight {
        Flight::new(2, "BB124")
    }

    #[tokio::test]
    async fn test_passengers_for_unknown_flight_is_empty() {
        let fixture = Fixture::new(vec![booking(1, &pz696(), &[1, 2])], vec![pz696()]);
        let passengers = fixture.service().get_passengers_by_flight_number("XX000").await.unwrap();
        assert!(passengers.is_empty());
    }

    #[tokio::test]
    async fn test_passengers_are_flattened_in_booking_order() {
        let fixture = Fixture::new(
            vec![
                booking(1, &pz696(), &[3, 1]),
                booking(2, &bb124(), &[2]),
                booking(3, &pz696(), &[2]),
            ],
            vec![pz696(), bb124()],
        );

        let passengers = fixture.service().get_passengers_by_flight_number("PZ696").await.unwrap();
        let ids: Vec<i32> = passengers.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn test_flight_number_match_is_case_sensitive() {
        let fixture = Fixture::new(vec![booking(1, &pz696(), &[1])], vec![pz696()]);
        let passengers = fixture.service().get_passengers_by_flight_number("pz696").await.unwrap();
        assert!(passengers.is_empty());
    }

    #[tokio::test]
    async fn test_missing_customer() {
        let fixture = Fixture::new(vec![], vec![pz696()]);
        let err = fixture.service().create_booking_for_flight(20, 20, "PZ696").await.unwrap_err();

        assert!(matches!(err, BookingError::CustomerNotFound(20)));
        assert_eq!(err.to_string(), "A customer with id=20 was not found");
        assert!(fixture.bookings.is_empty().await);
    }

    #[tokio::test]
    async fn test_missing_target_person() {
        let fixture = Fixture::new(vec![], vec![pz696()]);
        let err = fixture.service().create_booking_for_flight(1, 20, "PZ696").await.unwrap_err();

        assert_eq!(err.to_string(), "A person with id=20 was not found");
        assert!(fixture.bookings.is_empty().await);
    }

    #[tokio::test]
    async fn test_customer_checked_before_target() {
        let fixture = Fixture::new(vec![], vec![]);
        let err = fixture.service().create_booking_for_flight(30, 40, "PZ696").await.unwrap_err();
        assert!(matches!(err, BookingError::CustomerNotFound(30)));
    }

    #[tokio::test]
    async fn test_already_booked_by_another_customer() {
        let mut existing = booking(5, &pz696(), &[2]);
        existing.customer = person(3);
        let fixture = Fixture::new(vec![existing], vec![pz696()]);

        let err = fixture.service().create_booking_for_flight(1, 2, "PZ696").await.unwrap_err();
        assert_eq!(err.to_string(), "A passenger has already registered for this flight");
        assert_eq!(fixture.bookings.len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_check_runs_before_flight_lookup() {
        // Flight repository is empty: AlreadyBooked still wins
        let fixture = Fixture::new(vec![booking(5, &pz696(), &[2])], vec![]);
        let err = fixture.service().create_booking_for_flight(1, 2, "PZ696").await.unwrap_err();
        assert!(matches!(err, BookingError::AlreadyBooked));
    }

    #[tokio::test]
    async fn test_booked_on_other_flight_is_allowed() {
        let fixture = Fixture::new(vec![booking(5, &bb124(), &[2])], vec![pz696(), bb124()]);
        let created = fixture.service().create_booking_for_flight(1, 2, "PZ696").await.unwrap();
        assert_eq!(created.flight, pz696());
    }

    #[tokio::test]
    async fn test_missing_flight() {
        let fixture = Fixture::new(vec![booking(5, &pz696(), &[3])], vec![]);
        let err = fixture.service().create_booking_for_flight(1, 1, "testFlight").await.unwrap_err();

        assert_eq!(err.to_string(), "A flight with number=testFlight does not exist");
        assert_eq!(fixture.bookings.len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_flight_number_is_rejected() {
        let fixture = Fixture::new(vec![], vec![pz696(), Flight::new(9, "PZ696")]);
        let err = fixture.service().create_booking_for_flight(1, 2, "PZ696").await.unwrap_err();

        assert!(matches!(err, BookingError::DuplicateFlightNumber(ref n) if n == "PZ696"));
        assert!(fixture.bookings.is_empty().await);
    }

    #[tokio::test]
    async fn test_create_booking() {
        let fixture = Fixture::new(
            vec![booking(23, &pz696(), &[3]), booking(4, &bb124(), &[3])],
            vec![pz696(), bb124()],
        );

        let created = fixture.service().create_booking_for_flight(1, 2, "PZ696").await.unwrap();

        assert_eq!(created.id, 24);
        assert_eq!(created.flight, pz696());
        assert_eq!(created.customer.id, 1);
        assert_eq!(created.passengers.len(), 1);
        assert_eq!(created.passengers[0].id, 2);
        assert!(created.number.starts_with("WO-"));

        let stored = fixture.bookings.get(24).await.unwrap().expect("booking saved");
        assert_eq!(stored, created);
        assert_eq!(fixture.bookings.len().await, 3);
    }

    #[tokio::test]
    async fn test_customer_can_book_themselves() {
        let fixture = Fixture::new(vec![], vec![pz696()]);
        let created = fixture.service().create_booking_for_flight(3, 3, "PZ696").await.unwrap();

        assert_eq!(created.id, 1);
        assert_eq!(created.customer.id, 3);
        assert_eq!(created.passengers[0].id, 3);
    }

    #[tokio::test]
    async fn test_concurrent_requests_book_person_once() {
        let fixture = Fixture::new(vec![], vec![pz696()]);
        let service = Arc::new(fixture.service());

        let first = {
            let service = service.clone();
            tokio::spawn(async move { service.create_booking_for_flight(1, 2, "PZ696").await })
        };
        let second = {
            let service = service.clone();
            tokio::spawn(async move { service.create_booking_for_flight(3, 2, "PZ696").await })
        };

        let results = vec![first.await.unwrap(), second.await.unwrap()];
        let created = results.iter().filter(|r| r.is_ok()).count();
        let rejected = results
            .iter()
            .filter(|r| matches!(r, Err(BookingError::AlreadyBooked)))
            .count();

        assert_eq!(created, 1);
        assert_eq!(rejected, 1);
        assert_eq!(fixture.bookings.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_flights_get_distinct_ids() {
        let fixture = Fixture::new(vec![], vec![pz696(), bb124()]);
        let service = Arc::new(fixture.service());

        let (a, b) = tokio::join!(
            service.create_booking_for_flight(1, 2, "PZ696"),
            service.create_booking_for_flight(1, 3, "BB124"),
        );
        assert_ne!(a.unwrap().id, b.unwrap().id);
    }

    #[tokio::test]
    async fn test_id_overflow_is_an_error() {
        let fixture = Fixture::new(vec![booking(i32::MAX, &bb124(), &[3])], vec![pz696(), bb124()]);
        let err = fixture.service().create_booking_for_flight(1, 1, "PZ696").await.unwrap_err();

        assert!(matches!(err, BookingError::IdExhausted));
        assert_eq!(fixture.bookings.len().await, 1);
    }

    struct BrokenBookings;

    #[async_trait]
    impl Repository<Booking> for BrokenBookings {
        async fn get(&self, _id: i32) -> StoreResult<Option<Booking>> {
            Err(StoreError::Backend("connection refused".to_string()))
        }

        async fn get_all(&self) -> StoreResult<Vec<Booking>> {
            Err(StoreError::Backend("connection refused".to_string()))
        }

        async fn save(&self, _booking: &Booking) -> StoreResult<()> {
            Err(StoreError::Backend("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_storage_failure_is_propagated() {
        let fixture = Fixture::new(vec![], vec![pz696()]);
        let service = BookingService::new(
            fixture.persons.clone(),
            Arc::new(BrokenBookings),
            fixture.flights.clone(),
        );

        let err = service.create_booking_for_flight(1, 2, "PZ696").await.unwrap_err();
        assert!(matches!(err, BookingError::Store(StoreError::Backend(_))));

        let err = service.get_passengers_by_flight_number("PZ696").await.unwrap_err();
        assert!(matches!(err, BookingError::Store(_)));
    }
}
