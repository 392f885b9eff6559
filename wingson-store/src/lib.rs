pub mod app_config;
pub mod database;
pub mod memory_repo;
pub mod person_repo;
pub mod flight_repo;
pub mod booking_repo;
pub mod seed;

pub use database::DbClient;
pub use memory_repo::{InMemoryRepository, MemoryBookingRepository};
pub use person_repo::PgPersonRepository;
pub use flight_repo::PgFlightRepository;
pub use booking_repo::PgBookingRepository;
pub use seed::{MemoryStores, SeedData};

use wingson_core::StoreError;

pub(crate) fn backend_error(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}
