pub mod person;
pub mod flight;
pub mod booking;
pub mod repository;

pub use person::{Gender, Person};
pub use flight::Flight;
pub use booking::Booking;
pub use repository::{Entity, Repository};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Backend(String),
    #[error("Stored data could not be decoded: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
