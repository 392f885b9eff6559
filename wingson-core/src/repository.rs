use async_trait::async_trait;
use crate::{Booking, Flight, Person, StoreResult};

/// Anything a repository can key by integer identifier
pub trait Entity: Clone + Send + Sync + 'static {
    fn id(&self) -> i32;
}

impl Entity for Person {
    fn id(&self) -> i32 {
        self.id
    }
}

impl Entity for Flight {
    fn id(&self) -> i32 {
        self.id
    }
}

impl Entity for Booking {
    fn id(&self) -> i32 {
        self.id
    }
}

/// Storage contract required by the services, one instance per entity kind
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Fetch a single entity by identifier
    async fn get(&self, id: i32) -> StoreResult<Option<T>>;

    /// Fetch every entity, in storage enumeration order
    async fn get_all(&self) -> StoreResult<Vec<T>>;

    /// Insert the entity, or replace the stored one with the same identifier
    async fn save(&self, entity: &T) -> StoreResult<()>;
}
