use std::sync::Arc;
use tracing::{debug, info};
use wingson_core::{Gender, Person, Repository, StoreError};

/// Read and address-update operations on people
pub struct PersonService {
    persons: Arc<dyn Repository<Person>>,
}

impl PersonService {
    pub fn new(persons: Arc<dyn Repository<Person>>) -> Self {
        Self { persons }
    }

    pub async fn get_person_by_id(&self, person_id: i32) -> Result<Person, PersonError> {
        self.persons
            .get(person_id)
            .await?
            .ok_or(PersonError::NotFound(person_id))
    }

    /// All persons of the given gender, in storage order
    pub async fn get_persons_by_gender(&self, gender: Gender) -> Result<Vec<Person>, PersonError> {
        let persons: Vec<Person> = self
            .persons
            .get_all()
            .await?
            .into_iter()
            .filter(|p| p.gender == gender)
            .collect();

        debug!("Found {} persons with gender {}", persons.len(), gender);
        Ok(persons)
    }

    pub async fn update_person_address(
        &self,
        person_id: i32,
        new_address: String,
    ) -> Result<Person, PersonError> {
        let mut person = self.get_person_by_id(person_id).await?;
        person.address = new_address;
        self.persons.save(&person).await?;

        info!("Updated address of person {}", person_id);
        Ok(person)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PersonError {
    #[error("A person with id={0} does not exist")]
    NotFound(i32),

    #[error(transparent)]
    Store(#[from] StoreError),
}
