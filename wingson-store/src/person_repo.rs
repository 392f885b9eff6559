use async_trait::async_trait;
use sqlx::PgPool;
use wingson_core::{Gender, Person, Repository, StoreError, StoreResult};
use crate::backend_error;

pub struct PgPersonRepository {
    pool: PgPool,
}

impl PgPersonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct PersonRow {
    pub id: i32,
    pub name: String,
    pub gender: String,
    pub address: String,
}

impl TryFrom<PersonRow> for Person {
    type Error = StoreError;

    fn try_from(row: PersonRow) -> Result<Self, Self::Error> {
        let gender = row
            .gender
            .parse::<Gender>()
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(Person {
            id: row.id,
            name: row.name,
            gender,
            address: row.address,
        })
    }
}

#[async_trait]
impl Repository<Person> for PgPersonRepository {
    async fn get(&self, id: i32) -> StoreResult<Option<Person>> {
        let row = sqlx::query_as::<_, PersonRow>(
            "SELECT id, name, gender, address FROM persons WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend_error)?;

        row.map(Person::try_from).transpose()
    }

    async fn get_all(&self) -> StoreResult<Vec<Person>> {
        let rows = sqlx::query_as::<_, PersonRow>(
            "SELECT id, name, gender, address FROM persons ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend_error)?;

        rows.into_iter().map(Person::try_from).collect()
    }

    async fn save(&self, person: &Person) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO persons (id, name, gender, address)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name, gender = EXCLUDED.gender, address = EXCLUDED.address
            "#,
        )
        .bind(person.id)
        .bind(&person.name)
        .bind(person.gender.to_string())
        .bind(&person.address)
        .execute(&self.pool)
        .await
        .map_err(backend_error)?;

        Ok(())
    }
}
