use async_trait::async_trait;
use sqlx::PgPool;
use wingson_core::{Flight, Repository, StoreResult};
use crate::backend_error;

pub struct PgFlightRepository {
    pool: PgPool,
}

impl PgFlightRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct FlightRow {
    id: i32,
    number: String,
}

impl From<FlightRow> for Flight {
    fn from(row: FlightRow) -> Self {
        Flight {
            id: row.id,
            number: row.number,
        }
    }
}

#[async_trait]
impl Repository<Flight> for PgFlightRepository {
    async fn get(&self, id: i32) -> StoreResult<Option<Flight>> {
        let row = sqlx::query_as::<_, FlightRow>("SELECT id, number FROM flights WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend_error)?;

        Ok(row.map(Flight::from))
    }

    async fn get_all(&self) -> StoreResult<Vec<Flight>> {
        let rows = sqlx::query_as::<_, FlightRow>("SELECT id, number FROM flights ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(backend_error)?;

        Ok(rows.into_iter().map(Flight::from).collect())
    }

    async fn save(&self, flight: &Flight) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO flights (id, number)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET number = EXCLUDED.number
            "#,
        )
        .bind(flight.id)
        .bind(&flight.number)
        .execute(&self.pool)
        .await
        .map_err(backend_error)?;

        Ok(())
    }
}
