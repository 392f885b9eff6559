use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use wingson_core::{Booking, Flight, Person, Repository, StoreResult};
use crate::backend_error;
use crate::person_repo::PersonRow;

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_passengers(&self, booking_ids: &[i32]) -> StoreResult<HashMap<i32, Vec<Person>>> {
        let rows = sqlx::query_as::<_, PassengerRow>(
            r#"
            SELECT bp.booking_id, p.id, p.name, p.gender, p.address
            FROM booking_passengers bp
            JOIN persons p ON p.id = bp.person_id
            WHERE bp.booking_id = ANY($1)
            ORDER BY bp.booking_id, bp.position
            "#,
        )
        .bind(booking_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(backend_error)?;

        let mut passengers: HashMap<i32, Vec<Person>> = HashMap::new();
        for row in rows {
            let booking_id = row.booking_id;
            let person = Person::try_from(PersonRow {
                id: row.id,
                name: row.name,
                gender: row.gender,
                address: row.address,
            })?;
            passengers.entry(booking_id).or_default().push(person);
        }
        Ok(passengers)
    }

    fn assemble(row: BookingRow, passengers: Vec<Person>) -> StoreResult<Booking> {
        let customer = Person::try_from(PersonRow {
            id: row.customer_id,
            name: row.customer_name,
            gender: row.customer_gender,
            address: row.customer_address,
        })?;

        Ok(Booking {
            id: row.id,
            number: row.number,
            customer,
            passengers,
            flight: Flight {
                id: row.flight_id,
                number: row.flight_number,
            },
            created_at: row.created_at,
        })
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct BookingRow {
    id: i32,
    number: String,
    created_at: DateTime<Utc>,
    flight_id: i32,
    flight_number: String,
    customer_id: i32,
    customer_name: String,
    customer_gender: String,
    customer_address: String,
}

#[derive(sqlx::FromRow)]
struct PassengerRow {
    booking_id: i32,
    id: i32,
    name: String,
    gender: String,
    address: String,
}

const BOOKING_SELECT: &str = r#"
    SELECT
        b.id, b.number, b.created_at,
        f.id AS flight_id, f.number AS flight_number,
        c.id AS customer_id, c.name AS customer_name,
        c.gender AS customer_gender, c.address AS customer_address
    FROM bookings b
    JOIN flights f ON f.id = b.flight_id
    JOIN persons c ON c.id = b.customer_id
"#;

#[async_trait]
impl Repository<Booking> for PgBookingRepository {
    async fn get(&self, id: i32) -> StoreResult<Option<Booking>> {
        let query = format!("{} WHERE b.id = $1", BOOKING_SELECT);
        let row = sqlx::query_as::<_, BookingRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut passengers = self.load_passengers(&[row.id]).await?;
        let list = passengers.remove(&row.id).unwrap_or_default();
        Self::assemble(row, list).map(Some)
    }

    async fn get_all(&self) -> StoreResult<Vec<Booking>> {
        let query = format!("{} ORDER BY b.id", BOOKING_SELECT);
        let rows = sqlx::query_as::<_, BookingRow>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(backend_error)?;

        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let mut passengers = self.load_passengers(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let list = passengers.remove(&row.id).unwrap_or_default();
                Self::assemble(row, list)
            })
            .collect()
    }

    async fn save(&self, booking: &Booking) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(backend_error)?;

        sqlx::query(
            r#"
            INSERT INTO bookings (id, number, customer_id, flight_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET number = EXCLUDED.number,
                customer_id = EXCLUDED.customer_id,
                flight_id = EXCLUDED.flight_id,
                created_at = EXCLUDED.created_at
            "#,
        )
        .bind(booking.id)
        .bind(&booking.number)
        .bind(booking.customer.id)
        .bind(booking.flight.id)
        .bind(booking.created_at)
        .execute(&mut *tx)
        .await
        .map_err(backend_error)?;

        sqlx::query("DELETE FROM booking_passengers WHERE booking_id = $1")
            .bind(booking.id)
            .execute(&mut *tx)
            .await
            .map_err(backend_error)?;

        for (position, passenger) in booking.passengers.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO booking_passengers (booking_id, person_id, position)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(booking.id)
            .bind(passenger.id)
            .bind(position as i32)
            .execute(&mut *tx)
            .await
            .map_err(backend_error)?;
        }

        tx.commit().await.map_err(backend_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DbClient, PgFlightRepository, PgPersonRepository};
    use wingson_core::Gender;

    async fn connect() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let db = DbClient::new(&url, 2).await.expect("Failed to connect");
        db.migrate().await.expect("Failed to migrate");

        sqlx::query("DELETE FROM bookings WHERE id BETWEEN 9000 AND 9099")
            .execute(&db.pool)
            .await
            .unwrap();
        db.pool
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a Postgres instance"]
    async fn test_save_keeps_passenger_order_and_replaces_on_upsert() {
        let pool = connect().await;
        let persons = PgPersonRepository::new(pool.clone());
        let flights = PgFlightRepository::new(pool.clone());
        let bookings = PgBookingRepository::new(pool);

        for id in 9001..=9003 {
            persons
                .save(&Person::new(id, format!("Person {}", id), Gender::Male, "Street"))
                .await
                .unwrap();
        }
        flights.save(&Flight::new(9001, "ZZ9001")).await.unwrap();

        let mut booking = Booking {
            id: 9010,
            number: "WO-009010".to_string(),
            customer: persons.get(9001).await.unwrap().unwrap(),
            passengers: vec![
                persons.get(9003).await.unwrap().unwrap(),
                persons.get(9001).await.unwrap().unwrap(),
                persons.get(9002).await.unwrap().unwrap(),
            ],
            flight: Flight::new(9001, "ZZ9001"),
            created_at: Utc::now(),
        };
        bookings.save(&booking).await.unwrap();

        let stored = bookings.get(9010).await.unwrap().expect("booking saved");
        let ids: Vec<i32> = stored.passengers.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![9003, 9001, 9002]);
        assert_eq!(stored.flight.number, "ZZ9001");

        booking.number = "WO-000001".to_string();
        booking.passengers = vec![persons.get(9002).await.unwrap().unwrap()];
        bookings.save(&booking).await.unwrap();

        let stored = bookings.get(9010).await.unwrap().unwrap();
        assert_eq!(stored.number, "WO-000001");
        assert_eq!(stored.passengers.len(), 1);
        assert_eq!(stored.passengers[0].id, 9002);

        persons
            .save(&Person::new(9002, "Person 9002", Gender::Male, "Moved"))
            .await
            .unwrap();
        let all = bookings.get_all().await.unwrap();
        let ours = all.iter().find(|b| b.id == 9010).unwrap();
        assert_eq!(ours.passengers[0].address, "Moved");
    }
}
