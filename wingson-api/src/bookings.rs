use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::info;
use wingson_core::{Booking, Person};
use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/booking/getPassengersForFlight/{flight_number}",
            get(get_passengers_by_flight_number),
        )
        .route(
            "/booking/book/{customer_id}/{target_person_id}/{flight_number}",
            post(create_booking_for_flight),
        )
}

/// GET /booking/getPassengersForFlight/{flight_number}
async fn get_passengers_by_flight_number(
    State(state): State<AppState>,
    Path(flight_number): Path<String>,
) -> Result<Json<Vec<Person>>, AppError> {
    let passengers = state
        .bookings
        .get_passengers_by_flight_number(&flight_number)
        .await?;
    Ok(Json(passengers))
}

/// POST /booking/book/{customer_id}/{target_person_id}/{flight_number}
async fn create_booking_for_flight(
    State(state): State<AppState>,
    Path((customer_id, target_person_id, flight_number)): Path<(i32, i32, String)>,
) -> Result<Json<Booking>, AppError> {
    info!(
        "Booking requested by customer {} for person {} on flight {}",
        customer_id, target_person_id, flight_number
    );

    let booking = state
        .bookings
        .create_booking_for_flight(customer_id, target_person_id, &flight_number)
        .await?;
    Ok(Json(booking))
}
