use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use tracing::info;
use wingson_core::{Gender, Person};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateAddressQuery {
    #[serde(rename = "newAddress")]
    pub new_address: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/person/{person_id}", get(get_person_by_id))
        .route("/person/gender/{gender}", get(get_persons_by_gender))
        .route("/person/updateAddress/{person_id}", put(update_person_address))
}

/// GET /person/{person_id}
async fn get_person_by_id(
    State(state): State<AppState>,
    Path(person_id): Path<i32>,
) -> Result<Json<Person>, AppError> {
    let person = state.persons.get_person_by_id(person_id).await?;
    Ok(Json(person))
}

/// GET /person/gender/{gender}
/// Accepts 1 (Male), 2 (Female), or the name
async fn get_persons_by_gender(
    State(state): State<AppState>,
    Path(gender): Path<String>,
) -> Result<Json<Vec<Person>>, AppError> {
    let gender = gender
        .parse::<Gender>()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let persons = state.persons.get_persons_by_gender(gender).await?;
    Ok(Json(persons))
}

/// PUT /person/updateAddress/{person_id}?newAddress=...
async fn update_person_address(
    State(state): State<AppState>,
    Path(person_id): Path<i32>,
    Query(query): Query<UpdateAddressQuery>,
) -> Result<Json<Person>, AppError> {
    info!("Address update requested for person {}", person_id);
    let person = state
        .persons
        .update_person_address(person_id, query.new_address)
        .await?;
    Ok(Json(person))
}
