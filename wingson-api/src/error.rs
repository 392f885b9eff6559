use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use wingson_booking::{BookingError, PersonError};

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            },
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<PersonError> for AppError {
    fn from(err: PersonError) -> Self {
        match err {
            PersonError::NotFound(_) => AppError::NotFoundError(err.to_string()),
            PersonError::Store(_) => AppError::InternalServerError(err.to_string()),
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::CustomerNotFound(_)
            | BookingError::PersonNotFound(_)
            | BookingError::FlightNotFound(_) => AppError::NotFoundError(err.to_string()),
            BookingError::AlreadyBooked => AppError::ConflictError(err.to_string()),
            BookingError::DuplicateFlightNumber(_)
            | BookingError::IdExhausted
            | BookingError::Store(_) => {
                AppError::InternalServerError(err.to_string())
            }
        }
    }
}
