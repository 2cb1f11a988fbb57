use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use bushub_domain::error::ReservationError;

#[derive(Debug)]
pub enum ApiError {
    Reservation(ReservationError),
    Anyhow(anyhow::Error),
}

impl From<ReservationError> for ApiError {
    fn from(err: ReservationError) -> Self {
        ApiError::Reservation(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Anyhow(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Reservation(err) => match err {
                ReservationError::Authorization(msg) => (StatusCode::FORBIDDEN, msg),
                ReservationError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
                ReservationError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
                conflict @ ReservationError::SeatConflict { .. } => {
                    (StatusCode::CONFLICT, conflict.to_string())
                }
                ReservationError::Dependency(err) => {
                    tracing::error!("Internal Server Error: {}", err);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal Server Error".to_string(),
                    )
                }
            },
            ApiError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
