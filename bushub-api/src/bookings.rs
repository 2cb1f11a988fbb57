use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::CallerIdentity;
use crate::error::ApiError;
use crate::state::AppState;
use bushub_domain::booking::{Booking, BookingRequest};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub start_location: String,
    pub end_location: String,
    pub booking_date: String,
    pub time: String,
    pub bus_id: Uuid,
    pub seats: Vec<String>,
    pub passenger_name: String,
    pub passenger_phone: String,
    pub total_price: f64,
    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        BookingResponse {
            id: booking.id,
            user_id: booking.user_id,
            start_location: booking.start_location,
            end_location: booking.end_location,
            booking_date: booking.booking_date,
            time: booking.time,
            bus_id: booking.bus_id,
            seats: booking.seats,
            passenger_name: booking.passenger_name,
            passenger_phone: booking.passenger_phone,
            total_price: booking.total_price,
            created_at: booking.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedSeatsQuery {
    pub bus_id: Uuid,
    pub booking_date: String,
    pub time: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedSeatsResponse {
    pub booked_seats: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", post(create_booking).get(get_booked_seats))
        .route("/bookings/getbookings", get(get_bookings))
        .route("/bookings/{id}", delete(delete_booking))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /bookings
async fn create_booking(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    Json(request): Json<BookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), ApiError> {
    let booking = state
        .reservations
        .create_booking(request, caller.as_ref())
        .await?;
    Ok((StatusCode::CREATED, Json(booking.into())))
}

/// GET /bookings?busId&bookingDate&time
async fn get_booked_seats(
    State(state): State<AppState>,
    Query(query): Query<BookedSeatsQuery>,
) -> Result<Json<BookedSeatsResponse>, ApiError> {
    let booked_seats = state
        .reservations
        .booked_seats(query.bus_id, &query.booking_date, &query.time)
        .await?;
    Ok(Json(BookedSeatsResponse { booked_seats }))
}

/// GET /bookings/getbookings
async fn get_bookings(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
) -> Result<Json<Vec<BookingResponse>>, ApiError> {
    let bookings = state.reservations.list_bookings(caller.as_ref()).await?;
    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

/// DELETE /bookings/{id}
async fn delete_booking(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.reservations.cancel_booking(id, caller.as_ref()).await?;
    Ok(Json(MessageResponse {
        message: "Booking cancelled successfully".to_string(),
    }))
}
