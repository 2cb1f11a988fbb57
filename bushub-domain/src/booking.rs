use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A confirmed seat reservation. Created only through the reservation
/// service, deleted only through cancellation, never otherwise mutated.
///
/// `booking_date` keeps the exact string the client sent; `travel_date` is
/// its canonical calendar form, used wherever dates are compared.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub start_location: String,
    pub end_location: String,
    pub booking_date: String,
    #[serde(skip_serializing)]
    pub travel_date: NaiveDate,
    pub time: String,
    pub bus_id: Uuid,
    pub seats: Vec<String>,
    pub passenger_name: String,
    pub passenger_phone: String,
    pub total_price: f64,
    pub created_at: DateTime<Utc>,
}

/// Incoming booking payload, camelCase on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
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
}

impl BookingRequest {
    /// All required fields present and non-empty, price positive.
    pub fn is_complete(&self) -> bool {
        !self.start_location.trim().is_empty()
            && !self.end_location.trim().is_empty()
            && !self.booking_date.trim().is_empty()
            && !self.time.trim().is_empty()
            && !self.seats.is_empty()
            && self.seats.iter().all(|seat| !seat.trim().is_empty())
            && !self.passenger_name.trim().is_empty()
            && !self.passenger_phone.trim().is_empty()
            && self.total_price > 0.0
    }
}
