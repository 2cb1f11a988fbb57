use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

/// Operator branding and support contact, sourced from configuration and
/// stamped into every confirmation.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyProfile {
    pub name: String,
    pub address: String,
    pub support_phone: String,
    pub support_email: String,
    pub client_url: String,
}

/// Everything a confirmation message carries.
#[derive(Debug, Clone)]
pub struct BookingConfirmation {
    pub customer_name: String,
    pub booking_id: String,
    pub route: String,
    pub travel_date: String,
    pub travel_time: String,
    pub seat_numbers: String,
    pub amount: String,
    pub booking_link: String,
    pub company: CompanyProfile,
}

/// Confirmation sink. Delivery runs after the reservation has committed and
/// its failure never voids the booking.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn booking_confirmed(
        &self,
        to: &str,
        confirmation: &BookingConfirmation,
    ) -> Result<(), NotifyError>;
}
