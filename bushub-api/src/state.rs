use std::sync::Arc;

use bushub_booking::ReservationService;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
}

#[derive(Clone)]
pub struct AppState {
    pub reservations: Arc<ReservationService>,
    pub auth: AuthConfig,
}
