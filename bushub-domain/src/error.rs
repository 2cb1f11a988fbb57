use thiserror::Error;

/// Failure of a storage collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Outcome of an atomic reserve that did not commit.
#[derive(Debug, Error)]
pub enum ReserveError {
    #[error("Seats {} are already booked", .0.join(", "))]
    SeatsTaken(Vec<String>),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Client-facing error taxonomy of the reservation service.
#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("{0}")]
    Authorization(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Seats {} are already booked", seats.join(", "))]
    SeatConflict { seats: Vec<String> },
    #[error(transparent)]
    Dependency(#[from] StoreError),
}

impl ReservationError {
    pub fn validation(message: impl Into<String>) -> Self {
        ReservationError::Validation(message.into())
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        ReservationError::Authorization(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ReservationError::NotFound(message.into())
    }
}

impl From<ReserveError> for ReservationError {
    fn from(err: ReserveError) -> Self {
        match err {
            ReserveError::SeatsTaken(seats) => ReservationError::SeatConflict { seats },
            ReserveError::Store(err) => ReservationError::Dependency(err),
        }
    }
}
