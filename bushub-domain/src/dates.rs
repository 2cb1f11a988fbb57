use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DateError {
    #[error("invalid travel date: {0}")]
    InvalidDate(String),
    #[error("invalid departure time: {0}")]
    InvalidTime(String),
}

/// Parse a client-supplied travel date. Strict `DD-MM-YYYY` is tried first,
/// anything else is treated as ISO `YYYY-MM-DD`.
pub fn parse_travel_date(value: &str) -> Result<NaiveDate, DateError> {
    if looks_like_day_first(value) {
        return NaiveDate::parse_from_str(value, "%d-%m-%Y")
            .map_err(|_| DateError::InvalidDate(value.to_string()));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| DateError::InvalidDate(value.to_string()))
}

/// Combine a travel date with a slot start time ("HH:MM" or "HH:MM:SS")
/// into the departure instant.
pub fn departure_instant(date: NaiveDate, time: &str) -> Result<NaiveDateTime, DateError> {
    let parsed = NaiveTime::parse_from_str(time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
        .map_err(|_| DateError::InvalidTime(time.to_string()))?;
    Ok(NaiveDateTime::new(date, parsed))
}

// DD-MM-YYYY: exactly two digits, dash, two digits, dash, four digits.
fn looks_like_day_first(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes[2] == b'-'
        && bytes[5] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| matches!(i, 2 | 5) || b.is_ascii_digit())
}
