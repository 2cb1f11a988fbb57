use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::booking::Booking;
use crate::bus::Bus;
use crate::error::{ReserveError, StoreError};
use crate::user::User;

/// Identity-provider lookup, scoped to what reservations need.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;
}

/// Bus and schedule lookup.
#[async_trait]
pub trait BusDirectory: Send + Sync {
    async fn find_bus(&self, id: Uuid) -> Result<Option<Bus>, StoreError>;
}

/// Durable booking collection.
///
/// `reserve` is the atomic unit of work: it re-checks seat overlap for the
/// booking's (bus, travel date, time) slot and inserts in one step, so two
/// racing requests for overlapping seats cannot both commit.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn reserve(&self, booking: Booking) -> Result<Booking, ReserveError>;

    /// Bookings sharing the slot, matched on the canonical calendar date.
    async fn find_for_slot(
        &self,
        bus_id: Uuid,
        travel_date: NaiveDate,
        time: &str,
    ) -> Result<Vec<Booking>, StoreError>;

    /// Seat union for the slot, matched on the stored date string exactly
    /// as the client sent it.
    async fn seats_for_raw_slot(
        &self,
        bus_id: Uuid,
        booking_date: &str,
        time: &str,
    ) -> Result<Vec<String>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, StoreError>;

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Booking>, StoreError>;

    async fn find_all(&self) -> Result<Vec<Booking>, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}
