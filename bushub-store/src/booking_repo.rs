use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use bushub_domain::booking::Booking;
use bushub_domain::error::{ReserveError, StoreError};
use bushub_domain::repository::BookingStore;

pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    user_id: Uuid,
    bus_id: Uuid,
    start_location: String,
    end_location: String,
    booking_date: String,
    travel_date: NaiveDate,
    slot_time: String,
    seats: Vec<String>,
    passenger_name: String,
    passenger_phone: String,
    total_price: f64,
    created_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Booking {
            id: row.id,
            user_id: row.user_id,
            start_location: row.start_location,
            end_location: row.end_location,
            booking_date: row.booking_date,
            travel_date: row.travel_date,
            time: row.slot_time,
            bus_id: row.bus_id,
            seats: row.seats,
            passenger_name: row.passenger_name,
            passenger_phone: row.passenger_phone,
            total_price: row.total_price,
            created_at: row.created_at,
        }
    }
}

const SELECT_COLUMNS: &str = "id, user_id, bus_id, start_location, end_location, booking_date, \
     travel_date, slot_time, seats, passenger_name, passenger_phone, total_price, created_at";

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn reserve(&self, booking: Booking) -> Result<Booking, ReserveError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        // Slot-scoped advisory lock serializes racing reservations for the
        // same (bus, travel date, time) without blocking unrelated slots.
        let lock_key = format!(
            "{}|{}|{}",
            booking.bus_id, booking.travel_date, booking.time
        );
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(&lock_key)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;

        // Re-check overlap under the lock before committing.
        let taken: Vec<(Vec<String>,)> = sqlx::query_as(
            "SELECT seats FROM bookings WHERE bus_id = $1 AND travel_date = $2 AND slot_time = $3",
        )
        .bind(booking.bus_id)
        .bind(booking.travel_date)
        .bind(&booking.time)
        .fetch_all(&mut *tx)
        .await
        .map_err(backend)?;

        let booked: Vec<&String> = taken.iter().flat_map(|(seats,)| seats.iter()).collect();
        let conflicting: Vec<String> = booking
            .seats
            .iter()
            .filter(|seat| booked.contains(seat))
            .cloned()
            .collect();
        if !conflicting.is_empty() {
            return Err(ReserveError::SeatsTaken(conflicting));
        }

        sqlx::query(
            "INSERT INTO bookings (id, user_id, bus_id, start_location, end_location, \
             booking_date, travel_date, slot_time, seats, passenger_name, passenger_phone, \
             total_price, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(booking.id)
        .bind(booking.user_id)
        .bind(booking.bus_id)
        .bind(&booking.start_location)
        .bind(&booking.end_location)
        .bind(&booking.booking_date)
        .bind(booking.travel_date)
        .bind(&booking.time)
        .bind(&booking.seats)
        .bind(&booking.passenger_name)
        .bind(&booking.passenger_phone)
        .bind(booking.total_price)
        .bind(booking.created_at)
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        tx.commit().await.map_err(backend)?;

        Ok(booking)
    }

    async fn find_for_slot(
        &self,
        bus_id: Uuid,
        travel_date: NaiveDate,
        time: &str,
    ) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM bookings \
             WHERE bus_id = $1 AND travel_date = $2 AND slot_time = $3"
        ))
        .bind(bus_id)
        .bind(travel_date)
        .bind(time)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        Ok(rows.into_iter().map(Booking::from).collect())
    }

    async fn seats_for_raw_slot(
        &self,
        bus_id: Uuid,
        booking_date: &str,
        time: &str,
    ) -> Result<Vec<String>, StoreError> {
        let rows: Vec<(Vec<String>,)> = sqlx::query_as(
            "SELECT seats FROM bookings \
             WHERE bus_id = $1 AND booking_date = $2 AND slot_time = $3 \
             ORDER BY created_at",
        )
        .bind(bus_id)
        .bind(booking_date)
        .bind(time)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        let mut union = Vec::new();
        for (seats,) in rows {
            for seat in seats {
                if !union.contains(&seat) {
                    union.push(seat);
                }
            }
        }
        Ok(union)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.map(Booking::from))
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM bookings WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        Ok(rows.into_iter().map(Booking::from).collect())
    }

    async fn find_all(&self) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM bookings ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        Ok(rows.into_iter().map(Booking::from).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }
}
