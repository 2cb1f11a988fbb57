use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use bushub_domain::booking::Booking;
use bushub_domain::bus::Bus;
use bushub_domain::error::{ReserveError, StoreError};
use bushub_domain::notify::{BookingConfirmation, Notifier, NotifyError};
use bushub_domain::repository::{BookingStore, BusDirectory, UserDirectory};
use bushub_domain::user::User;

/// In-memory store backing all three collaborator traits. Used by the test
/// suites and by embedded deployments without Postgres; the booking map's
/// mutex is what makes `reserve` atomic here.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<Uuid, User>>,
    buses: Mutex<HashMap<Uuid, Bus>>,
    bookings: Mutex<HashMap<Uuid, Booking>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    pub fn add_bus(&self, bus: Bus) {
        self.buses.lock().unwrap().insert(bus.id, bus);
    }

    pub fn booking_count(&self) -> usize {
        self.bookings.lock().unwrap().len()
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }
}

#[async_trait]
impl BusDirectory for MemoryStore {
    async fn find_bus(&self, id: Uuid) -> Result<Option<Bus>, StoreError> {
        Ok(self.buses.lock().unwrap().get(&id).cloned())
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn reserve(&self, booking: Booking) -> Result<Booking, ReserveError> {
        let mut bookings = self.bookings.lock().unwrap();

        let conflicting: Vec<String> = bookings
            .values()
            .filter(|existing| {
                existing.bus_id == booking.bus_id
                    && existing.travel_date == booking.travel_date
                    && existing.time == booking.time
            })
            .flat_map(|existing| existing.seats.iter())
            .filter(|seat| booking.seats.contains(seat))
            .cloned()
            .collect();

        if !conflicting.is_empty() {
            return Err(ReserveError::SeatsTaken(conflicting));
        }

        bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn find_for_slot(
        &self,
        bus_id: Uuid,
        travel_date: NaiveDate,
        time: &str,
    ) -> Result<Vec<Booking>, StoreError> {
        Ok(self
            .bookings
            .lock()
            .unwrap()
            .values()
            .filter(|b| b.bus_id == bus_id && b.travel_date == travel_date && b.time == time)
            .cloned()
            .collect())
    }

    async fn seats_for_raw_slot(
        &self,
        bus_id: Uuid,
        booking_date: &str,
        time: &str,
    ) -> Result<Vec<String>, StoreError> {
        let bookings = self.bookings.lock().unwrap();
        let mut matching: Vec<&Booking> = bookings
            .values()
            .filter(|b| b.bus_id == bus_id && b.booking_date == booking_date && b.time == time)
            .collect();
        matching.sort_by_key(|b| b.created_at);

        let mut union = Vec::new();
        for booking in matching {
            for seat in &booking.seats {
                if !union.contains(seat) {
                    union.push(seat.clone());
                }
            }
        }
        Ok(union)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        Ok(self.bookings.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        let mut result: Vec<Booking> = self
            .bookings
            .lock()
            .unwrap()
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn find_all(&self) -> Result<Vec<Booking>, StoreError> {
        let mut result: Vec<Booking> = self.bookings.lock().unwrap().values().cloned().collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.bookings.lock().unwrap().remove(&id);
        Ok(())
    }
}

/// Notifier that records deliveries instead of sending them; `failing()`
/// simulates a dead SMTP relay.
#[derive(Default)]
pub struct RecordingNotifier {
    fail: bool,
    sent: Mutex<Vec<(String, BookingConfirmation)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<(String, BookingConfirmation)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn booking_confirmed(
        &self,
        to: &str,
        confirmation: &BookingConfirmation,
    ) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Delivery("simulated delivery failure".into()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), confirmation.clone()));
        Ok(())
    }
}
