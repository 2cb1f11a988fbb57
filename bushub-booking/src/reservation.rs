use std::sync::Arc;

use chrono::{Duration, Local, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use bushub_domain::booking::{Booking, BookingRequest};
use bushub_domain::dates;
use bushub_domain::error::ReservationError;
use bushub_domain::notify::{BookingConfirmation, CompanyProfile, Notifier};
use bushub_domain::repository::{BookingStore, BusDirectory, UserDirectory};
use bushub_domain::user::Identity;

/// Seat reservation with conflict avoidance. Validates requests against the
/// bus schedule and existing bookings, then persists through the store's
/// atomic reserve step.
pub struct ReservationService {
    users: Arc<dyn UserDirectory>,
    buses: Arc<dyn BusDirectory>,
    bookings: Arc<dyn BookingStore>,
    notifier: Arc<dyn Notifier>,
    company: CompanyProfile,
    cancellation_window: Duration,
}

impl ReservationService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        buses: Arc<dyn BusDirectory>,
        bookings: Arc<dyn BookingStore>,
        notifier: Arc<dyn Notifier>,
        company: CompanyProfile,
        cancellation_window: Duration,
    ) -> Self {
        Self {
            users,
            buses,
            bookings,
            notifier,
            company,
            cancellation_window,
        }
    }

    pub async fn create_booking(
        &self,
        request: BookingRequest,
        caller: Option<&Identity>,
    ) -> Result<Booking, ReservationError> {
        // 1. Only logged-in passengers may book
        if !caller.is_some_and(Identity::is_passenger) {
            return Err(ReservationError::authorization(
                "Please login as a passenger to make bookings",
            ));
        }

        // 2. Required fields
        if !request.is_complete() {
            return Err(ReservationError::validation("All fields are required"));
        }

        // 3. User must exist
        let user = self
            .users
            .find_user(request.user_id)
            .await?
            .ok_or_else(|| ReservationError::not_found("User not found"))?;

        // 4. Bus must exist
        let bus = self
            .buses
            .find_bus(request.bus_id)
            .await?
            .ok_or_else(|| ReservationError::not_found("Bus not found"))?;

        // 5. Schedule must have an entry for the calendar date. An
        //    unparseable date cannot match any entry.
        let travel_date = dates::parse_travel_date(&request.booking_date)
            .map_err(|_| ReservationError::validation("Bus not available on selected date"))?;
        let entry = bus.entry_for(travel_date).ok_or_else(|| {
            ReservationError::validation("Bus not available on selected date")
        })?;

        // 6. The entry must carry the exact start time
        if entry.slot(&request.time).is_none() {
            return Err(ReservationError::validation(
                "Bus not available at selected time",
            ));
        }

        // 7. Requested seats must be free across the slot's live bookings
        let existing = self
            .bookings
            .find_for_slot(bus.id, travel_date, &request.time)
            .await?;
        let booked: Vec<&String> = existing.iter().flat_map(|b| b.seats.iter()).collect();
        let conflicting: Vec<String> = request
            .seats
            .iter()
            .filter(|seat| booked.contains(seat))
            .cloned()
            .collect();
        if !conflicting.is_empty() {
            return Err(ReservationError::SeatConflict { seats: conflicting });
        }

        // 8. Seat count must fit the bus
        if request.seats.len() > bus.seat_count as usize {
            return Err(ReservationError::validation(
                "Selected seats exceed bus capacity",
            ));
        }

        let booking = Booking {
            id: Uuid::new_v4(),
            user_id: request.user_id,
            start_location: request.start_location,
            end_location: request.end_location,
            booking_date: request.booking_date,
            travel_date,
            time: request.time,
            bus_id: request.bus_id,
            seats: request.seats,
            passenger_name: request.passenger_name,
            passenger_phone: request.passenger_phone,
            total_price: request.total_price,
            created_at: Utc::now(),
        };

        // The store re-checks the overlap and inserts atomically; a racing
        // request for the same seats loses here even when both passed step 7.
        let booking = self.bookings.reserve(booking).await?;
        info!(booking_id = %booking.id, bus_id = %booking.bus_id, "booking confirmed");

        self.dispatch_confirmation(&booking, &user.email);

        Ok(booking)
    }

    pub async fn booked_seats(
        &self,
        bus_id: Uuid,
        booking_date: &str,
        time: &str,
    ) -> Result<Vec<String>, ReservationError> {
        // Exact stored-string match, no date normalization
        Ok(self
            .bookings
            .seats_for_raw_slot(bus_id, booking_date, time)
            .await?)
    }

    pub async fn list_bookings(
        &self,
        caller: Option<&Identity>,
    ) -> Result<Vec<Booking>, ReservationError> {
        match caller {
            Some(identity) if identity.is_passenger() => {
                Ok(self.bookings.find_by_user(identity.user_id).await?)
            }
            Some(identity) if identity.is_admin() => Ok(self.bookings.find_all().await?),
            _ => Err(ReservationError::authorization(
                "Please login to view bookings",
            )),
        }
    }

    pub async fn cancel_booking(
        &self,
        booking_id: Uuid,
        caller: Option<&Identity>,
    ) -> Result<(), ReservationError> {
        let Some(identity) = caller else {
            return Err(ReservationError::authorization(
                "Please login to cancel bookings",
            ));
        };

        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| ReservationError::not_found("Booking not found"))?;

        // Owner or admin only
        if !identity.is_admin() && identity.user_id != booking.user_id {
            return Err(ReservationError::authorization(
                "You can only cancel your own bookings",
            ));
        }

        let departure = dates::departure_instant(booking.travel_date, &booking.time)
            .map_err(|e| ReservationError::validation(e.to_string()))?;
        if departure - Local::now().naive_local() <= self.cancellation_window {
            return Err(ReservationError::validation(format!(
                "Cannot cancel within {} of departure",
                self.window_label()
            )));
        }

        self.bookings.delete(booking_id).await?;
        info!(booking_id = %booking_id, "booking cancelled");
        Ok(())
    }

    fn window_label(&self) -> String {
        let minutes = self.cancellation_window.num_minutes();
        if minutes % 60 == 0 {
            let hours = minutes / 60;
            if hours == 1 {
                "1 hour".to_string()
            } else {
                format!("{hours} hours")
            }
        } else {
            format!("{minutes} minutes")
        }
    }

    // Fire-and-forget: the reservation is already durable, so a dead relay
    // only costs the email, never the booking.
    fn dispatch_confirmation(&self, booking: &Booking, email: &str) {
        let confirmation = BookingConfirmation {
            customer_name: booking.passenger_name.clone(),
            booking_id: booking.id.to_string(),
            route: format!("{} → {}", booking.start_location, booking.end_location),
            travel_date: booking.booking_date.clone(),
            travel_time: booking.time.clone(),
            seat_numbers: booking.seats.join(", "),
            amount: format!("Rs. {}", booking.total_price),
            booking_link: format!("{}/ticket/{}", self.company.client_url, booking.id),
            company: self.company.clone(),
        };

        let notifier = Arc::clone(&self.notifier);
        let to = email.to_string();
        let booking_id = booking.id;
        tokio::spawn(async move {
            if let Err(err) = notifier.booking_confirmed(&to, &confirmation).await {
                warn!(booking_id = %booking_id, "confirmation delivery failed: {err}");
            }
        });
    }
}
