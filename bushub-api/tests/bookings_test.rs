use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Local, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use bushub_api::auth::Claims;
use bushub_api::state::{AppState, AuthConfig};
use bushub_api::app;
use bushub_booking::ReservationService;
use bushub_domain::bus::{Bus, ScheduleEntry, TimeSlot};
use bushub_domain::notify::CompanyProfile;
use bushub_domain::user::{Role, User};
use bushub_store::{MemoryStore, RecordingNotifier};

const SECRET: &str = "integration-test-secret";
const PASSENGER: Uuid = Uuid::from_u128(0x01);
const OTHER_PASSENGER: Uuid = Uuid::from_u128(0x02);
const ADMIN: Uuid = Uuid::from_u128(0x03);
const BUS: Uuid = Uuid::from_u128(0x10);

fn test_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    store.add_user(User {
        id: PASSENGER,
        name: "Nimal Perera".to_string(),
        email: "nimal@example.lk".to_string(),
        phone: Some("0771234567".to_string()),
        role: Role::Passenger,
    });
    store.add_user(User {
        id: OTHER_PASSENGER,
        name: "Kamala Silva".to_string(),
        email: "kamala@example.lk".to_string(),
        phone: None,
        role: Role::Passenger,
    });
    store.add_user(User {
        id: ADMIN,
        name: "Depot Admin".to_string(),
        email: "admin@sfservice.lk".to_string(),
        phone: None,
        role: Role::Admin,
    });
    store.add_bus(Bus {
        id: BUS,
        name: "Colombo Express".to_string(),
        seat_count: 40,
        schedule: vec![ScheduleEntry {
            date: "10-06-2025".to_string(),
            times: vec![TimeSlot {
                start_time: "08:00".to_string(),
            }],
        }],
    });

    let reservations = ReservationService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(RecordingNotifier::new()),
        CompanyProfile {
            name: "Staff Bus Service.lk".to_string(),
            address: "Colombo, Sri Lanka".to_string(),
            support_phone: "011-1234567".to_string(),
            support_email: "support@sfservice.lk".to_string(),
            client_url: "http://localhost:3000".to_string(),
        },
        Duration::minutes(120),
    );

    let state = AppState {
        reservations: Arc::new(reservations),
        auth: AuthConfig {
            secret: SECRET.to_string(),
        },
    };

    (app(state), store)
}

fn token(user_id: Uuid, role: &str) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        role: role.to_string(),
        exp: (Utc::now() + Duration::days(1)).timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

fn booking_body(seats: &[&str]) -> Value {
    json!({
        "userId": PASSENGER,
        "startLocation": "Colombo",
        "endLocation": "Kandy",
        "bookingDate": "10-06-2025",
        "time": "08:00",
        "busId": BUS,
        "seats": seats,
        "passengerName": "Nimal Perera",
        "passengerPhone": "0771234567",
        "totalPrice": 1500.0
    })
}

fn post_booking(body: &Value, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/bookings")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn delete(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("DELETE").uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn passenger_can_create_a_booking() {
    let (app, _store) = test_app();
    let token = token(PASSENGER, "PASSENGER");

    let response = app
        .clone()
        .oneshot(post_booking(&booking_body(&["A1", "A2"]), Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["seats"], json!(["A1", "A2"]));
    assert_eq!(body["bookingDate"], "10-06-2025");

    let response = app
        .oneshot(get(
            &format!("/bookings?busId={BUS}&bookingDate=10-06-2025&time=08:00"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["bookedSeats"], json!(["A1", "A2"]));
}

#[tokio::test]
async fn conflicting_seats_return_409_with_the_offenders() {
    let (app, _store) = test_app();
    let token = token(PASSENGER, "PASSENGER");

    let response = app
        .clone()
        .oneshot(post_booking(&booking_body(&["A1", "A2"]), Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(post_booking(&booking_body(&["A2", "A3"]), Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Seats A2 are already booked");
}

#[tokio::test]
async fn create_requires_a_passenger_login() {
    let (app, store) = test_app();

    let response = app
        .clone()
        .oneshot(post_booking(&booking_body(&["A1"]), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Please login as a passenger to make bookings");

    let admin_token = token(ADMIN, "ADMIN");
    let response = app
        .clone()
        .oneshot(post_booking(&booking_body(&["A1"]), Some(&admin_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // A garbage token is treated as no login at all
    let response = app
        .oneshot(post_booking(&booking_body(&["A1"]), Some("not-a-jwt")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(store.booking_count(), 0);
}

#[tokio::test]
async fn incomplete_payload_returns_400() {
    let (app, _store) = test_app();
    let token = token(PASSENGER, "PASSENGER");

    let mut body = booking_body(&["A1"]);
    body["passengerPhone"] = json!("");
    let response = app
        .oneshot(post_booking(&body, Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "All fields are required");
}

#[tokio::test]
async fn unknown_bus_returns_404() {
    let (app, _store) = test_app();
    let token = token(PASSENGER, "PASSENGER");

    let mut body = booking_body(&["A1"]);
    body["busId"] = json!(Uuid::from_u128(0xbeef));
    let response = app
        .oneshot(post_booking(&body, Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Bus not found");
}

#[tokio::test]
async fn unavailable_date_returns_400() {
    let (app, _store) = test_app();
    let token = token(PASSENGER, "PASSENGER");

    let mut body = booking_body(&["A1"]);
    body["bookingDate"] = json!("12-12-2025");
    let response = app
        .oneshot(post_booking(&body, Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Bus not available on selected date");
}

#[tokio::test]
async fn booked_seats_lookup_is_public_and_exact() {
    let (app, _store) = test_app();
    let token = token(PASSENGER, "PASSENGER");

    let response = app
        .clone()
        .oneshot(post_booking(&booking_body(&["A1"]), Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // The stored string is DD-MM-YYYY, so the ISO spelling sees nothing.
    let response = app
        .oneshot(get(
            &format!("/bookings?busId={BUS}&bookingDate=2025-06-10&time=08:00"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["bookedSeats"], json!([]));
}

#[tokio::test]
async fn listing_is_scoped_by_role() {
    let (app, _store) = test_app();
    let passenger_token = token(PASSENGER, "PASSENGER");
    let other_token = token(OTHER_PASSENGER, "PASSENGER");
    let admin_token = token(ADMIN, "ADMIN");

    let response = app
        .clone()
        .oneshot(post_booking(&booking_body(&["A1"]), Some(&passenger_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let mut other_body = booking_body(&["B1"]);
    other_body["userId"] = json!(OTHER_PASSENGER);
    let response = app
        .clone()
        .oneshot(post_booking(&other_body, Some(&other_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(get("/bookings/getbookings", Some(&passenger_token)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["userId"], json!(PASSENGER));

    let response = app
        .clone()
        .oneshot(get("/bookings/getbookings", Some(&admin_token)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let response = app
        .oneshot(get("/bookings/getbookings", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Please login to view bookings");
}

fn slot_relative_to_now(minutes_ahead: i64) -> (String, String) {
    let departure = Local::now().naive_local() + Duration::minutes(minutes_ahead);
    (
        departure.format("%d-%m-%Y").to_string(),
        departure.format("%H:%M").to_string(),
    )
}

async fn create_departing_in(
    app: &Router,
    store: &Arc<MemoryStore>,
    minutes_ahead: i64,
    bus_id: Uuid,
) -> Uuid {
    let (date, time) = slot_relative_to_now(minutes_ahead);
    store.add_bus(Bus {
        id: bus_id,
        name: "Night Rider".to_string(),
        seat_count: 40,
        schedule: vec![ScheduleEntry {
            date: date.clone(),
            times: vec![TimeSlot {
                start_time: time.clone(),
            }],
        }],
    });

    let mut body = booking_body(&["C1"]);
    body["busId"] = json!(bus_id);
    body["bookingDate"] = json!(date);
    body["time"] = json!(time);
    let response = app
        .clone()
        .oneshot(post_booking(&body, Some(&token(PASSENGER, "PASSENGER"))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    Uuid::parse_str(body["id"].as_str().unwrap()).unwrap()
}

#[tokio::test]
async fn cancellation_window_is_enforced() {
    let (app, store) = test_app();
    let passenger_token = token(PASSENGER, "PASSENGER");

    let imminent = create_departing_in(&app, &store, 90, Uuid::from_u128(0x20)).await;
    let response = app
        .clone()
        .oneshot(delete(
            &format!("/bookings/{imminent}"),
            Some(&passenger_token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Cannot cancel within 2 hours of departure");

    let distant = create_departing_in(&app, &store, 200, Uuid::from_u128(0x21)).await;
    let response = app
        .clone()
        .oneshot(delete(
            &format!("/bookings/{distant}"),
            Some(&passenger_token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Booking cancelled successfully");
}

#[tokio::test]
async fn cancellation_requires_owner_or_admin() {
    let (app, store) = test_app();

    let booking_id = create_departing_in(&app, &store, 200, Uuid::from_u128(0x20)).await;

    let response = app
        .clone()
        .oneshot(delete(
            &format!("/bookings/{booking_id}"),
            Some(&token(OTHER_PASSENGER, "PASSENGER")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(delete(
            &format!("/bookings/{booking_id}"),
            Some(&token(ADMIN, "ADMIN")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.booking_count(), 0);
}

#[tokio::test]
async fn cancelling_an_unknown_booking_returns_404() {
    let (app, _store) = test_app();

    let response = app
        .oneshot(delete(
            &format!("/bookings/{}", Uuid::from_u128(0xfeed)),
            Some(&token(PASSENGER, "PASSENGER")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Booking not found");
}
