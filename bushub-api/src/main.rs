use std::net::SocketAddr;
use std::sync::Arc;

use bushub_api::{
    app,
    state::{AppState, AuthConfig},
};
use bushub_booking::ReservationService;
use bushub_store::{DbClient, PgBookingStore, PgBusDirectory, PgUserDirectory, SmtpNotifier};
use chrono::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bushub_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = bushub_store::Config::load().expect("Failed to load config");
    tracing::info!("Starting BusHub API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let notifier = SmtpNotifier::new(&config.smtp).expect("Failed to configure SMTP notifier");

    let reservations = ReservationService::new(
        Arc::new(PgUserDirectory::new(db.pool.clone())),
        Arc::new(PgBusDirectory::new(db.pool.clone())),
        Arc::new(PgBookingStore::new(db.pool.clone())),
        Arc::new(notifier),
        config.company.clone(),
        Duration::minutes(config.business_rules.cancellation_window_minutes),
    );

    let app_state = AppState {
        reservations: Arc::new(reservations),
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
