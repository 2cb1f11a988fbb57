pub mod app_config;
pub mod booking_repo;
pub mod bus_repo;
pub mod database;
pub mod mailer;
pub mod memory;
pub mod user_repo;

pub use app_config::Config;
pub use booking_repo::PgBookingStore;
pub use bus_repo::PgBusDirectory;
pub use database::DbClient;
pub use mailer::SmtpNotifier;
pub use memory::{MemoryStore, RecordingNotifier};
pub use user_repo::PgUserDirectory;
