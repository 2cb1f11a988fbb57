use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use bushub_domain::bus::{Bus, ScheduleEntry};
use bushub_domain::error::StoreError;
use bushub_domain::repository::BusDirectory;

pub struct PgBusDirectory {
    pool: PgPool,
}

impl PgBusDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BusRow {
    id: Uuid,
    name: String,
    seat_count: i32,
    schedule: serde_json::Value,
}

#[async_trait]
impl BusDirectory for PgBusDirectory {
    async fn find_bus(&self, id: Uuid) -> Result<Option<Bus>, StoreError> {
        let row = sqlx::query_as::<_, BusRow>(
            "SELECT id, name, seat_count, schedule FROM buses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let schedule: Vec<ScheduleEntry> = serde_json::from_value(row.schedule)
            .map_err(|e| StoreError::Backend(format!("malformed schedule for bus {id}: {e}")))?;

        Ok(Some(Bus {
            id: row.id,
            name: row.name,
            seat_count: row.seat_count.max(0) as u32,
            schedule,
        }))
    }
}
