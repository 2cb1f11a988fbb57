use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use bushub_domain::error::StoreError;
use bushub_domain::repository::UserDirectory;
use bushub_domain::user::{Role, User};

pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    phone: Option<String>,
    role: String,
}

impl UserRow {
    fn into_user(self) -> Result<User, StoreError> {
        let role = Role::parse(&self.role)
            .ok_or_else(|| StoreError::Backend(format!("unknown role '{}'", self.role)))?;
        Ok(User {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            role,
        })
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, phone, role FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        row.map(UserRow::into_user).transpose()
    }
}
