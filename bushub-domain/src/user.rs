use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Caller role as carried in identity-provider claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Passenger,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Passenger => "PASSENGER",
            Role::Admin => "ADMIN",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "PASSENGER" => Some(Role::Passenger),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
}

/// Authenticated caller, resolved from a verified token by the API layer.
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: Role,
}

impl Identity {
    pub fn is_passenger(&self) -> bool {
        self.role == Role::Passenger
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
