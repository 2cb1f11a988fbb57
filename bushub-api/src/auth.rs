use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use uuid::Uuid;

use crate::state::AppState;
use bushub_domain::user::{Identity, Role};

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

// ============================================================================
// Caller extraction
// ============================================================================

/// Caller identity from the Authorization header, if a valid token was
/// presented. Handlers pass the inner Option to the reservation service,
/// which owns the role decisions — so a missing or bad token is not a
/// rejection here.
pub struct CallerIdentity(pub Option<Identity>);

impl FromRequestParts<AppState> for CallerIdentity {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(CallerIdentity(identity_from_parts(parts, state)))
    }
}

fn identity_from_parts(parts: &Parts, state: &AppState) -> Option<Identity> {
    let auth_header = parts.headers.get("Authorization")?.to_str().ok()?;
    let token = auth_header.strip_prefix("Bearer ")?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .ok()?;

    let user_id = Uuid::parse_str(&token_data.claims.sub).ok()?;
    let role = Role::parse(&token_data.claims.role)?;

    Some(Identity { user_id, role })
}
