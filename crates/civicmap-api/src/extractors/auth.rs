//! `AuthUser` extractor — verifies the bearer token and injects context.
//!
//! Token issuance belongs to the upstream identity service; this extractor
//! only verifies the HMAC signature and expiry of what it is handed.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use civicmap_core::error::AppError;
use civicmap_entity::user::UserRole;
use civicmap_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Claims carried by the upstream identity service's tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i64,
    /// Account role.
    #[serde(default = "default_role")]
    pub role: UserRole,
    /// Expiry (seconds since epoch).
    pub exp: usize,
}

fn default_role() -> UserRole {
    UserRole::Citizen
}

/// Extracted authenticated user context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Invalid Authorization header format"))?;

        let mut validation = Validation::new(Algorithm::HS256);
        if !state.config.auth.issuer.is_empty() {
            validation.set_issuer(&[state.config.auth.issuer.clone()]);
        }

        let key = DecodingKey::from_secret(state.config.auth.jwt_secret.as_bytes());
        let token_data = decode::<Claims>(token, &key, &validation)
            .map_err(|e| AppError::unauthorized(format!("Invalid token: {e}")))?;

        let ctx = RequestContext::new(token_data.claims.sub, token_data.claims.role);
        Ok(AuthUser(ctx))
    }
}
