//! Token verification configuration.
//!
//! Civicmap does not issue tokens — an upstream identity service does.
//! This section only carries what is needed to verify incoming bearer tokens.

use serde::{Deserialize, Serialize};

/// Bearer token verification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret shared with the token issuer.
    pub jwt_secret: String,
    /// Accepted token issuer (empty = not checked).
    #[serde(default)]
    pub issuer: String,
}
