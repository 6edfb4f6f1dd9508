//! Outbound mail configuration.

use serde::{Deserialize, Serialize};

/// Mail provider settings.
///
/// Delivery goes through the provider's HTTP API. An empty `api_url`
/// switches delivery to log-only mode, which is what development and CI use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Mail provider HTTP endpoint (empty = log-only delivery).
    #[serde(default)]
    pub api_url: String,
    /// Bearer token for the provider API.
    #[serde(default)]
    pub api_key: String,
    /// Sender address.
    #[serde(default = "default_from_email")]
    pub from_email: String,
    /// Maximum delivery attempts per message.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: i32,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_key: String::new(),
            from_email: default_from_email(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_from_email() -> String {
    "no-reply@civicmap.example".to_string()
}

fn default_max_attempts() -> i32 {
    3
}
