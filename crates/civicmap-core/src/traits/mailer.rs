//! Outbound mail seam.
//!
//! The side-effect dispatcher only needs to hand a message to *something*
//! that will deliver it later; the production implementation enqueues a
//! background job, tests substitute an in-memory recorder.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::result::AppResult;

/// A templated email to be delivered asynchronously.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailMessage {
    /// Recipient address.
    pub to_email: String,
    /// Subject line.
    pub subject: String,
    /// Provider-side template identifier.
    pub template: String,
    /// Template substitution context.
    pub context: Value,
}

impl EmailMessage {
    /// Build a message for the given recipient, subject, and template.
    pub fn new(
        to_email: impl Into<String>,
        subject: impl Into<String>,
        template: impl Into<String>,
        context: Value,
    ) -> Self {
        Self {
            to_email: to_email.into(),
            subject: subject.into(),
            template: template.into(),
            context,
        }
    }
}

/// Hands messages to the delivery pipeline.
///
/// `enqueue` returns once the message is durably queued — delivery itself is
/// at-least-once and never awaited by callers. An `Err` therefore means the
/// *enqueue* failed, which callers may treat as best-effort.
#[async_trait]
pub trait Mailer: Send + Sync + std::fmt::Debug {
    /// Queue a message for asynchronous delivery.
    async fn enqueue(&self, message: &EmailMessage) -> AppResult<()>;
}
