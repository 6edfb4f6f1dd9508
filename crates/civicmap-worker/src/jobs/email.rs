//! Email delivery job handler.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use civicmap_core::config::mail::MailConfig;
use civicmap_core::traits::mailer::EmailMessage;
use civicmap_entity::job::model::Job;

use crate::executor::{JobExecutionError, JobHandler};

/// Job type for outbound email delivery.
pub const SEND_EMAIL_JOB: &str = "send_email";

/// Delivers queued email through the mail provider's HTTP API.
///
/// With an empty `api_url` the handler logs the message and completes — the
/// mode development and CI run in.
#[derive(Debug)]
pub struct EmailJobHandler {
    /// HTTP client, reused across deliveries.
    client: reqwest::Client,
    /// Mail provider settings.
    config: MailConfig,
}

impl EmailJobHandler {
    /// Create a new email job handler.
    pub fn new(config: MailConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Deliver one message through the provider API.
    async fn deliver(&self, message: &EmailMessage) -> Result<(), JobExecutionError> {
        let body = serde_json::json!({
            "from": self.config.from_email,
            "to": message.to_email,
            "subject": message.subject,
            "template": message.template,
            "context": message.context,
        });

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| JobExecutionError::Transient(format!("Mail provider unreachable: {e}")))?;

        if !response.status().is_success() {
            return Err(JobExecutionError::Transient(format!(
                "Mail provider returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl JobHandler for EmailJobHandler {
    fn job_type(&self) -> &str {
        SEND_EMAIL_JOB
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let message: EmailMessage = serde_json::from_value(job.payload.clone()).map_err(|e| {
            JobExecutionError::Permanent(format!("Malformed send_email payload: {e}"))
        })?;

        if message.to_email.trim().is_empty() {
            return Err(JobExecutionError::Permanent(
                "send_email payload has no recipient".to_string(),
            ));
        }

        if self.config.api_url.is_empty() {
            info!(
                to = %message.to_email,
                subject = %message.subject,
                template = %message.template,
                "Mail provider not configured, log-only delivery"
            );
            return Ok(Some(serde_json::json!({ "delivered": false, "mode": "log" })));
        }

        match self.deliver(&message).await {
            Ok(()) => {
                info!(to = %message.to_email, subject = %message.subject, "Email delivered");
                Ok(Some(serde_json::json!({ "delivered": true })))
            }
            Err(e) => {
                warn!(to = %message.to_email, error = %e, "Email delivery failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use civicmap_entity::job::status::{JobPriority, JobStatus};
    use uuid::Uuid;

    fn job(payload: Value) -> Job {
        let now = Utc::now();
        Job {
            id: Uuid::new_v4(),
            job_type: SEND_EMAIL_JOB.to_string(),
            queue: "mail".to_string(),
            priority: JobPriority::Normal,
            payload,
            error_message: None,
            status: JobStatus::Pending,
            attempts: 1,
            max_attempts: 3,
            worker_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_malformed_payload_is_permanent() {
        let handler = EmailJobHandler::new(MailConfig::default());
        let err = handler
            .execute(&job(serde_json::json!({"nope": true})))
            .await
            .unwrap_err();
        assert!(matches!(err, JobExecutionError::Permanent(_)));
    }

    #[tokio::test]
    async fn test_empty_recipient_is_permanent() {
        let handler = EmailJobHandler::new(MailConfig::default());
        let payload = serde_json::to_value(EmailMessage::new(
            "",
            "Nouvelle demande de collaboration",
            "collaboration_request",
            serde_json::json!({}),
        ))
        .unwrap();
        let err = handler.execute(&job(payload)).await.unwrap_err();
        assert!(matches!(err, JobExecutionError::Permanent(_)));
    }

    #[tokio::test]
    async fn test_log_only_delivery_completes() {
        let handler = EmailJobHandler::new(MailConfig::default());
        let payload = serde_json::to_value(EmailMessage::new(
            "elu@mairie.ml",
            "Nouvelle demande de collaboration",
            "collaboration_request",
            serde_json::json!({"incident_title": "Fuite d'eau"}),
        ))
        .unwrap();
        let result = handler.execute(&job(payload)).await.unwrap().unwrap();
        assert_eq!(result["delivered"], false);
        assert_eq!(result["mode"], "log");
    }
}
