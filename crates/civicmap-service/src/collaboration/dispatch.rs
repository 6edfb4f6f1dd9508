//! Side-effect dispatch for collaboration state changes.
//!
//! When a collaboration is created, the incident's responsible party gets a
//! queued email and a persisted in-app notification; when one is declined,
//! the requesting user gets a queued email. Once the collaboration row is
//! committed, every step here is best-effort: failures are logged and
//! swallowed, never propagated to the HTTP layer.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, error, warn};

use civicmap_core::traits::mailer::{EmailMessage, Mailer};
use civicmap_database::repositories::notification::NotificationRepository;
use civicmap_entity::collaboration::model::Collaboration;
use civicmap_entity::incident::model::Incident;
use civicmap_entity::notification::model::NewNotification;
use civicmap_entity::user::model::User;

/// Subject line for the collaboration request email.
pub const REQUEST_EMAIL_SUBJECT: &str = "Nouvelle demande de collaboration";
/// Subject line for the decline email.
pub const DECLINE_EMAIL_SUBJECT: &str = "Demande de collaboration déclinée";
/// Provider template for the collaboration request email.
pub const REQUEST_EMAIL_TEMPLATE: &str = "collaboration_request";
/// Provider template for the decline email.
pub const DECLINE_EMAIL_TEMPLATE: &str = "decline_email";

/// What the dispatcher should do after a collaboration is created.
///
/// Computed from pure inputs so the creation path can decide — before
/// committing — whether the notify contract is fulfillable at all.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchPlan {
    /// The incident has no responsible party; the collaboration stands alone.
    NoRecipient,
    /// A responsible party exists but cannot receive email. The creation path
    /// treats this as a hard failure and rolls the record back.
    MissingEmail {
        /// The unreachable responsible party.
        recipient_id: i64,
    },
    /// Email the responsible party and persist an in-app notification.
    Notify {
        /// The responsible party.
        recipient_id: i64,
        /// The email to enqueue.
        email: EmailMessage,
        /// Text of the in-app notification.
        notification_message: String,
    },
}

/// Decide how to notify the incident's responsible party about a new request.
pub fn plan_request_dispatch(
    incident: &Incident,
    recipient: Option<&User>,
    requester: &User,
) -> DispatchPlan {
    let Some(recipient) = recipient else {
        return DispatchPlan::NoRecipient;
    };

    if !recipient.has_email() {
        return DispatchPlan::MissingEmail {
            recipient_id: recipient.id,
        };
    }

    let organisation = requester.organisation_label();
    let email = EmailMessage::new(
        recipient.email.clone(),
        REQUEST_EMAIL_SUBJECT,
        REQUEST_EMAIL_TEMPLATE,
        json!({
            "incident_title": incident.title,
            "organisation": organisation,
        }),
    );
    let notification_message = format!(
        "Nouvelle demande de collaboration de {organisation} sur l'incident {}",
        incident.title
    );

    DispatchPlan::Notify {
        recipient_id: recipient.id,
        email,
        notification_message,
    }
}

/// Build the email sent to the requesting user when their request is declined.
pub fn decline_email(collaboration: &Collaboration, requester: &User) -> EmailMessage {
    EmailMessage::new(
        requester.email.clone(),
        DECLINE_EMAIL_SUBJECT,
        DECLINE_EMAIL_TEMPLATE,
        json!({
            "incident_id": collaboration.incident_id,
            "organisation": requester.organisation_label(),
        }),
    )
}

/// Executes dispatch plans: queues email and persists notifications.
#[derive(Debug, Clone)]
pub struct CollaborationDispatcher {
    /// Notification repository.
    notification_repo: Arc<NotificationRepository>,
    /// Outbound mail queue.
    mailer: Arc<dyn Mailer>,
}

impl CollaborationDispatcher {
    /// Creates a new dispatcher.
    pub fn new(notification_repo: Arc<NotificationRepository>, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            notification_repo,
            mailer,
        }
    }

    /// Run the side effects for a freshly created collaboration.
    ///
    /// The in-app notification is only persisted once the email is
    /// successfully enqueued; a failed enqueue leaves the collaboration
    /// without any notification row.
    pub async fn dispatch_request(&self, collaboration: &Collaboration, plan: DispatchPlan) {
        match plan {
            DispatchPlan::NoRecipient => {
                debug!(
                    collaboration_id = collaboration.id,
                    incident_id = collaboration.incident_id,
                    "Incident has no responsible party, skipping notification"
                );
            }
            DispatchPlan::MissingEmail { recipient_id } => {
                // The creation path rolls back before reaching dispatch.
                warn!(
                    collaboration_id = collaboration.id,
                    recipient_id, "Dispatch invoked for an unreachable recipient"
                );
            }
            DispatchPlan::Notify {
                recipient_id,
                email,
                notification_message,
            } => {
                if let Err(e) = self.mailer.enqueue(&email).await {
                    warn!(
                        collaboration_id = collaboration.id,
                        recipient_id,
                        error = %e,
                        "Failed to enqueue collaboration request email, skipping notification"
                    );
                    return;
                }

                let new = NewNotification {
                    user_id: recipient_id,
                    message: notification_message,
                    collaboration_id: collaboration.id,
                };
                if let Err(e) = self.notification_repo.create(&new).await {
                    error!(
                        collaboration_id = collaboration.id,
                        recipient_id,
                        error = %e,
                        "Failed to persist notification after email enqueue"
                    );
                }
            }
        }
    }

    /// Run the side effects for a declined collaboration.
    ///
    /// Decline emails the requesting user but persists no notification row.
    pub async fn dispatch_decline(&self, collaboration: &Collaboration, requester: &User) {
        if !requester.has_email() {
            debug!(
                collaboration_id = collaboration.id,
                user_id = requester.id,
                "Requesting user has no email, skipping decline email"
            );
            return;
        }

        let email = decline_email(collaboration, requester);
        if let Err(e) = self.mailer.enqueue(&email).await {
            warn!(
                collaboration_id = collaboration.id,
                user_id = requester.id,
                error = %e,
                "Failed to enqueue decline email"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use civicmap_core::result::AppResult;
    use civicmap_entity::collaboration::status::CollaborationStatus;
    use civicmap_entity::incident::model::IncidentStatus;
    use civicmap_entity::user::role::UserRole;

    fn incident(taken_by: Option<i64>) -> Incident {
        Incident {
            id: 7,
            title: "Décharge sauvage au bord du fleuve".to_string(),
            zone: "Badalabougou".to_string(),
            description: None,
            status: IncidentStatus::Taken,
            reported_by: Some(1),
            taken_by,
            created_at: Utc::now(),
        }
    }

    fn user(id: i64, email: &str, organisation: Option<&str>) -> User {
        User {
            id,
            email: email.to_string(),
            first_name: "Moussa".to_string(),
            last_name: "Traoré".to_string(),
            organisation: organisation.map(String::from),
            role: UserRole::Elu,
            created_at: Utc::now(),
        }
    }

    fn collaboration() -> Collaboration {
        Collaboration {
            id: 42,
            incident_id: 7,
            user_id: 1,
            created_at: Utc::now(),
            end_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            motivation: None,
            other_option: None,
            status: CollaborationStatus::Pending,
        }
    }

    #[test]
    fn test_plan_without_responsible_party() {
        let requester = user(1, "a@x.com", Some("Association Delta"));
        let plan = plan_request_dispatch(&incident(None), None, &requester);
        assert_eq!(plan, DispatchPlan::NoRecipient);
    }

    #[test]
    fn test_plan_with_unreachable_recipient() {
        let requester = user(1, "a@x.com", Some("Association Delta"));
        let recipient = user(2, "", None);
        let plan = plan_request_dispatch(&incident(Some(2)), Some(&recipient), &requester);
        assert_eq!(plan, DispatchPlan::MissingEmail { recipient_id: 2 });
    }

    #[test]
    fn test_plan_embeds_organisation_and_title() {
        let requester = user(1, "a@x.com", Some("Association Delta"));
        let recipient = user(2, "b@x.com", Some("Mairie"));
        let plan = plan_request_dispatch(&incident(Some(2)), Some(&recipient), &requester);

        let DispatchPlan::Notify {
            recipient_id,
            email,
            notification_message,
        } = plan
        else {
            panic!("expected Notify plan");
        };

        assert_eq!(recipient_id, 2);
        assert_eq!(email.to_email, "b@x.com");
        assert_eq!(email.subject, REQUEST_EMAIL_SUBJECT);
        assert_eq!(email.template, REQUEST_EMAIL_TEMPLATE);
        assert_eq!(
            email.context["incident_title"],
            "Décharge sauvage au bord du fleuve"
        );
        assert_eq!(email.context["organisation"], "Association Delta");
        assert!(notification_message.contains("Association Delta"));
        assert!(notification_message.contains("Décharge sauvage au bord du fleuve"));
    }

    #[test]
    fn test_plan_falls_back_to_requester_name() {
        let requester = user(1, "a@x.com", None);
        let recipient = user(2, "b@x.com", None);
        let plan = plan_request_dispatch(&incident(Some(2)), Some(&recipient), &requester);

        let DispatchPlan::Notify {
            notification_message,
            ..
        } = plan
        else {
            panic!("expected Notify plan");
        };
        assert!(notification_message.contains("Moussa Traoré"));
    }

    #[derive(Debug, Default)]
    struct RecordingMailer {
        sent: std::sync::Mutex<Vec<EmailMessage>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl Mailer for RecordingMailer {
        async fn enqueue(&self, message: &EmailMessage) -> AppResult<()> {
            if self.fail {
                return Err(civicmap_core::AppError::mail("queue unavailable"));
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn dispatcher(mailer: Arc<RecordingMailer>) -> CollaborationDispatcher {
        // The pool is never connected; these tests only exercise paths that
        // stop before touching the notification table.
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://civicmap@localhost/civicmap_test")
            .unwrap();
        CollaborationDispatcher::new(Arc::new(NotificationRepository::new(pool)), mailer)
    }

    #[tokio::test]
    async fn test_decline_skips_requester_without_email() {
        let mailer = Arc::new(RecordingMailer::default());
        let requester = user(1, "", Some("Association Delta"));

        dispatcher(Arc::clone(&mailer))
            .dispatch_decline(&collaboration(), &requester)
            .await;

        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_decline_enqueues_email_for_requester() {
        let mailer = Arc::new(RecordingMailer::default());
        let requester = user(1, "a@x.com", Some("Association Delta"));

        dispatcher(Arc::clone(&mailer))
            .dispatch_decline(&collaboration(), &requester)
            .await;

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, DECLINE_EMAIL_SUBJECT);
        assert_eq!(sent[0].to_email, "a@x.com");
    }

    #[tokio::test]
    async fn test_decline_swallows_enqueue_failure() {
        let mailer = Arc::new(RecordingMailer {
            fail: true,
            ..Default::default()
        });
        let requester = user(1, "a@x.com", None);

        // Must not panic or propagate.
        dispatcher(Arc::clone(&mailer))
            .dispatch_decline(&collaboration(), &requester)
            .await;
    }

    #[tokio::test]
    async fn test_request_dispatch_stops_after_failed_enqueue() {
        let mailer = Arc::new(RecordingMailer {
            fail: true,
            ..Default::default()
        });
        let requester = user(1, "a@x.com", Some("Association Delta"));
        let recipient = user(2, "b@x.com", None);
        let plan = plan_request_dispatch(&incident(Some(2)), Some(&recipient), &requester);

        // A failed enqueue skips notification creation entirely, so the
        // unconnected pool is never used.
        dispatcher(Arc::clone(&mailer))
            .dispatch_request(&collaboration(), plan)
            .await;
    }

    #[test]
    fn test_decline_email_context() {
        let requester = user(1, "a@x.com", Some("Association Delta"));
        let email = decline_email(&collaboration(), &requester);
        assert_eq!(email.to_email, "a@x.com");
        assert_eq!(email.subject, DECLINE_EMAIL_SUBJECT);
        assert_eq!(email.template, DECLINE_EMAIL_TEMPLATE);
        assert_eq!(email.context["incident_id"], 7);
        assert_eq!(email.context["organisation"], "Association Delta");
    }
}
