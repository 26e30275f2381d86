//! Ticket assignment workflow
//!
//! Triggered once per `ticket.created` event: fetch → classify →
//! moderator selection → assignment → notification. Steps run through
//! the [`StepRunner`], so each is retried independently and completed
//! steps are not re-executed when a later step fails.

use std::sync::Arc;

use tracing::{info, warn};

use super::step::{StepRunner, WorkflowError, WorkflowResult};
use crate::domain::{
    Ticket, TicketClassification, TicketPriority, TicketRepositoryInterface, User,
    UserRepositoryInterface, UserRole,
};
use crate::infrastructure::classifier::Classifier;
use crate::infrastructure::email::Mailer;
use crate::notifications::{Event, SharedEventBus, TicketAssignedEvent};
use crate::shared::RetryConfig;

pub struct AssignmentWorkflow {
    tickets: Arc<dyn TicketRepositoryInterface>,
    users: Arc<dyn UserRepositoryInterface>,
    classifier: Arc<dyn Classifier>,
    mailer: Arc<dyn Mailer>,
    event_bus: SharedEventBus,
    retry: RetryConfig,
}

impl AssignmentWorkflow {
    pub fn new(
        tickets: Arc<dyn TicketRepositoryInterface>,
        users: Arc<dyn UserRepositoryInterface>,
        classifier: Arc<dyn Classifier>,
        mailer: Arc<dyn Mailer>,
        event_bus: SharedEventBus,
    ) -> Self {
        Self {
            tickets,
            users,
            classifier,
            mailer,
            event_bus,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// One workflow run for a freshly created ticket.
    pub async fn on_ticket_created(&self, ticket_id: &str) -> WorkflowResult<()> {
        let mut step = StepRunner::with_retry(self.retry.clone());

        let ticket: Ticket = step
            .run("get-ticket", || {
                let tickets = Arc::clone(&self.tickets);
                let id = ticket_id.to_string();
                async move {
                    tickets.get_ticket_by_id(&id).await?.ok_or_else(|| {
                        WorkflowError::NonRetriable(format!("Ticket not found: {}", id))
                    })
                }
            })
            .await?;

        // Classification writes back priority/notes/skills and advances the
        // status to IN_PROGRESS in one update. Provider failures are
        // tolerated: the ticket simply stays unclassified.
        let related_skills: Vec<String> = step
            .run("classify", || {
                let tickets = Arc::clone(&self.tickets);
                let classifier = Arc::clone(&self.classifier);
                let ticket = ticket.clone();
                async move {
                    match classifier
                        .classify(&ticket.title, &ticket.description)
                        .await
                    {
                        Ok(Some(result)) => {
                            let skills = result.related_skills.clone();
                            tickets
                                .apply_classification(
                                    &ticket.id,
                                    TicketClassification {
                                        priority: TicketPriority::normalize(&result.priority),
                                        helpful_notes: result.helpful_notes,
                                        related_skills: result.related_skills,
                                    },
                                )
                                .await?;
                            metrics::counter!("tickets_classified_total").increment(1);
                            Ok(skills)
                        }
                        Ok(None) => {
                            info!(ticket_id = %ticket.id, "Classifier returned no result, continuing unclassified");
                            Ok(Vec::new())
                        }
                        Err(e) => {
                            warn!(ticket_id = %ticket.id, error = %e, "Classification failed, continuing unclassified");
                            Ok(Vec::new())
                        }
                    }
                }
            })
            .await?;

        let assignee: Option<User> = step
            .run("assign-moderator", || {
                let users = Arc::clone(&self.users);
                let tickets = Arc::clone(&self.tickets);
                let event_bus = Arc::clone(&self.event_bus);
                let related_skills = related_skills.clone();
                let ticket_id = ticket.id.clone();
                async move {
                    let user = match users.find_moderator_with_skills(&related_skills).await? {
                        Some(moderator) => Some(moderator),
                        None => users.find_first_by_role(UserRole::Admin).await?,
                    };

                    tickets
                        .set_assignee(&ticket_id, user.as_ref().map(|u| u.id.as_str()))
                        .await?;

                    match &user {
                        Some(user) => {
                            let assignee_kind = match user.role {
                                UserRole::Admin => "admin",
                                _ => "moderator",
                            };
                            metrics::counter!("tickets_assigned_total", "fallback" => assignee_kind)
                                .increment(1);
                            event_bus.publish(Event::TicketAssigned(TicketAssignedEvent {
                                ticket_id: ticket_id.clone(),
                                assignee_id: user.id.clone(),
                            }));
                            info!(ticket_id = %ticket_id, assignee = %user.email, "Ticket assigned");
                        }
                        None => {
                            warn!(ticket_id = %ticket_id, "No moderator or admin available, ticket left unassigned");
                        }
                    }

                    Ok(user)
                }
            })
            .await?;

        step.run("send-notification", || {
            let tickets = Arc::clone(&self.tickets);
            let mailer = Arc::clone(&self.mailer);
            let assignee = assignee.clone();
            let ticket_id = ticket.id.clone();
            async move {
                // No assignee means nobody to notify; that is not an error
                let Some(user) = assignee else {
                    return Ok(());
                };

                // Re-read so the email carries the post-classification priority
                let current = tickets.get_ticket_by_id(&ticket_id).await?.ok_or_else(|| {
                    WorkflowError::NonRetriable(format!("Ticket not found: {}", ticket_id))
                })?;
                let priority = current.priority.unwrap_or(TicketPriority::Low);

                let subject = format!("New Ticket Assigned: {}", current.title);
                let body = format!(
                    "A new ticket has been assigned to you:\n\n\
                     Title: {}\nDescription: {}\nPriority: {}\n\n\
                     Please check the ticket for more details.",
                    current.title,
                    current.description,
                    priority.as_str(),
                );

                mailer.send(&user.email, &subject, &body).await?;
                metrics::counter!("notifications_sent_total").increment(1);
                Ok(())
            }
        })
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::{CreateTicketDto, CreateUserDto, TicketStatus};
    use crate::infrastructure::classifier::{Classification, ClassifierError};
    use crate::infrastructure::email::MailError;
    use crate::infrastructure::storage::{InMemoryTicketRepository, InMemoryUserRepository};
    use crate::notifications::create_event_bus;

    enum StubResponse {
        Classified(Classification),
        Empty,
        Fail,
    }

    struct StubClassifier {
        response: StubResponse,
    }

    #[async_trait]
    impl Classifier for StubClassifier {
        async fn classify(
            &self,
            _title: &str,
            _description: &str,
        ) -> Result<Option<Classification>, ClassifierError> {
            match &self.response {
                StubResponse::Classified(c) => Ok(Some(c.clone())),
                StubResponse::Empty => Ok(None),
                StubResponse::Fail => Err(ClassifierError::RequestFailed("timeout".into())),
            }
        }
    }

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<(String, String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
            if self.fail {
                return Err(MailError::Transport("connection refused".into()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), subject.to_string(), body.to_string()));
            Ok(())
        }
    }

    struct Fixture {
        tickets: Arc<InMemoryTicketRepository>,
        users: Arc<InMemoryUserRepository>,
        mailer: Arc<RecordingMailer>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                tickets: Arc::new(InMemoryTicketRepository::new()),
                users: Arc::new(InMemoryUserRepository::new()),
                mailer: Arc::new(RecordingMailer::default()),
            }
        }

        fn workflow(&self, response: StubResponse) -> AssignmentWorkflow {
            AssignmentWorkflow::new(
                self.tickets.clone(),
                self.users.clone(),
                Arc::new(StubClassifier { response }),
                self.mailer.clone(),
                create_event_bus(),
            )
            .with_retry(RetryConfig {
                max_attempts: 3,
                initial_delay: Duration::from_millis(1),
                backoff_multiplier: 2.0,
                max_delay: Duration::from_millis(4),
            })
        }

        async fn add_user(&self, email: &str, role: UserRole, skills: &[&str]) -> User {
            self.users
                .create_user(CreateUserDto {
                    email: email.to_string(),
                    password_hash: "hash".to_string(),
                    role: Some(role),
                    skills: skills.iter().map(|s| s.to_string()).collect(),
                })
                .await
                .unwrap()
        }

        async fn add_ticket(&self, title: &str, description: &str) -> Ticket {
            self.tickets
                .create_ticket(CreateTicketDto {
                    title: title.to_string(),
                    description: description.to_string(),
                    created_by: "creator-1".to_string(),
                    deadline: None,
                })
                .await
                .unwrap()
        }
    }

    #[tokio::test]
    async fn unmatched_skills_fall_back_to_admin() {
        let fx = Fixture::new();
        let admin = fx.add_user("admin@helpdesk.io", UserRole::Admin, &[]).await;
        fx.add_user("mod@helpdesk.io", UserRole::Moderator, &["databases"])
            .await;
        let ticket = fx.add_ticket("Printer jam", "Office printer jammed").await;

        fx.workflow(StubResponse::Classified(Classification {
            priority: "LOW".into(),
            helpful_notes: "Check the feed tray".into(),
            related_skills: vec!["printers".into()],
        }))
        .on_ticket_created(&ticket.id)
        .await
        .unwrap();

        let stored = fx.tickets.get_ticket_by_id(&ticket.id).await.unwrap().unwrap();
        assert_eq!(stored.status, TicketStatus::InProgress);
        assert_eq!(stored.priority, Some(TicketPriority::Low));
        assert_eq!(stored.assigned_to.as_deref(), Some(admin.id.as_str()));

        let sent = fx.mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "admin@helpdesk.io");
        assert!(sent[0].1.contains("Printer jam"));
        assert!(sent[0].2.contains("Priority: LOW"));
    }

    #[tokio::test]
    async fn unknown_priority_normalizes_to_low_and_matching_moderator_wins() {
        let fx = Fixture::new();
        fx.add_user("admin@helpdesk.io", UserRole::Admin, &[]).await;
        let moderator = fx
            .add_user("mod@helpdesk.io", UserRole::Moderator, &["Networking"])
            .await;
        let ticket = fx.add_ticket("VPN down", "Cannot reach the VPN").await;

        fx.workflow(StubResponse::Classified(Classification {
            priority: "urgent".into(),
            helpful_notes: "Check tunnel config".into(),
            related_skills: vec!["networking".into()],
        }))
        .on_ticket_created(&ticket.id)
        .await
        .unwrap();

        let stored = fx.tickets.get_ticket_by_id(&ticket.id).await.unwrap().unwrap();
        // "urgent" is not a recognized priority, so it defaults to LOW
        assert_eq!(stored.priority, Some(TicketPriority::Low));
        assert_eq!(stored.assigned_to.as_deref(), Some(moderator.id.as_str()));
        assert_eq!(stored.related_skills, vec!["networking".to_string()]);

        let sent = fx.mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "mod@helpdesk.io");
    }

    #[tokio::test]
    async fn classifier_failure_continues_unclassified() {
        let fx = Fixture::new();
        let admin = fx.add_user("admin@helpdesk.io", UserRole::Admin, &[]).await;
        let ticket = fx.add_ticket("Weird bug", "Something is off").await;

        fx.workflow(StubResponse::Fail)
            .on_ticket_created(&ticket.id)
            .await
            .unwrap();

        let stored = fx.tickets.get_ticket_by_id(&ticket.id).await.unwrap().unwrap();
        // No classification: status and priority untouched, skills empty
        assert_eq!(stored.status, TicketStatus::Todo);
        assert_eq!(stored.priority, None);
        assert!(stored.related_skills.is_empty());
        // Still routed to the admin fallback and notified
        assert_eq!(stored.assigned_to.as_deref(), Some(admin.id.as_str()));
        assert_eq!(fx.mailer.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_classification_behaves_like_failure() {
        let fx = Fixture::new();
        fx.add_user("admin@helpdesk.io", UserRole::Admin, &[]).await;
        let ticket = fx.add_ticket("Odd one", "No details").await;

        fx.workflow(StubResponse::Empty)
            .on_ticket_created(&ticket.id)
            .await
            .unwrap();

        let stored = fx.tickets.get_ticket_by_id(&ticket.id).await.unwrap().unwrap();
        assert_eq!(stored.status, TicketStatus::Todo);
        assert!(stored.related_skills.is_empty());
    }

    #[tokio::test]
    async fn missing_ticket_aborts_without_retry() {
        let fx = Fixture::new();
        let err = fx
            .workflow(StubResponse::Empty)
            .on_ticket_created("no-such-ticket")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NonRetriable(_)));
    }

    #[tokio::test]
    async fn no_assignee_means_no_notification() {
        let fx = Fixture::new();
        // Only plain users exist: neither moderator nor admin
        fx.add_user("someone@helpdesk.io", UserRole::User, &[]).await;
        let ticket = fx.add_ticket("Lonely ticket", "Nobody to take it").await;

        fx.workflow(StubResponse::Classified(Classification {
            priority: "HIGH".into(),
            helpful_notes: "n".into(),
            related_skills: vec!["anything".into()],
        }))
        .on_ticket_created(&ticket.id)
        .await
        .unwrap();

        let stored = fx.tickets.get_ticket_by_id(&ticket.id).await.unwrap().unwrap();
        assert_eq!(stored.assigned_to, None);
        assert!(fx.mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn mail_failure_fails_the_run_but_keeps_assignment() {
        let fx = Fixture::new();
        fx.add_user("admin@helpdesk.io", UserRole::Admin, &[]).await;
        let ticket = fx.add_ticket("T", "D").await;

        let failing_mailer = Arc::new(RecordingMailer {
            sent: Mutex::new(Vec::new()),
            fail: true,
        });
        let workflow = AssignmentWorkflow::new(
            fx.tickets.clone(),
            fx.users.clone(),
            Arc::new(StubClassifier {
                response: StubResponse::Empty,
            }),
            failing_mailer,
            create_event_bus(),
        )
        .with_retry(RetryConfig {
            max_attempts: 2,
            initial_delay: Duration::from_millis(1),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_millis(2),
        });

        let err = workflow.on_ticket_created(&ticket.id).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Mail(_)));

        // Earlier steps already committed their writes
        let stored = fx.tickets.get_ticket_by_id(&ticket.id).await.unwrap().unwrap();
        assert!(stored.assigned_to.is_some());
    }
}
