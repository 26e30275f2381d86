//! Signup welcome workflow
//!
//! Triggered once per `user.signup` event: fetch the user, send a
//! welcome email. Fire-and-forget from the signup handler's perspective.

use std::sync::Arc;

use super::step::{StepRunner, WorkflowError, WorkflowResult};
use crate::domain::{User, UserRepositoryInterface};
use crate::infrastructure::email::Mailer;
use crate::shared::RetryConfig;

pub struct SignupWorkflow {
    users: Arc<dyn UserRepositoryInterface>,
    mailer: Arc<dyn Mailer>,
    retry: RetryConfig,
}

impl SignupWorkflow {
    pub fn new(users: Arc<dyn UserRepositoryInterface>, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            users,
            mailer,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub async fn on_user_signed_up(&self, email: &str) -> WorkflowResult<()> {
        let mut step = StepRunner::with_retry(self.retry.clone());

        let user: User = step
            .run("get-user", || {
                let users = Arc::clone(&self.users);
                let email = email.to_string();
                async move {
                    users.get_user_by_email(&email).await?.ok_or_else(|| {
                        WorkflowError::NonRetriable(format!("User not found: {}", email))
                    })
                }
            })
            .await?;

        step.run("send-welcome-email", || {
            let mailer = Arc::clone(&self.mailer);
            let user = user.clone();
            async move {
                let subject = "Welcome to the Ticketing System";
                let body = format!(
                    "Hello {},\n\nThank you for signing up! We're excited to have you on board.",
                    user.email
                );
                mailer.send(&user.email, subject, &body).await?;
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
    use crate::domain::CreateUserDto;
    use crate::infrastructure::email::MailError;
    use crate::infrastructure::storage::InMemoryUserRepository;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, to: &str, _subject: &str, _body: &str) -> Result<(), MailError> {
            self.sent.lock().unwrap().push(to.to_string());
            Ok(())
        }
    }

    fn fast_retry() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_millis(4),
        }
    }

    #[tokio::test]
    async fn welcomes_registered_user() {
        let users = Arc::new(InMemoryUserRepository::new());
        users
            .create_user(CreateUserDto {
                email: "new@helpdesk.io".to_string(),
                password_hash: "hash".to_string(),
                role: None,
                skills: vec![],
            })
            .await
            .unwrap();
        let mailer = Arc::new(RecordingMailer::default());

        SignupWorkflow::new(users, mailer.clone())
            .with_retry(fast_retry())
            .on_user_signed_up("new@helpdesk.io")
            .await
            .unwrap();

        assert_eq!(*mailer.sent.lock().unwrap(), vec!["new@helpdesk.io"]);
    }

    #[tokio::test]
    async fn unknown_user_is_non_retriable() {
        let users = Arc::new(InMemoryUserRepository::new());
        let mailer = Arc::new(RecordingMailer::default());

        let err = SignupWorkflow::new(users, mailer.clone())
            .with_retry(fast_retry())
            .on_user_signed_up("ghost@helpdesk.io")
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::NonRetriable(_)));
        assert!(mailer.sent.lock().unwrap().is_empty());
    }
}
