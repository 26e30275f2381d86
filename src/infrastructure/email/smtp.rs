//! SMTP mailer built on Lettre

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use super::{MailError, Mailer};
use crate::config::SmtpConfig;

/// SMTP email sender.
///
/// Uses STARTTLS by default; set `implicit_tls` for SMTPS relays.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_email: String,
    from_name: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let builder = if config.implicit_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| MailError::Transport(format!("SMTP relay error: {}", e)))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| MailError::Transport(format!("SMTP relay error: {}", e)))?
        };

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from_email: config.from_email.clone(),
            from_name: config.from_name.clone(),
        })
    }

    fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        let message = Message::builder()
            .from(
                self.from_header()
                    .parse::<Mailbox>()
                    .map_err(|e| MailError::Message(format!("Invalid sender: {}", e)))?,
            )
            .to(to
                .parse::<Mailbox>()
                .map_err(|e| MailError::Message(format!("Invalid recipient: {}", e)))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| MailError::Message(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        info!(to, subject, "Email sent");
        Ok(())
    }
}
