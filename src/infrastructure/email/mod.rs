//! Outbound email delivery

mod smtp;

pub use smtp::SmtpMailer;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("SMTP transport error: {0}")]
    Transport(String),

    #[error("Invalid message: {0}")]
    Message(String),
}

/// Notification email sender.
///
/// The workflow only ever needs plain-text notifications, so the surface
/// is a single send call.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}
