//! Ticket text classification provider

mod http;

pub use http::HttpClassifier;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw classification result as returned by the provider.
///
/// `priority` is kept verbatim; the workflow normalizes it against the
/// known priority values (unknown → LOW).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub helpful_notes: String,
    #[serde(default)]
    pub related_skills: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Classification request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse classification response: {0}")]
    ResponseParse(String),

    #[error("Classification provider rate limited")]
    RateLimited,

    #[error("Classification provider rejected credentials")]
    Unauthorized,

    #[error("Classification provider error {status}: {message}")]
    Api { status: u16, message: String },
}

/// Text classification provider.
///
/// `Ok(None)` means the provider answered but produced no usable
/// classification; callers treat errors the same way and keep going.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(
        &self,
        title: &str,
        description: &str,
    ) -> Result<Option<Classification>, ClassifierError>;
}
