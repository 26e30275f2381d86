//! Workflow step runner
//!
//! Steps are named units executed in order within one workflow run. Each
//! completed step's result is serialized into a per-run cache keyed by the
//! step name, so re-entering the run resumes at the first not-yet-cached
//! step instead of re-executing earlier side effects. Each step is retried
//! with exponential backoff unless its error is marked non-retriable.

use std::collections::HashMap;
use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::domain::DomainError;
use crate::infrastructure::email::MailError;
use crate::shared::{retry_with_backoff, RetryConfig};

#[derive(Debug, Error)]
pub enum WorkflowError {
    /// No amount of retrying can help (missing data, programming error).
    /// Aborts the run immediately.
    #[error("Non-retriable: {0}")]
    NonRetriable(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Mail(#[from] MailError),

    #[error("Step result serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WorkflowError {
    pub fn is_retriable(&self) -> bool {
        !matches!(
            self,
            WorkflowError::NonRetriable(_) | WorkflowError::Serialization(_)
        )
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Executes named steps with retry and per-run result memoization.
pub struct StepRunner {
    retry: RetryConfig,
    cache: HashMap<String, serde_json::Value>,
}

impl StepRunner {
    pub fn new() -> Self {
        Self::with_retry(RetryConfig::default())
    }

    pub fn with_retry(retry: RetryConfig) -> Self {
        Self {
            retry,
            cache: HashMap::new(),
        }
    }

    /// Run a named step, returning the cached result when the step already
    /// completed in this run.
    pub async fn run<T, F, Fut>(&mut self, name: &str, operation: F) -> WorkflowResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnMut() -> Fut,
        Fut: Future<Output = WorkflowResult<T>>,
    {
        if let Some(cached) = self.cache.get(name) {
            return serde_json::from_value(cached.clone()).map_err(WorkflowError::from);
        }

        let value = retry_with_backoff(
            self.retry.clone(),
            operation,
            WorkflowError::is_retriable,
            name,
        )
        .await?;

        self.cache.insert(name.to_string(), serde_json::to_value(&value)?);
        Ok(value)
    }
}

impl Default for StepRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use super::*;

    fn fast_retry() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_millis(4),
        }
    }

    #[tokio::test]
    async fn completed_step_is_memoized() {
        let mut runner = StepRunner::with_retry(fast_retry());
        let executions = AtomicU32::new(0);

        for _ in 0..3 {
            let value: u32 = runner
                .run("compute", || async {
                    executions.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
                .await
                .unwrap();
            assert_eq!(value, 42);
        }

        // The side effect ran exactly once; later calls hit the cache
        assert_eq!(executions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn step_retries_on_retriable_error() {
        let mut runner = StepRunner::with_retry(fast_retry());
        let attempts = AtomicU32::new(0);

        let value: String = runner
            .run("flaky", || async {
                let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Err(WorkflowError::Domain(DomainError::Storage(
                        "connection reset".to_string(),
                    )))
                } else {
                    Ok("done".to_string())
                }
            })
            .await
            .unwrap();

        assert_eq!(value, "done");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retriable_error_aborts_without_retry() {
        let mut runner = StepRunner::with_retry(fast_retry());
        let attempts = AtomicU32::new(0);

        let result: WorkflowResult<()> = runner
            .run("missing", || async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(WorkflowError::NonRetriable("ticket not found".to_string()))
            })
            .await;

        assert!(matches!(result, Err(WorkflowError::NonRetriable(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_step_is_not_cached() {
        let mut runner = StepRunner::with_retry(RetryConfig {
            max_attempts: 1,
            ..fast_retry()
        });
        let attempts = AtomicU32::new(0);

        let first: WorkflowResult<u32> = runner
            .run("eventually", || async {
                let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                if n == 1 {
                    Err(WorkflowError::Domain(DomainError::Storage("down".into())))
                } else {
                    Ok(n)
                }
            })
            .await;
        assert!(first.is_err());

        // A later re-entry re-executes the failed step
        let second: u32 = runner
            .run("eventually", || async {
                let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                if n == 1 {
                    Err(WorkflowError::Domain(DomainError::Storage("down".into())))
                } else {
                    Ok(n)
                }
            })
            .await
            .unwrap();
        assert_eq!(second, 2);
    }
}
