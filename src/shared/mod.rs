//! Cross-cutting helpers

pub mod retry;
pub mod shutdown;

pub use retry::{retry_with_backoff, RetryConfig};
pub use shutdown::{listen_for_shutdown_signals, ShutdownSignal};
