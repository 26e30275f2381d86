pub mod handlers;

pub use handlers::{HealthResponse, HealthState};
