//! # Helpdesk Ticket-Intake Service
//!
//! Users submit support tickets over a JSON API, an asynchronous workflow
//! classifies each ticket and routes it to a moderator, and admin-only
//! endpoints manage user roles and skills.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Core business entities, types and repository traits
//! - **application**: Business logic, services and the event-driven workflows
//! - **infrastructure**: External concerns (database, crypto, SMTP, classifier)
//! - **interfaces**: REST API with Swagger documentation
//! - **notifications**: In-process event bus wiring services to workflows

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod notifications;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig};

// Re-export API router
pub use interfaces::http::create_api_router;

// Re-export notifications
pub use notifications::{create_event_bus, Event, EventBus, SharedEventBus};
