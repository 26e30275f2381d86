pub mod auth;
pub mod health;
pub mod metrics;
pub mod tickets;
pub mod users;
