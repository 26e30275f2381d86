//! External concerns: persistence, crypto, outbound providers

pub mod classifier;
pub mod crypto;
pub mod database;
pub mod email;
pub mod storage;

pub use database::{init_database, DatabaseConfig};
