//! SeaORM entities

pub mod ticket;
pub mod user;
