//! SeaORM-backed repository implementations

pub mod ticket_repository;
pub mod user_repository;

pub use ticket_repository::TicketRepository;
pub use user_repository::UserRepository;
