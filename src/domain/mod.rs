//! Core business entities, types and repository traits

pub mod error;
pub mod ticket;
pub mod user;

pub use error::{DomainError, DomainResult};
pub use ticket::{
    CreateTicketDto, Ticket, TicketClassification, TicketPriority, TicketRepositoryInterface,
    TicketStatus,
};
pub use user::{
    skills_intersect, CreateUserDto, UpdateUserDto, User, UserRepositoryInterface, UserRole,
};
