//! Ticket intake use-cases

pub mod service;

pub use service::{TicketDetail, TicketService};
