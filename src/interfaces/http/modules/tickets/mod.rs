pub mod dto;
pub mod handlers;

pub use dto::{CreateTicketRequest, TicketDetailDto, TicketDto};
pub use handlers::TicketHandlerState;
