pub mod dto;
pub mod handlers;

pub use dto::{AuthResponse, LoginRequest, SignupRequest};
pub use handlers::AuthHandlerState;
