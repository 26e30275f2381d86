pub mod dto;
pub mod handlers;

pub use dto::{ListUsersParams, UpdateUserRequest, UserDto};
pub use handlers::UserHandlerState;
