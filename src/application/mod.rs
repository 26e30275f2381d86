//! Business logic and use-cases

pub mod identity;
pub mod tickets;
pub mod workflow;

pub use identity::{AuthResult, UserService};
pub use tickets::{TicketDetail, TicketService};
pub use workflow::{AssignmentWorkflow, SignupWorkflow, WorkflowDispatcher};
