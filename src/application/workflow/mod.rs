//! Event-driven workflows and their step runner

pub mod assignment;
pub mod dispatcher;
pub mod signup;
pub mod step;

pub use assignment::AssignmentWorkflow;
pub use dispatcher::WorkflowDispatcher;
pub use signup::SignupWorkflow;
pub use step::{StepRunner, WorkflowError, WorkflowResult};
