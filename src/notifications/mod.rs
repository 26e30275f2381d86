//! In-process pub/sub for service and workflow events

pub mod event_bus;
pub mod events;

pub use event_bus::{create_event_bus, EventBus, EventSubscriber, SharedEventBus};
pub use events::{Event, EventMessage, TicketAssignedEvent, TicketCreatedEvent, UserSignedUpEvent};
