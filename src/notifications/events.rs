//! Event types carried on the in-process bus
//!
//! Emission is fire-and-forget: delivery happens only to subscribers that
//! were attached at publish time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Events published by the services and the assignment workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    /// A ticket was persisted; triggers the assignment workflow
    TicketCreated(TicketCreatedEvent),
    /// A user signed up; triggers the welcome email workflow
    UserSignedUp(UserSignedUpEvent),
    /// The workflow assigned a ticket to a moderator/admin
    TicketAssigned(TicketAssignedEvent),
}

impl Event {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::TicketCreated(_) => "ticket.created",
            Event::UserSignedUp(_) => "user.signup",
            Event::TicketAssigned(_) => "ticket.assigned",
        }
    }

    /// Get the ticket ID if applicable
    pub fn ticket_id(&self) -> Option<&str> {
        match self {
            Event::TicketCreated(e) => Some(&e.ticket_id),
            Event::TicketAssigned(e) => Some(&e.ticket_id),
            Event::UserSignedUp(_) => None,
        }
    }
}

/// "Ticket created" event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketCreatedEvent {
    pub ticket_id: String,
}

/// "User signed up" event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSignedUpEvent {
    pub email: String,
}

/// "Ticket assigned" event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketAssignedEvent {
    pub ticket_id: String,
    pub assignee_id: String,
}

/// Wrapper for sending events with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: Event,
}

impl EventMessage {
    pub fn new(event: Event) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event,
        }
    }
}
