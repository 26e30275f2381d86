//! Ticket intake service
//!
//! Owns the create/read side of the ticket lifecycle. All post-creation
//! mutation happens in the assignment workflow.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::domain::{
    CreateTicketDto, DomainError, DomainResult, Ticket, TicketRepositoryInterface, User,
    UserRepositoryInterface, UserRole,
};
use crate::notifications::{Event, SharedEventBus, TicketCreatedEvent};

/// Ticket detail with the assignee's record populated, when present.
#[derive(Debug, Clone)]
pub struct TicketDetail {
    pub ticket: Ticket,
    pub assignee: Option<User>,
}

pub struct TicketService {
    tickets: Arc<dyn TicketRepositoryInterface>,
    users: Arc<dyn UserRepositoryInterface>,
    event_bus: SharedEventBus,
}

impl TicketService {
    pub fn new(
        tickets: Arc<dyn TicketRepositoryInterface>,
        users: Arc<dyn UserRepositoryInterface>,
        event_bus: SharedEventBus,
    ) -> Self {
        Self {
            tickets,
            users,
            event_bus,
        }
    }

    /// Persist a new ticket and publish `ticket.created`.
    ///
    /// Persistence and emission are not transactional: when nobody consumes
    /// the event the ticket stays unprocessed (the bus logs that case).
    pub async fn create_ticket(
        &self,
        creator_id: &str,
        title: &str,
        description: &str,
        deadline: Option<DateTime<Utc>>,
    ) -> DomainResult<Ticket> {
        if title.trim().is_empty() {
            return Err(DomainError::Validation("Title is required".into()));
        }
        if description.trim().is_empty() {
            return Err(DomainError::Validation("Description is required".into()));
        }

        let ticket = self
            .tickets
            .create_ticket(CreateTicketDto {
                title: title.trim().to_string(),
                description: description.to_string(),
                created_by: creator_id.to_string(),
                deadline,
            })
            .await?;

        self.event_bus.publish(Event::TicketCreated(TicketCreatedEvent {
            ticket_id: ticket.id.clone(),
        }));

        info!(ticket_id = %ticket.id, creator = creator_id, "Ticket created");
        Ok(ticket)
    }

    /// Role-scoped listing: admins see everything, everyone else only
    /// their own tickets. Newest first.
    pub async fn list_tickets(
        &self,
        caller_id: &str,
        caller_role: UserRole,
    ) -> DomainResult<Vec<Ticket>> {
        match caller_role {
            UserRole::Admin => self.tickets.list_all_tickets().await,
            _ => self.tickets.list_tickets_by_creator(caller_id).await,
        }
    }

    /// Full ticket detail with the assignee populated.
    pub async fn get_ticket(&self, id: &str) -> DomainResult<TicketDetail> {
        let ticket = self
            .tickets
            .get_ticket_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Ticket", "id", id))?;

        let assignee = match ticket.assigned_to.as_deref() {
            Some(user_id) => self.users.get_user_by_id(user_id).await?,
            None => None,
        };

        Ok(TicketDetail { ticket, assignee })
    }
}
