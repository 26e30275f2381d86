use async_trait::async_trait;

use super::{CreateTicketDto, Ticket, TicketClassification};
use crate::domain::DomainResult;

#[async_trait]
pub trait TicketRepositoryInterface: Send + Sync {
    async fn create_ticket(&self, dto: CreateTicketDto) -> DomainResult<Ticket>;

    async fn get_ticket_by_id(&self, id: &str) -> DomainResult<Option<Ticket>>;
    async fn list_all_tickets(&self) -> DomainResult<Vec<Ticket>>;
    async fn list_tickets_by_creator(&self, user_id: &str) -> DomainResult<Vec<Ticket>>;

    /// Write back priority, helpful notes and related skills and advance
    /// the status to `IN_PROGRESS`, all in one update.
    async fn apply_classification(
        &self,
        id: &str,
        classification: TicketClassification,
    ) -> DomainResult<()>;

    /// Record the assignee chosen by the workflow (`None` clears it).
    async fn set_assignee(&self, id: &str, assignee_id: Option<&str>) -> DomainResult<()>;
}
