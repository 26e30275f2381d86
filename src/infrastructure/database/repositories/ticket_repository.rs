use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::domain::{
    CreateTicketDto, DomainError, DomainResult, Ticket, TicketClassification, TicketPriority,
    TicketRepositoryInterface, TicketStatus,
};
use crate::infrastructure::database::entities::ticket;

pub struct TicketRepository {
    db: DatabaseConnection,
}

impl TicketRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn entity_status_to_domain(status: ticket::TicketStatus) -> TicketStatus {
    match status {
        ticket::TicketStatus::Todo => TicketStatus::Todo,
        ticket::TicketStatus::InProgress => TicketStatus::InProgress,
        ticket::TicketStatus::Resolved => TicketStatus::Resolved,
    }
}

fn entity_priority_to_domain(priority: ticket::TicketPriority) -> TicketPriority {
    match priority {
        ticket::TicketPriority::Low => TicketPriority::Low,
        ticket::TicketPriority::Medium => TicketPriority::Medium,
        ticket::TicketPriority::High => TicketPriority::High,
    }
}

fn domain_priority_to_entity(priority: TicketPriority) -> ticket::TicketPriority {
    match priority {
        TicketPriority::Low => ticket::TicketPriority::Low,
        TicketPriority::Medium => ticket::TicketPriority::Medium,
        TicketPriority::High => ticket::TicketPriority::High,
    }
}

fn ticket_model_to_domain(model: ticket::Model) -> Ticket {
    Ticket {
        id: model.id,
        title: model.title,
        description: model.description,
        status: entity_status_to_domain(model.status),
        priority: model.priority.map(entity_priority_to_domain),
        created_by: model.created_by,
        assigned_to: model.assigned_to,
        helpful_notes: model.helpful_notes,
        related_skills: serde_json::from_str(&model.related_skills).unwrap_or_default(),
        deadline: model.deadline,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Storage(e.to_string())
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl TicketRepositoryInterface for TicketRepository {
    async fn create_ticket(&self, dto: CreateTicketDto) -> DomainResult<Ticket> {
        let now = Utc::now();

        let new_ticket = ticket::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            title: Set(dto.title),
            description: Set(dto.description),
            status: Set(ticket::TicketStatus::Todo),
            priority: Set(None),
            created_by: Set(dto.created_by),
            assigned_to: Set(None),
            helpful_notes: Set(None),
            related_skills: Set("[]".to_string()),
            deadline: Set(dto.deadline),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = new_ticket.insert(&self.db).await.map_err(db_err)?;
        Ok(ticket_model_to_domain(model))
    }

    async fn get_ticket_by_id(&self, id: &str) -> DomainResult<Option<Ticket>> {
        let model = ticket::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(ticket_model_to_domain))
    }

    async fn list_all_tickets(&self) -> DomainResult<Vec<Ticket>> {
        let models = ticket::Entity::find()
            .order_by_desc(ticket::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(models.into_iter().map(ticket_model_to_domain).collect())
    }

    async fn list_tickets_by_creator(&self, user_id: &str) -> DomainResult<Vec<Ticket>> {
        let models = ticket::Entity::find()
            .filter(ticket::Column::CreatedBy.eq(user_id))
            .order_by_desc(ticket::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(models.into_iter().map(ticket_model_to_domain).collect())
    }

    async fn apply_classification(
        &self,
        id: &str,
        classification: TicketClassification,
    ) -> DomainResult<()> {
        let existing = ticket::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Ticket", "id", id))?;

        let mut active: ticket::ActiveModel = existing.into();
        active.status = Set(ticket::TicketStatus::InProgress);
        active.priority = Set(Some(domain_priority_to_entity(classification.priority)));
        active.helpful_notes = Set(Some(classification.helpful_notes));
        active.related_skills = Set(
            serde_json::to_string(&classification.related_skills)
                .unwrap_or_else(|_| "[]".to_string()),
        );
        active.updated_at = Set(Utc::now());

        active.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn set_assignee(&self, id: &str, assignee_id: Option<&str>) -> DomainResult<()> {
        let existing = ticket::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Ticket", "id", id))?;

        let mut active: ticket::ActiveModel = existing.into();
        active.assigned_to = Set(assignee_id.map(String::from));
        active.updated_at = Set(Utc::now());

        active.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }
}
