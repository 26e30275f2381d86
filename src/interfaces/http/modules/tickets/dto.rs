//! Ticket DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::super::users::UserDto;
use crate::application::TicketDetail;
use crate::domain::{Ticket, TicketPriority};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTicketRequest {
    #[validate(length(min = 1, max = 200, message = "title must be 1–200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    pub deadline: Option<DateTime<Utc>>,
}

/// Ticket API representation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TicketDto {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: Option<String>,
    pub created_by: String,
    pub assigned_to: Option<String>,
    pub helpful_notes: Option<String>,
    pub related_skills: Vec<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Ticket> for TicketDto {
    fn from(t: Ticket) -> Self {
        Self {
            id: t.id,
            title: t.title,
            description: t.description,
            status: t.status.as_str().to_string(),
            priority: t.priority.map(|p: TicketPriority| p.as_str().to_string()),
            created_by: t.created_by,
            assigned_to: t.assigned_to,
            helpful_notes: t.helpful_notes,
            related_skills: t.related_skills,
            deadline: t.deadline,
            created_at: t.created_at,
        }
    }
}

/// Ticket detail with the assignee's public record populated
#[derive(Debug, Serialize, ToSchema)]
pub struct TicketDetailDto {
    #[serde(flatten)]
    pub ticket: TicketDto,
    pub assignee: Option<UserDto>,
}

impl From<TicketDetail> for TicketDetailDto {
    fn from(detail: TicketDetail) -> Self {
        Self {
            ticket: TicketDto::from(detail.ticket),
            assignee: detail.assignee.map(UserDto::from),
        }
    }
}
