//! Ticket model, status and priority types

mod repository;

pub use repository::TicketRepositoryInterface;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ticket lifecycle status.
///
/// The assignment workflow only ever advances `Todo` → `InProgress`;
/// `Resolved` is reached by a human outside this system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    #[serde(rename = "TODO")]
    Todo,
    #[serde(rename = "IN_PROGRESS")]
    InProgress,
    #[serde(rename = "RESOLVED")]
    Resolved,
}

impl Default for TicketStatus {
    fn default() -> Self {
        Self::Todo
    }
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Todo => "TODO",
            TicketStatus::InProgress => "IN_PROGRESS",
            TicketStatus::Resolved => "RESOLVED",
        }
    }
}

/// Ticket priority as assigned by classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketPriority {
    #[serde(rename = "LOW")]
    Low,
    #[serde(rename = "MEDIUM")]
    Medium,
    #[serde(rename = "HIGH")]
    High,
}

impl TicketPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketPriority::Low => "LOW",
            TicketPriority::Medium => "MEDIUM",
            TicketPriority::High => "HIGH",
        }
    }

    /// Normalize a raw provider value: case-insensitive match against the
    /// three known priorities, anything else (including empty) maps to `Low`.
    pub fn normalize(raw: &str) -> Self {
        match raw.to_uppercase().as_str() {
            "MEDIUM" => TicketPriority::Medium,
            "HIGH" => TicketPriority::High,
            _ => TicketPriority::Low,
        }
    }
}

/// Ticket model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: Option<TicketPriority>,
    /// Owning user id. Required, exactly one.
    pub created_by: String,
    /// Assigned moderator/admin id, when the workflow picked one.
    pub assigned_to: Option<String>,
    pub helpful_notes: Option<String>,
    pub related_skills: Vec<String>,
    /// Carried but unused by the assignment workflow.
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateTicketDto {
    pub title: String,
    pub description: String,
    pub created_by: String,
    pub deadline: Option<DateTime<Utc>>,
}

/// Normalized classification write-back applied in one update together
/// with the `Todo` → `InProgress` transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketClassification {
    pub priority: TicketPriority,
    pub helpful_notes: String,
    pub related_skills: Vec<String>,
}
