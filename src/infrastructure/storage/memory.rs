//! In-memory repository implementations for development and testing

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use crate::domain::{
    skills_intersect, CreateTicketDto, CreateUserDto, DomainError, DomainResult, Ticket,
    TicketClassification, TicketRepositoryInterface, TicketStatus, UpdateUserDto, User,
    UserRepositoryInterface, UserRole,
};

/// In-memory user store. Insertion order is tracked explicitly so that
/// "first admin" queries behave like the SQL `ORDER BY created_at`.
pub struct InMemoryUserRepository {
    users: DashMap<String, (u64, User)>,
    seq: AtomicU64,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            seq: AtomicU64::new(0),
        }
    }

    fn sorted_users(&self) -> Vec<User> {
        let mut entries: Vec<(u64, User)> = self
            .users
            .iter()
            .map(|e| (e.value().0, e.value().1.clone()))
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, u)| u).collect()
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepositoryInterface for InMemoryUserRepository {
    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<User> {
        if self
            .users
            .iter()
            .any(|e| e.value().1.email == dto.email)
        {
            return Err(DomainError::Conflict("Email already exists".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            email: dto.email,
            password_hash: dto.password_hash,
            role: dto.role.unwrap_or_default(),
            skills: dto.skills,
            created_at: now,
            updated_at: now,
        };

        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        self.users.insert(user.id.clone(), (seq, user.clone()));
        Ok(user)
    }

    async fn list_users(&self) -> DomainResult<Vec<User>> {
        Ok(self.sorted_users())
    }

    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        Ok(self.users.get(id).map(|e| e.value().1.clone()))
    }

    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        Ok(self
            .sorted_users()
            .into_iter()
            .find(|u| u.email == email))
    }

    async fn count_users(&self) -> DomainResult<u64> {
        Ok(self.users.len() as u64)
    }

    async fn update_user(&self, email: &str, dto: UpdateUserDto) -> DomainResult<Option<User>> {
        let id = match self.sorted_users().into_iter().find(|u| u.email == email) {
            Some(u) => u.id,
            None => return Ok(None),
        };

        let mut entry = self
            .users
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("User", "id", id.clone()))?;
        let user = &mut entry.value_mut().1;

        if let Some(role) = dto.role {
            user.role = role;
        }
        if !dto.skills.is_empty() {
            user.skills = dto.skills;
        }
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn find_moderator_with_skills(
        &self,
        related_skills: &[String],
    ) -> DomainResult<Option<User>> {
        Ok(self
            .sorted_users()
            .into_iter()
            .filter(|u| u.role == UserRole::Moderator)
            .find(|u| skills_intersect(&u.skills, related_skills)))
    }

    async fn find_first_by_role(&self, role: UserRole) -> DomainResult<Option<User>> {
        Ok(self
            .sorted_users()
            .into_iter()
            .find(|u| u.role == role))
    }
}

/// In-memory ticket store
pub struct InMemoryTicketRepository {
    tickets: DashMap<String, (u64, Ticket)>,
    seq: AtomicU64,
}

impl InMemoryTicketRepository {
    pub fn new() -> Self {
        Self {
            tickets: DashMap::new(),
            seq: AtomicU64::new(0),
        }
    }

    fn sorted_desc(&self) -> Vec<Ticket> {
        let mut entries: Vec<(u64, Ticket)> = self
            .tickets
            .iter()
            .map(|e| (e.value().0, e.value().1.clone()))
            .collect();
        entries.sort_by_key(|(seq, _)| std::cmp::Reverse(*seq));
        entries.into_iter().map(|(_, t)| t).collect()
    }
}

impl Default for InMemoryTicketRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TicketRepositoryInterface for InMemoryTicketRepository {
    async fn create_ticket(&self, dto: CreateTicketDto) -> DomainResult<Ticket> {
        let now = Utc::now();
        let ticket = Ticket {
            id: uuid::Uuid::new_v4().to_string(),
            title: dto.title,
            description: dto.description,
            status: TicketStatus::Todo,
            priority: None,
            created_by: dto.created_by,
            assigned_to: None,
            helpful_notes: None,
            related_skills: Vec::new(),
            deadline: dto.deadline,
            created_at: now,
            updated_at: now,
        };

        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        self.tickets.insert(ticket.id.clone(), (seq, ticket.clone()));
        Ok(ticket)
    }

    async fn get_ticket_by_id(&self, id: &str) -> DomainResult<Option<Ticket>> {
        Ok(self.tickets.get(id).map(|e| e.value().1.clone()))
    }

    async fn list_all_tickets(&self) -> DomainResult<Vec<Ticket>> {
        Ok(self.sorted_desc())
    }

    async fn list_tickets_by_creator(&self, user_id: &str) -> DomainResult<Vec<Ticket>> {
        Ok(self
            .sorted_desc()
            .into_iter()
            .filter(|t| t.created_by == user_id)
            .collect())
    }

    async fn apply_classification(
        &self,
        id: &str,
        classification: TicketClassification,
    ) -> DomainResult<()> {
        let mut entry = self
            .tickets
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("Ticket", "id", id))?;
        let ticket = &mut entry.value_mut().1;

        ticket.status = TicketStatus::InProgress;
        ticket.priority = Some(classification.priority);
        ticket.helpful_notes = Some(classification.helpful_notes);
        ticket.related_skills = classification.related_skills;
        ticket.updated_at = Utc::now();
        Ok(())
    }

    async fn set_assignee(&self, id: &str, assignee_id: Option<&str>) -> DomainResult<()> {
        let mut entry = self
            .tickets
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("Ticket", "id", id))?;
        let ticket = &mut entry.value_mut().1;

        ticket.assigned_to = assignee_id.map(String::from);
        ticket.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let repo = InMemoryUserRepository::new();
        let dto = CreateUserDto {
            email: "a@example.com".to_string(),
            password_hash: "hash".to_string(),
            role: None,
            skills: vec![],
        };
        repo.create_user(dto.clone()).await.unwrap();

        let err = repo.create_user(dto).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(repo.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn first_by_role_respects_insertion_order() {
        let repo = InMemoryUserRepository::new();
        for email in ["first-admin@x.com", "second-admin@x.com"] {
            repo.create_user(CreateUserDto {
                email: email.to_string(),
                password_hash: "h".to_string(),
                role: Some(UserRole::Admin),
                skills: vec![],
            })
            .await
            .unwrap();
        }

        let admin = repo
            .find_first_by_role(UserRole::Admin)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.email, "first-admin@x.com");
    }

    #[tokio::test]
    async fn tickets_list_newest_first() {
        let repo = InMemoryTicketRepository::new();
        for title in ["one", "two", "three"] {
            repo.create_ticket(CreateTicketDto {
                title: title.to_string(),
                description: "d".to_string(),
                created_by: "u-1".to_string(),
                deadline: None,
            })
            .await
            .unwrap();
        }

        let all = repo.list_all_tickets().await.unwrap();
        let titles: Vec<&str> = all.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["three", "two", "one"]);
    }
}
