use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::domain::{
    skills_intersect, CreateUserDto, DomainError, DomainResult, UpdateUserDto, User,
    UserRepositoryInterface, UserRole,
};
use crate::infrastructure::database::entities::user;

pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn entity_role_to_domain(role: user::UserRole) -> UserRole {
    match role {
        user::UserRole::User => UserRole::User,
        user::UserRole::Moderator => UserRole::Moderator,
        user::UserRole::Admin => UserRole::Admin,
    }
}

fn domain_role_to_entity(role: &UserRole) -> user::UserRole {
    match role {
        UserRole::User => user::UserRole::User,
        UserRole::Moderator => user::UserRole::Moderator,
        UserRole::Admin => user::UserRole::Admin,
    }
}

fn user_model_to_domain(model: user::Model) -> User {
    User {
        id: model.id,
        email: model.email,
        password_hash: model.password_hash,
        role: entity_role_to_domain(model.role),
        skills: serde_json::from_str(&model.skills).unwrap_or_default(),
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn encode_skills(skills: &[String]) -> String {
    serde_json::to_string(skills).unwrap_or_else(|_| "[]".to_string())
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Storage(e.to_string())
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepositoryInterface for UserRepository {
    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<User> {
        let now = Utc::now();
        let id = uuid::Uuid::new_v4().to_string();

        let role = dto
            .role
            .as_ref()
            .map_or(user::UserRole::User, domain_role_to_entity);

        let new_user = user::ActiveModel {
            id: Set(id),
            email: Set(dto.email),
            password_hash: Set(dto.password_hash),
            role: Set(role),
            skills: Set(encode_skills(&dto.skills)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = new_user.insert(&self.db).await.map_err(|e| {
            if e.to_string().contains("UNIQUE") || e.to_string().contains("duplicate") {
                DomainError::Conflict("Email already exists".to_string())
            } else {
                db_err(e)
            }
        })?;

        Ok(user_model_to_domain(model))
    }

    async fn list_users(&self) -> DomainResult<Vec<User>> {
        let models = user::Entity::find()
            .order_by_asc(user::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(models.into_iter().map(user_model_to_domain).collect())
    }

    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(user_model_to_domain))
    }

    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(user_model_to_domain))
    }

    async fn count_users(&self) -> DomainResult<u64> {
        user::Entity::find().count(&self.db).await.map_err(db_err)
    }

    async fn update_user(&self, email: &str, dto: UpdateUserDto) -> DomainResult<Option<User>> {
        let existing = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut active: user::ActiveModel = existing.into();

        if let Some(role) = dto.role {
            active.role = Set(domain_role_to_entity(&role));
        }
        // Empty skill list leaves the stored skills untouched
        if !dto.skills.is_empty() {
            active.skills = Set(encode_skills(&dto.skills));
        }

        active.updated_at = Set(Utc::now());

        let updated = active.update(&self.db).await.map_err(db_err)?;
        Ok(Some(user_model_to_domain(updated)))
    }

    async fn find_moderator_with_skills(
        &self,
        related_skills: &[String],
    ) -> DomainResult<Option<User>> {
        // Skills live in a JSON-encoded column, so the substring match
        // happens here rather than in SQL.
        let moderators = user::Entity::find()
            .filter(user::Column::Role.eq(user::UserRole::Moderator))
            .order_by_asc(user::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(moderators
            .into_iter()
            .map(user_model_to_domain)
            .find(|u| skills_intersect(&u.skills, related_skills)))
    }

    async fn find_first_by_role(&self, role: UserRole) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Role.eq(domain_role_to_entity(&role)))
            .order_by_asc(user::Column::CreatedAt)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(user_model_to_domain))
    }
}
