use async_trait::async_trait;

use super::{CreateUserDto, UpdateUserDto, User, UserRole};
use crate::domain::DomainResult;

#[async_trait]
pub trait UserRepositoryInterface: Send + Sync {
    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<User>;

    async fn list_users(&self) -> DomainResult<Vec<User>>;
    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>>;
    async fn count_users(&self) -> DomainResult<u64>;

    /// Apply the admin role/skill update to the user with the given email.
    /// Returns `None` when no such user exists.
    async fn update_user(&self, email: &str, dto: UpdateUserDto) -> DomainResult<Option<User>>;

    /// First moderator whose skills intersect `related_skills`
    /// (case-insensitive substring match). `None` when nobody matches.
    async fn find_moderator_with_skills(
        &self,
        related_skills: &[String],
    ) -> DomainResult<Option<User>>;

    /// First user with the given role, in creation order.
    async fn find_first_by_role(&self, role: UserRole) -> DomainResult<Option<User>>;
}
