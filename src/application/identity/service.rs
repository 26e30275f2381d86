//! User management service — application-layer orchestration
//!
//! All user-related business logic lives here.
//! HTTP handlers should be thin wrappers that delegate to this service.

use std::sync::Arc;

use tracing::info;

use crate::domain::{
    CreateUserDto, DomainError, DomainResult, UpdateUserDto, User, UserRepositoryInterface,
    UserRole,
};
use crate::infrastructure::crypto::jwt::{create_token, JwtConfig};
use crate::infrastructure::crypto::password::{hash_password, verify_password};
use crate::notifications::{Event, SharedEventBus, UserSignedUpEvent};

/// Authentication result returned after signup or login
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

/// User service — orchestrates all identity / user-management use-cases.
pub struct UserService {
    repo: Arc<dyn UserRepositoryInterface>,
    jwt_config: JwtConfig,
    event_bus: SharedEventBus,
}

impl UserService {
    pub fn new(
        repo: Arc<dyn UserRepositoryInterface>,
        jwt_config: JwtConfig,
        event_bus: SharedEventBus,
    ) -> Self {
        Self {
            repo,
            jwt_config,
            event_bus,
        }
    }

    // ── Registration ────────────────────────────────────────────

    /// Register a new user (default role: user) and issue a JWT.
    ///
    /// Publishes `user.signup` for the welcome workflow; emission is
    /// fire-and-forget and does not affect the response.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        skills: Vec<String>,
    ) -> DomainResult<AuthResult> {
        if !email.contains('@') {
            return Err(DomainError::Validation("Invalid email address".into()));
        }
        if password.len() < 6 {
            return Err(DomainError::Validation(
                "Password must be at least 6 characters".into(),
            ));
        }

        // Uniqueness check before any write
        if self.repo.get_user_by_email(email).await?.is_some() {
            return Err(DomainError::Conflict("User already exists".into()));
        }

        let password_hash = hash_password(password)
            .map_err(|e| DomainError::Validation(format!("Failed to hash password: {}", e)))?;

        let user = self
            .repo
            .create_user(CreateUserDto {
                email: email.to_string(),
                password_hash,
                role: None, // default user
                skills,
            })
            .await?;

        self.event_bus.publish(Event::UserSignedUp(UserSignedUpEvent {
            email: user.email.clone(),
        }));

        let token = self.issue_token(&user)?;

        info!(user_id = %user.id, email = %user.email, "New user registered");
        Ok(AuthResult {
            token,
            token_type: "Bearer".into(),
            expires_in: self.jwt_config.expiration_hours * 3600,
            user,
        })
    }

    // ── Authentication ──────────────────────────────────────────

    /// Authenticate by email + password and return a fresh JWT.
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<AuthResult> {
        let user = self
            .repo
            .get_user_by_email(email)
            .await?
            .ok_or_else(|| DomainError::not_found("User", "email", email))?;

        let valid = verify_password(password, &user.password_hash).unwrap_or(false);
        if !valid {
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        }

        let token = self.issue_token(&user)?;

        Ok(AuthResult {
            token,
            token_type: "Bearer".into(),
            expires_in: self.jwt_config.expiration_hours * 3600,
            user,
        })
    }

    // ── Queries ─────────────────────────────────────────────────

    /// List all users. Admin-only.
    pub async fn list_users(&self, caller_role: UserRole) -> DomainResult<Vec<User>> {
        if caller_role != UserRole::Admin {
            return Err(DomainError::Forbidden(
                "Only admins can list users".into(),
            ));
        }
        self.repo.list_users().await
    }

    /// Get a single user by email.
    pub async fn get_user(&self, email: &str) -> DomainResult<User> {
        if email.is_empty() {
            return Err(DomainError::Validation("Email is required".into()));
        }
        self.repo
            .get_user_by_email(email)
            .await?
            .ok_or_else(|| DomainError::not_found("User", "email", email))
    }

    // ── Commands (mutations) ────────────────────────────────────

    /// Admin-only role/skill update.
    ///
    /// An empty skills list leaves the target's existing skills untouched.
    pub async fn update_user(
        &self,
        caller_role: UserRole,
        email: &str,
        dto: UpdateUserDto,
    ) -> DomainResult<User> {
        if caller_role != UserRole::Admin {
            return Err(DomainError::Forbidden(
                "Only admins can update users".into(),
            ));
        }

        self.repo
            .update_user(email, dto)
            .await?
            .ok_or_else(|| DomainError::not_found("User", "email", email))
    }

    // ── Helpers ─────────────────────────────────────────────────

    fn issue_token(&self, user: &User) -> DomainResult<String> {
        create_token(&user.id, &user.email, user.role.as_str(), &self.jwt_config)
            .map_err(|e| DomainError::Validation(format!("Failed to create token: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::crypto::jwt::verify_token;
    use crate::infrastructure::storage::InMemoryUserRepository;
    use crate::notifications::create_event_bus;

    fn service() -> (UserService, Arc<InMemoryUserRepository>) {
        let repo = Arc::new(InMemoryUserRepository::new());
        let service = UserService::new(repo.clone(), JwtConfig::default(), create_event_bus());
        (service, repo)
    }

    #[tokio::test]
    async fn duplicate_signup_conflicts_and_writes_nothing() {
        let (service, repo) = service();
        service
            .signup("dup@helpdesk.io", "password1", vec![])
            .await
            .unwrap();

        let err = service
            .signup("dup@helpdesk.io", "password2", vec!["skill".into()])
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(repo.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn login_token_embeds_stored_role() {
        let (service, repo) = service();
        service
            .signup("mod@helpdesk.io", "password1", vec![])
            .await
            .unwrap();
        repo.update_user(
            "mod@helpdesk.io",
            UpdateUserDto {
                role: Some(UserRole::Moderator),
                skills: vec![],
            },
        )
        .await
        .unwrap();

        let auth = service.login("mod@helpdesk.io", "password1").await.unwrap();
        let claims = verify_token(&auth.token, &JwtConfig::default()).unwrap();
        assert_eq!(claims.role, "moderator");
        assert_eq!(claims.email, "mod@helpdesk.io");
    }

    #[tokio::test]
    async fn wrong_password_never_yields_a_token() {
        let (service, _) = service();
        service
            .signup("u@helpdesk.io", "correct-horse", vec![])
            .await
            .unwrap();

        let err = service
            .login("u@helpdesk.io", "battery-staple")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn login_unknown_email_is_not_found() {
        let (service, _) = service();
        let err = service.login("ghost@helpdesk.io", "pw").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn update_with_empty_skills_preserves_existing() {
        let (service, _) = service();
        service
            .signup("tech@helpdesk.io", "password1", vec!["linux".into()])
            .await
            .unwrap();

        let updated = service
            .update_user(
                UserRole::Admin,
                "tech@helpdesk.io",
                UpdateUserDto {
                    role: Some(UserRole::Moderator),
                    skills: vec![],
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.role, UserRole::Moderator);
        assert_eq!(updated.skills, vec!["linux".to_string()]);
    }

    #[tokio::test]
    async fn update_with_skills_replaces_them() {
        let (service, _) = service();
        service
            .signup("tech@helpdesk.io", "password1", vec!["linux".into()])
            .await
            .unwrap();

        let updated = service
            .update_user(
                UserRole::Admin,
                "tech@helpdesk.io",
                UpdateUserDto {
                    role: None,
                    skills: vec!["windows".into(), "printers".into()],
                },
            )
            .await
            .unwrap();

        assert_eq!(
            updated.skills,
            vec!["windows".to_string(), "printers".to_string()]
        );
    }

    #[tokio::test]
    async fn non_admin_cannot_update_or_list() {
        let (service, _) = service();
        service
            .signup("target@helpdesk.io", "password1", vec![])
            .await
            .unwrap();

        let err = service
            .update_user(
                UserRole::Moderator,
                "target@helpdesk.io",
                UpdateUserDto {
                    role: Some(UserRole::Admin),
                    skills: vec![],
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let err = service.list_users(UserRole::User).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn signup_emits_signup_event() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let bus = create_event_bus();
        let mut subscriber = bus.subscribe();
        let service = UserService::new(repo, JwtConfig::default(), bus.clone());

        service
            .signup("evt@helpdesk.io", "password1", vec![])
            .await
            .unwrap();

        let message =
            tokio::time::timeout(std::time::Duration::from_millis(100), subscriber.recv())
                .await
                .expect("Timeout")
                .expect("No message");
        assert_eq!(message.event.event_type(), "user.signup");
    }
}
