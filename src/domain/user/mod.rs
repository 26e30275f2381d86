//! User model and role types

mod repository;

pub use repository::UserRepositoryInterface;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Moderator,
    Admin,
}

impl Default for UserRole {
    fn default() -> Self {
        Self::User
    }
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Moderator => "moderator",
            UserRole::Admin => "admin",
        }
    }

    /// Parse a role string. Unknown values map to the default `user` role.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "admin" => UserRole::Admin,
            "moderator" => UserRole::Moderator,
            _ => UserRole::User,
        }
    }
}

/// User model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a user. The password is hashed by the caller;
/// repositories never see plaintext credentials.
#[derive(Debug, Clone)]
pub struct CreateUserDto {
    pub email: String,
    pub password_hash: String,
    pub role: Option<UserRole>,
    pub skills: Vec<String>,
}

/// Payload for the admin role/skill update.
///
/// An empty `skills` list leaves the target's existing skills untouched
/// (explicit no-op-on-empty, not a clear-all).
#[derive(Debug, Clone)]
pub struct UpdateUserDto {
    pub role: Option<UserRole>,
    pub skills: Vec<String>,
}

/// Case-insensitive substring intersection between a user's skill set and
/// the skills a ticket was classified with.
///
/// A user skill counts as a match when it contains any of the wanted
/// skills as a substring ("Networking" matches "networking"). An empty
/// wanted list matches nothing, so callers fall through to the admin
/// fallback instead of picking an arbitrary moderator.
pub fn skills_intersect(user_skills: &[String], wanted: &[String]) -> bool {
    if wanted.is_empty() {
        return false;
    }
    user_skills.iter().any(|skill| {
        let skill = skill.to_lowercase();
        wanted
            .iter()
            .any(|w| !w.is_empty() && skill.contains(&w.to_lowercase()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_defaults_to_user() {
        assert_eq!(UserRole::parse("admin"), UserRole::Admin);
        assert_eq!(UserRole::parse("Moderator"), UserRole::Moderator);
        assert_eq!(UserRole::parse("superuser"), UserRole::User);
        assert_eq!(UserRole::parse(""), UserRole::User);
    }

    #[test]
    fn skills_match_is_case_insensitive_substring() {
        let skills = vec!["Networking".to_string(), "Linux Admin".to_string()];
        assert!(skills_intersect(&skills, &["networking".to_string()]));
        assert!(skills_intersect(&skills, &["linux".to_string()]));
        assert!(!skills_intersect(&skills, &["databases".to_string()]));
    }

    #[test]
    fn empty_wanted_skills_match_nothing() {
        let skills = vec!["Networking".to_string()];
        assert!(!skills_intersect(&skills, &[]));
        assert!(!skills_intersect(&skills, &[String::new()]));
    }
}
