//! User DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::domain::User;

/// Public user representation (credential hash stripped)
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: String,
    pub email: String,
    pub role: String,
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            role: u.role.as_str().to_string(),
            skills: u.skills,
            created_at: u.created_at,
        }
    }
}

/// Query parameters for `GET /api/user/users`
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListUsersParams {
    /// When present, look up this single user instead of listing
    pub email: Option<String>,
}

/// Admin role/skill update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    #[validate(custom(function = "validate_role"))]
    pub role: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

fn validate_role(role: &str) -> Result<(), ValidationError> {
    match role {
        "user" | "moderator" | "admin" => Ok(()),
        _ => {
            let mut err = ValidationError::new("role");
            err.message = Some("role must be one of: user, moderator, admin".into());
            Err(err)
        }
    }
}
