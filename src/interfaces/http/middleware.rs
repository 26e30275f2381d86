//! Authentication middleware for Axum
//!
//! Validates the `Authorization: Bearer <jwt>` header and attaches the
//! caller's identity and role to the request extensions.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domain::UserRole;
use crate::infrastructure::crypto::jwt::{verify_token, Claims, JwtConfig};

/// Authentication state for the middleware
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

/// Authenticated caller attached to the request
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            role: UserRole::parse(&claims.role),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Errors produced by the auth middleware
#[derive(Debug, Clone)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
    InsufficientPermissions,
}

/// Extract token from Authorization header
fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

/// JWT authentication middleware - requires a valid token
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(String::from);
    let Some(auth_header) = auth_header else {
        return auth_error_response(AuthError::MissingToken);
    };

    let Some(token) = extract_token(&auth_header) else {
        return auth_error_response(AuthError::InvalidToken);
    };

    match verify_token(token, &auth_state.jwt_config) {
        Ok(claims) => {
            if claims.is_expired() {
                return auth_error_response(AuthError::ExpiredToken);
            }

            let user = AuthenticatedUser::from_claims(claims);
            request.extensions_mut().insert(user);

            next.run(request).await
        }
        Err(_) => auth_error_response(AuthError::InvalidToken),
    }
}

/// Admin-only middleware - must be layered after `auth_middleware`
pub async fn admin_middleware(request: Request<Body>, next: Next) -> Response {
    let user = request.extensions().get::<AuthenticatedUser>();

    match user {
        Some(user) if user.is_admin() => next.run(request).await,
        Some(_) => auth_error_response(AuthError::InsufficientPermissions),
        None => auth_error_response(AuthError::MissingToken),
    }
}

/// Create an authentication error response
fn auth_error_response(error: AuthError) -> Response {
    let (status, message) = match error {
        AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing authentication token"),
        AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid authentication token"),
        AuthError::ExpiredToken => (StatusCode::UNAUTHORIZED, "Token has expired"),
        AuthError::InsufficientPermissions => (StatusCode::FORBIDDEN, "Insufficient permissions"),
    };

    let body = Json(json!({
        "success": false,
        "error": message
    }));

    (status, body).into_response()
}
