//! Authentication API handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};

use super::dto::{AuthResponse, LoginRequest, SignupRequest};
use crate::application::UserService;
use crate::interfaces::http::common::{error_response, ApiResponse, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

/// Auth handler state
#[derive(Clone)]
pub struct AuthHandlerState {
    pub user_service: Arc<UserService>,
}

#[utoipa::path(
    post,
    path = "/api/user/signup",
    tag = "Authentication",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Email already registered"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn signup(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<SignupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), (StatusCode, Json<ApiResponse<AuthResponse>>)>
{
    match state
        .user_service
        .signup(&request.email, &request.password, request.skills)
        .await
    {
        Ok(result) => Ok((
            StatusCode::CREATED,
            Json(ApiResponse::success(AuthResponse::from(result))),
        )),
        Err(e) => Err(error_response(e)),
    }
}

#[utoipa::path(
    post,
    path = "/api/user/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid credentials"),
        (status = 404, description = "No such user")
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, (StatusCode, Json<ApiResponse<AuthResponse>>)> {
    match state
        .user_service
        .login(&request.email, &request.password)
        .await
    {
        Ok(result) => Ok(Json(ApiResponse::success(AuthResponse::from(result)))),
        Err(e) => Err(error_response(e)),
    }
}

#[utoipa::path(
    get,
    path = "/api/user/logout",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Acknowledged"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn logout(Extension(_caller): Extension<AuthenticatedUser>) -> Json<ApiResponse<String>> {
    // Tokens are self-contained; invalidation is the caller's concern
    Json(ApiResponse::success("Logout successful".to_string()))
}
