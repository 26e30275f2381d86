//! User management API handlers
//!
//! One route serves both contracts for `/api/user/users`: a bare call is
//! the admin-gated listing, `?email=` is a single-user lookup available
//! to any authenticated caller.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};

use super::dto::{ListUsersParams, UpdateUserRequest, UserDto};
use crate::application::UserService;
use crate::domain::{UpdateUserDto, UserRole};
use crate::interfaces::http::common::{error_response, ApiResponse, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

/// User handler state
#[derive(Clone)]
pub struct UserHandlerState {
    pub user_service: Arc<UserService>,
}

#[utoipa::path(
    get,
    path = "/api/user/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(ListUsersParams),
    responses(
        (status = 200, description = "User list (bare) or single user (?email=)", body = ApiResponse<Vec<UserDto>>),
        (status = 400, description = "Empty email parameter"),
        (status = 403, description = "Listing requires admin"),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_users(
    State(state): State<UserHandlerState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Query(params): Query<ListUsersParams>,
) -> Response {
    match params.email {
        Some(email) => match state.user_service.get_user(&email).await {
            Ok(user) => Json(ApiResponse::success(UserDto::from(user))).into_response(),
            Err(e) => error_response::<UserDto>(e).into_response(),
        },
        None => match state.user_service.list_users(caller.role).await {
            Ok(users) => {
                let users: Vec<UserDto> = users.into_iter().map(UserDto::from).collect();
                Json(ApiResponse::success(users)).into_response()
            }
            Err(e) => error_response::<Vec<UserDto>>(e).into_response(),
        },
    }
}

#[utoipa::path(
    post,
    path = "/api/user/update",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserDto>),
        (status = 403, description = "Admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    State(state): State<UserHandlerState>,
    Extension(caller): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserDto>>, (StatusCode, Json<ApiResponse<UserDto>>)> {
    let dto = UpdateUserDto {
        role: request.role.as_deref().map(UserRole::parse),
        skills: request.skills,
    };

    match state
        .user_service
        .update_user(caller.role, &request.email, dto)
        .await
    {
        Ok(user) => Ok(Json(ApiResponse::success(UserDto::from(user)))),
        Err(e) => Err(error_response(e)),
    }
}
