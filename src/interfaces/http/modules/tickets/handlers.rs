//! Ticket API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{CreateTicketRequest, TicketDetailDto, TicketDto};
use crate::application::TicketService;
use crate::interfaces::http::common::{error_response, ApiResponse, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

/// Ticket handler state
#[derive(Clone)]
pub struct TicketHandlerState {
    pub ticket_service: Arc<TicketService>,
}

#[utoipa::path(
    post,
    path = "/api/tickets",
    tag = "Tickets",
    security(("bearer_auth" = [])),
    request_body = CreateTicketRequest,
    responses(
        (status = 201, description = "Ticket created", body = ApiResponse<TicketDto>),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_ticket(
    State(state): State<TicketHandlerState>,
    Extension(caller): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateTicketRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TicketDto>>), (StatusCode, Json<ApiResponse<TicketDto>>)>
{
    match state
        .ticket_service
        .create_ticket(
            &caller.user_id,
            &request.title,
            &request.description,
            request.deadline,
        )
        .await
    {
        Ok(ticket) => Ok((
            StatusCode::CREATED,
            Json(ApiResponse::success(TicketDto::from(ticket))),
        )),
        Err(e) => Err(error_response(e)),
    }
}

#[utoipa::path(
    get,
    path = "/api/tickets",
    tag = "Tickets",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Tickets visible to the caller", body = ApiResponse<Vec<TicketDto>>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_tickets(
    State(state): State<TicketHandlerState>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<TicketDto>>>, (StatusCode, Json<ApiResponse<Vec<TicketDto>>>)> {
    match state
        .ticket_service
        .list_tickets(&caller.user_id, caller.role)
        .await
    {
        Ok(tickets) => {
            let tickets: Vec<TicketDto> = tickets.into_iter().map(TicketDto::from).collect();
            Ok(Json(ApiResponse::success(tickets)))
        }
        Err(e) => Err(error_response(e)),
    }
}

#[utoipa::path(
    get,
    path = "/api/tickets/{id}",
    tag = "Tickets",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Ticket detail with populated assignee", body = ApiResponse<TicketDetailDto>),
        (status = 404, description = "Ticket not found")
    )
)]
pub async fn get_ticket(
    State(state): State<TicketHandlerState>,
    Extension(_caller): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<TicketDetailDto>>, (StatusCode, Json<ApiResponse<TicketDetailDto>>)> {
    match state.ticket_service.get_ticket(&id).await {
        Ok(detail) => Ok(Json(ApiResponse::success(TicketDetailDto::from(detail)))),
        Err(e) => Err(error_response(e)),
    }
}
