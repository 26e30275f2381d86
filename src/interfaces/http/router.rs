//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{TicketService, UserService};
use crate::domain::UserRepositoryInterface;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::http::common::ApiResponse;
use crate::interfaces::http::middleware::{auth_middleware, AuthState};
use crate::interfaces::http::modules::{auth, health, metrics, tickets, users};

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::handlers::health_check,
        auth::handlers::signup,
        auth::handlers::login,
        auth::handlers::logout,
        users::handlers::list_users,
        users::handlers::update_user,
        tickets::handlers::create_ticket,
        tickets::handlers::list_tickets,
        tickets::handlers::get_ticket,
    ),
    components(schemas(
        ApiResponse<String>,
        auth::SignupRequest,
        auth::LoginRequest,
        auth::AuthResponse,
        users::UserDto,
        users::UpdateUserRequest,
        tickets::CreateTicketRequest,
        tickets::TicketDto,
        tickets::TicketDetailDto,
        health::HealthResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Signup, login and logout"),
        (name = "Users", description = "User listing and admin role/skill management"),
        (name = "Tickets", description = "Ticket intake and lookup"),
        (name = "Health", description = "Service health"),
    )
)]
struct ApiDoc;

/// Build the full API router.
pub fn create_api_router(
    user_service: Arc<UserService>,
    ticket_service: Arc<TicketService>,
    users_repo: Arc<dyn UserRepositoryInterface>,
    jwt_config: JwtConfig,
    prometheus_handle: PrometheusHandle,
) -> Router {
    let middleware_state = AuthState { jwt_config };

    let auth_state = auth::AuthHandlerState {
        user_service: user_service.clone(),
    };
    let user_state = users::UserHandlerState { user_service };
    let ticket_state = tickets::TicketHandlerState { ticket_service };
    let health_state = health::HealthState {
        users: users_repo,
        started_at: Arc::new(Instant::now()),
    };
    let metrics_state = metrics::MetricsState {
        handle: prometheus_handle,
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Auth routes (public)
    let user_public_routes = Router::new()
        .route("/signup", post(auth::handlers::signup))
        .route("/login", post(auth::handlers::login))
        .with_state(auth_state.clone());

    // Auth routes (protected)
    let user_session_routes = Router::new()
        .route("/logout", get(auth::handlers::logout))
        .layer(middleware::from_fn_with_state(
            middleware_state.clone(),
            auth_middleware,
        ))
        .with_state(auth_state);

    // User management routes (protected; listing is admin-gated in-service)
    let user_admin_routes = Router::new()
        .route("/users", get(users::handlers::list_users))
        .route("/update", post(users::handlers::update_user))
        .layer(middleware::from_fn_with_state(
            middleware_state.clone(),
            auth_middleware,
        ))
        .with_state(user_state);

    // Ticket routes (protected)
    let ticket_routes = Router::new()
        .route(
            "/",
            post(tickets::handlers::create_ticket).get(tickets::handlers::list_tickets),
        )
        .route("/{id}", get(tickets::handlers::get_ticket))
        .layer(middleware::from_fn_with_state(
            middleware_state,
            auth_middleware,
        ))
        .with_state(ticket_state);

    let health_routes = Router::new()
        .route("/health", get(health::handlers::health_check))
        .with_state(health_state);

    let metrics_routes = Router::new()
        .route("/metrics", get(metrics::prometheus_metrics))
        .with_state(metrics_state);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    // Build router
    Router::new()
        .merge(swagger_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .nest("/api/user", user_public_routes)
        .nest("/api/user", user_session_routes)
        .nest("/api/user", user_admin_routes)
        .nest("/api/tickets", ticket_routes)
        // Middleware
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::{UpdateUserDto, UserRepositoryInterface, UserRole};
    use crate::infrastructure::storage::{InMemoryTicketRepository, InMemoryUserRepository};
    use crate::notifications::create_event_bus;

    struct TestApp {
        router: Router,
        users: Arc<InMemoryUserRepository>,
    }

    fn test_app() -> TestApp {
        let users: Arc<InMemoryUserRepository> = Arc::new(InMemoryUserRepository::new());
        let tickets = Arc::new(InMemoryTicketRepository::new());
        let bus = create_event_bus();
        let jwt_config = JwtConfig::default();

        let user_service = Arc::new(UserService::new(
            users.clone(),
            jwt_config.clone(),
            bus.clone(),
        ));
        let ticket_service = Arc::new(TicketService::new(tickets, users.clone(), bus));

        let handle = PrometheusBuilder::new().build_recorder().handle();
        let router = create_api_router(
            user_service,
            ticket_service,
            users.clone(),
            jwt_config,
            handle,
        );
        TestApp { router, users }
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn signup(app: &TestApp, email: &str) -> String {
        let response = app
            .router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/user/signup",
                serde_json::json!({"email": email, "password": "password1"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        json["data"]["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn signup_then_duplicate_conflicts() {
        let app = test_app();
        signup(&app, "dup@helpdesk.io").await;

        let response = app
            .router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/user/signup",
                serde_json::json!({"email": "dup@helpdesk.io", "password": "password2"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn tickets_require_authentication() {
        let app = test_app();
        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/tickets")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_and_fetch_ticket() {
        let app = test_app();
        let token = signup(&app, "reporter@helpdesk.io").await;

        let mut request = json_request(
            "POST",
            "/api/tickets",
            serde_json::json!({"title": "Printer jam", "description": "Office printer jammed"}),
        );
        request.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {}", token).parse().unwrap(),
        );
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        let ticket_id = created["data"]["id"].as_str().unwrap().to_string();
        assert_eq!(created["data"]["status"], "TODO");

        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/tickets/{}", ticket_id))
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let detail = body_json(response).await;
        assert_eq!(detail["data"]["title"], "Printer jam");
        assert!(detail["data"]["assignee"].is_null());
    }

    #[tokio::test]
    async fn unknown_ticket_is_404() {
        let app = test_app();
        let token = signup(&app, "reporter@helpdesk.io").await;

        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/tickets/no-such-id")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn user_listing_is_admin_gated() {
        let app = test_app();
        let token = signup(&app, "plain@helpdesk.io").await;

        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/user/users")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        // Promote to admin and log in again for a token carrying the new role
        app.users
            .update_user(
                "plain@helpdesk.io",
                UpdateUserDto {
                    role: Some(UserRole::Admin),
                    skills: vec![],
                },
            )
            .await
            .unwrap();
        let response = app
            .router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/user/login",
                serde_json::json!({"email": "plain@helpdesk.io", "password": "password1"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let admin_token = body_json(response).await["data"]["token"]
            .as_str()
            .unwrap()
            .to_string();

        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/user/users")
                    .header(header::AUTHORIZATION, format!("Bearer {}", admin_token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let listing = body_json(response).await;
        assert_eq!(listing["data"].as_array().unwrap().len(), 1);
        // Credential hash never leaves the service
        assert!(listing["data"][0].get("password_hash").is_none());
    }

    #[tokio::test]
    async fn single_user_lookup_via_query() {
        let app = test_app();
        let token = signup(&app, "lookup@helpdesk.io").await;

        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/user/users?email=lookup@helpdesk.io")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["email"], "lookup@helpdesk.io");
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = test_app();
        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
