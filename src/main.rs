//! Helpdesk ticket-intake service entry point
//!
//! Reads configuration from TOML file (~/.config/helpdesk/config.toml),
//! runs migrations, starts the workflow dispatcher and serves the REST API.

use std::sync::Arc;

use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use helpdesk::application::{
    AssignmentWorkflow, SignupWorkflow, TicketService, UserService, WorkflowDispatcher,
};
use helpdesk::domain::{TicketRepositoryInterface, UserRepositoryInterface};
use helpdesk::infrastructure::classifier::{Classifier, HttpClassifier};
use helpdesk::infrastructure::crypto::jwt::JwtConfig;
use helpdesk::infrastructure::database::migrator::Migrator;
use helpdesk::infrastructure::database::repositories::{TicketRepository, UserRepository};
use helpdesk::infrastructure::email::{Mailer, SmtpMailer};
use helpdesk::shared::{listen_for_shutdown_signals, ShutdownSignal};
use helpdesk::{
    create_api_router, create_event_bus, default_config_path, init_database, AppConfig,
    DatabaseConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = std::env::var("HELPDESK_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());
    let app_cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.logging.level)),
                )
                .init();
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config: {}. Using defaults.", e);
            AppConfig::default()
        }
    };

    info!("Starting helpdesk ticket-intake service...");

    // ── Prometheus metrics recorder (must be installed before any metrics calls) ──
    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    info!("Prometheus metrics recorder installed");

    // ── Sub-configs ────────────────────────────────────────────
    let db_config = DatabaseConfig {
        url: app_cfg.database.connection_url(),
    };
    info!("Database: {}", db_config.url);

    let jwt_config = JwtConfig {
        secret: app_cfg.security.jwt_secret.clone(),
        expiration_hours: app_cfg.security.jwt_expiration_hours,
        issuer: "helpdesk-service".to_string(),
    };
    info!(
        "JWT configured with {}h token expiration",
        jwt_config.expiration_hours
    );

    // ── Database ───────────────────────────────────────────────
    let db = match init_database(&db_config).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    info!("Running database migrations...");
    if let Err(e) = Migrator::up(&db, None).await {
        error!("Failed to run migrations: {}", e);
        return Err(e.into());
    }
    info!("Migrations completed");

    // ── Repositories ───────────────────────────────────────────
    let user_repo: Arc<dyn UserRepositoryInterface> = Arc::new(UserRepository::new(db.clone()));
    let ticket_repo: Arc<dyn TicketRepositoryInterface> =
        Arc::new(TicketRepository::new(db.clone()));

    // Create default admin user if the store is empty
    create_default_admin(user_repo.as_ref(), &app_cfg).await;

    // ── Event bus ──────────────────────────────────────────────
    let event_bus = create_event_bus();
    info!("Event bus initialized");

    // ── Services ───────────────────────────────────────────────
    let user_service = Arc::new(UserService::new(
        user_repo.clone(),
        jwt_config.clone(),
        event_bus.clone(),
    ));
    let ticket_service = Arc::new(TicketService::new(
        ticket_repo.clone(),
        user_repo.clone(),
        event_bus.clone(),
    ));

    // ── Outbound providers ─────────────────────────────────────
    let classifier: Arc<dyn Classifier> = Arc::new(HttpClassifier::new(
        app_cfg.classifier.url.clone(),
        app_cfg.classifier.api_key.clone(),
    ));
    let mailer: Arc<dyn Mailer> = match SmtpMailer::new(&app_cfg.smtp) {
        Ok(mailer) => Arc::new(mailer),
        Err(e) => {
            error!("Failed to configure SMTP mailer: {}", e);
            return Err(e.into());
        }
    };

    // ── Workflows ──────────────────────────────────────────────
    let assignment = Arc::new(AssignmentWorkflow::new(
        ticket_repo,
        user_repo.clone(),
        classifier,
        mailer.clone(),
        event_bus.clone(),
    ));
    let signup = Arc::new(SignupWorkflow::new(user_repo.clone(), mailer));

    // Initialize shutdown signal and start listening for SIGTERM/SIGINT
    let shutdown = ShutdownSignal::new();
    tokio::spawn(listen_for_shutdown_signals(shutdown.clone()));

    let dispatcher = WorkflowDispatcher::new(assignment, signup);
    dispatcher.start(&event_bus, shutdown.clone());

    // ── REST API server ────────────────────────────────────────
    let api_router = create_api_router(
        user_service,
        ticket_service,
        user_repo,
        jwt_config,
        prometheus_handle,
    );

    let api_addr = app_cfg.server.address();
    let listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("REST API server listening on http://{}", api_addr);
    info!("Swagger UI available at http://{}/docs/", api_addr);

    let api_shutdown = shutdown.clone();
    axum::serve(listener, api_router)
        .with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("REST API server received shutdown signal");
        })
        .await?;

    // Perform final cleanup
    info!("Performing final cleanup...");

    if let Err(e) = db.close().await {
        warn!("Error closing database connection: {}", e);
    } else {
        info!("Database connection closed");
    }

    info!("Helpdesk service shutdown complete");
    Ok(())
}

/// Create default admin user if no users exist
async fn create_default_admin(repo: &dyn UserRepositoryInterface, app_cfg: &AppConfig) {
    use helpdesk::domain::{CreateUserDto, UserRole};
    use helpdesk::infrastructure::crypto::password::hash_password;

    let users_count = repo.count_users().await.unwrap_or(0);
    if users_count > 0 {
        return;
    }

    info!("Creating default admin user...");

    let password_hash = match hash_password(&app_cfg.admin.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!("Failed to hash admin password: {}", e);
            return;
        }
    };

    match repo
        .create_user(CreateUserDto {
            email: app_cfg.admin.email.clone(),
            password_hash,
            role: Some(UserRole::Admin),
            skills: Vec::new(),
        })
        .await
    {
        Ok(admin) => {
            info!("Default admin created: {}", admin.email);
            warn!("Please change the admin password immediately!");
        }
        Err(e) => {
            error!("Failed to create admin user: {}", e);
        }
    }
}
