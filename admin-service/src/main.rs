use admin_service::{
    build_router,
    config::AdminConfig,
    services::{
        AdminStore, AuditService, CallerVerifier, HttpIdentityDirectory, MongoDb,
        ProvisioningService,
    },
    utils::OsCrypto,
    AppState,
};
use service_core::observability::logging::init_tracing;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), service_core::error::AppError> {
    // Load configuration - fail fast if invalid
    let config = AdminConfig::from_env()?;

    init_tracing(&config.service_name, &config.log_level);

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting super-admin provisioning service"
    );

    tracing::info!("Initializing database connections");
    let db = MongoDb::connect(&config.mongodb.uri, &config.mongodb.database).await?;
    db.initialize_indexes().await?;
    tracing::info!("Database initialized successfully");

    let verifier = CallerVerifier::from_pem_file(&config.security.jwt_public_key_path)?;
    tracing::info!("Caller verifier initialized");

    let directory = Arc::new(HttpIdentityDirectory::new(&config.identity));
    let store: Arc<dyn AdminStore> = Arc::new(db.clone());
    let audit = AuditService::new(store.clone());
    let provisioning = Arc::new(ProvisioningService::new(
        directory,
        store,
        audit,
        Arc::new(OsCrypto),
        config.security.provisioning_secret.clone(),
        config.security.min_password_length,
    ));
    tracing::info!("Provisioning service initialized");

    let state = AppState {
        config: config.clone(),
        db,
        verifier,
        provisioning,
    };

    let app = build_router(state).await?;

    let addr = format!("{}:{}", config.common.host, config.common.port);
    tracing::info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr.as_str()).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
