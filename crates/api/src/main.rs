use std::net::SocketAddr;
use std::sync::Arc;

use cursus_api::completion::{CompletionClient, ResourceExtractor};
use cursus_api::config::{ServerConfig, StoreBackend};
use cursus_api::inflight::InFlightSet;
use cursus_api::router::build_app_router;
use cursus_api::state::AppState;
use cursus_api::storage::LocalFileStorage;
use cursus_db::repositories::SessionRepo;
use cursus_db::store::{DocumentStore, MemoryDocumentStore, PgDocumentStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cursus_api=debug,cursus_db=info,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Document store ---
    let store: Arc<dyn DocumentStore> = match &config.store {
        StoreBackend::Postgres { database_url } => {
            let pool = cursus_db::create_pool(database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            cursus_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            tracing::info!("Database health check passed");

            cursus_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            Arc::new(PgDocumentStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on restart");
            Arc::new(MemoryDocumentStore::new())
        }
    };

    // --- File storage ---
    tokio::fs::create_dir_all(&config.storage_root)
        .await
        .expect("Failed to create storage root");
    let files = Arc::new(LocalFileStorage::new(
        config.storage_root.clone(),
        config.public_base_url.clone(),
    ));
    tracing::info!(root = %config.storage_root.display(), "File storage ready");

    // --- Bulk import ---
    let extractor = config.completion.clone().map(|completion| {
        tracing::info!(model = %completion.model, "Bulk import enabled");
        Arc::new(CompletionClient::new(completion)) as Arc<dyn ResourceExtractor>
    });
    if extractor.is_none() {
        tracing::info!("COMPLETION_API_KEY not set; bulk import disabled");
    }

    // --- Expired sessions ---
    match SessionRepo::delete_expired(store.as_ref(), None, chrono::Utc::now()).await {
        Ok(swept) => tracing::info!(swept, "Expired sessions removed"),
        Err(e) => tracing::warn!(error = %e, "Failed to sweep expired sessions"),
    }

    // --- Bootstrap admin ---
    if let Some(admin) = &config.bootstrap_admin {
        cursus_api::bootstrap::ensure_admin(store.as_ref(), admin)
            .await
            .expect("Failed to provision bootstrap admin");
    }

    // --- App state ---
    let state = AppState {
        store,
        files,
        config: Arc::new(config.clone()),
        extractor,
        admin_toggles: InFlightSet::new(),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
