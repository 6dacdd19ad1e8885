use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bookshelf_events::{AuditClient, HttpAuditClient, LogAuditClient};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookshelf_api::background::session_cleanup;
use bookshelf_api::config::ServerConfig;
use bookshelf_api::router::build_app_router;
use bookshelf_api::state::{AppState, Repositories};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bookshelf_api=debug,bookshelf_events=info,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env().expect("Invalid configuration");
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = bookshelf_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    bookshelf_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    bookshelf_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Audit sink ---
    let audit: Arc<dyn AuditClient> = match &config.audit.url {
        Some(url) => {
            let client =
                HttpAuditClient::new(url.clone(), Duration::from_secs(config.audit.timeout_secs))
                    .expect("Failed to build audit HTTP client");
            tracing::info!(url = %client.url(), "Audit records sent over HTTP");
            Arc::new(client)
        }
        None => {
            tracing::info!("AUDIT_URL not set, audit records go to the log only");
            Arc::new(LogAuditClient)
        }
    };

    // --- App state ---
    let repos = Repositories::postgres(&pool);
    let sessions = Arc::clone(&repos.sessions);
    let state = AppState::new(config.clone(), repos, audit, Some(pool));

    // --- Background jobs ---
    let jobs_cancel = CancellationToken::new();
    let cleanup_handle = (config.session_cleanup_interval_secs > 0).then(|| {
        tokio::spawn(session_cleanup::run(
            sessions,
            Duration::from_secs(config.session_cleanup_interval_secs),
            jobs_cancel.clone(),
        ))
    });
    if cleanup_handle.is_none() {
        tracing::info!("Session cleanup disabled");
    }

    // --- Router ---
    let app = build_app_router(state);

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

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    jobs_cancel.cancel();
    if let Some(handle) = cleanup_handle {
        let grace = Duration::from_secs(config.shutdown_timeout_secs);
        if tokio::time::timeout(grace, handle).await.is_err() {
            tracing::warn!("Session cleanup did not stop within the shutdown timeout");
        }
    }

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
