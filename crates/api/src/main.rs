use std::future::IntoFuture;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use content_engine_api::automation::AutomationClient;
use content_engine_api::blob::LocalBlobStore;
use content_engine_api::config::ServerConfig;
use content_engine_api::router::build_app_router;
use content_engine_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "content_engine_api=debug,content_engine_db=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(env_filter);
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        environment = config.environment.as_str(),
        automation_configured = config.automation.webhook_base_url.is_some(),
        callback_secret_set = config.automation.callback_secret.is_some(),
        "Loaded server configuration"
    );
    if config.automation.callback_secret.is_none() && !config.environment.is_development() {
        tracing::warn!("N8N_CALLBACK_SECRET is not set; automation callbacks will be rejected");
    }

    // --- Project store ---
    let pool = content_engine_db::create_pool(&config.database_url)
        .await
        .expect("Failed to open project store");
    tracing::info!("Project store pool created");

    content_engine_db::health_check(&pool)
        .await
        .expect("Project store health check failed");

    content_engine_db::run_migrations(&pool)
        .await
        .expect("Failed to migrate project store");
    tracing::info!("Project store migrated");

    // --- Blob storage ---
    let blobs = LocalBlobStore::new(&config.blob);
    tokio::fs::create_dir_all(blobs.root())
        .await
        .expect("Failed to create blob storage directory");
    tracing::info!(root = %blobs.root().display(), "Blob storage ready");

    // --- App state ---
    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        automation: AutomationClient::new(&config.automation),
        blobs: Arc::new(blobs),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let ip: IpAddr = config.host.parse().expect("HOST must be an IP address");
    let addr = SocketAddr::new(ip, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!(%addr, "Listening");

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .into_future();
    let drain = Duration::from_secs(config.shutdown_timeout_secs);
    tokio::select! {
        result = server => result.expect("Server error"),
        () = drain_deadline(drain) => {
            tracing::warn!(timeout_secs = config.shutdown_timeout_secs, "Shutdown drain timed out, dropping open connections");
        }
    }

    pool.close().await;
    tracing::info!("Project store closed, bye");
}

/// Resolves on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Cannot listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => tracing::info!(signal = "SIGINT", "Shutting down"),
        () = terminate => tracing::info!(signal = "SIGTERM", "Shutting down"),
    }
}

/// Resolves `timeout` after a shutdown signal, bounding the connection drain.
async fn drain_deadline(timeout: Duration) {
    shutdown_signal().await;
    tokio::time::sleep(timeout).await;
}
