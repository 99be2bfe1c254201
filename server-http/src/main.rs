use lingua::CleanupScheduler;
use server_http::{AppState, build_router};
use shared::config::Config;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Lingua HTTP Server...");

    // Load environment variables from .env file (if exists)
    match dotenvy::dotenv() {
        Ok(_) => info!("Loaded environment variables from .env file"),
        Err(_) => info!("No .env file found, using system environment variables"),
    }

    let config = Config::from_env();

    if let Err(e) = run(config).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> shared::Result<()> {
    let state = AppState::from_config(&config)?;

    // Daily purge of expired translations
    let shutdown = CancellationToken::new();
    let cleanup = CleanupScheduler::new(state.admin.clone(), config.cleanup_interval)
        .spawn(shutdown.clone());

    let router = build_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| shared::Error::Internal(format!("Failed to bind {}: {}", address, e)))?;

    info!("HTTP Server listening on http://{}", address);
    info!("Try: curl http://{}/health", address);

    // Graceful shutdown handler
    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| shared::Error::Internal(format!("Server failed: {}", e)));

    shutdown.cancel();
    if let Err(e) = cleanup.await {
        error!("Cleanup task ended abnormally: {}", e);
    }

    info!("Server shutdown complete");
    served
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }

    info!("Shutting down gracefully...");
}
