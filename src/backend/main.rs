/**
 * Codecollab Server Entry Point
 *
 * Loads configuration, initializes tracing, builds the application and serves
 * it until Ctrl-C.
 */

#[cfg(feature = "ssr")]
use codecollab::backend::server::{build_state, create_app, ServerConfig};

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    let config = ServerConfig::load()?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!("[Server] Starting codecollab server");
    if config.uses_dev_secret() {
        tracing::warn!("[Server] JWT_SECRET not set, using the development secret");
    }

    let bind_addr = config.bind_addr.clone();
    let state = build_state(config).await;
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("[Server] Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("[Server] Shut down");
    Ok(())
}

#[cfg(feature = "ssr")]
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("[Server] Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("[Server] Shutdown signal received");
}

#[cfg(not(feature = "ssr"))]
fn main() {
    eprintln!("Server requires the 'ssr' feature to be enabled.");
    eprintln!("Run with: cargo run --bin codecollab-server --features ssr");
    std::process::exit(1);
}
