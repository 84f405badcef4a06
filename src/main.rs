use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{core_config_from_env, router, AppState, DEFAULT_REST_ADDR};
use yaqeen_core::Services;

/// Main entry point for the Yaqeen application
///
/// Loads `.env`, resolves the configuration, opens the record store and serves the REST API
/// until interrupted. The snapshot is written after every change, so stopping the process loses
/// nothing but the open sessions.
///
/// # Environment Variables
/// - `YAQEEN_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `YAQEEN_DATA_FILE`: JSON snapshot file; records are kept in memory only when unset
/// - `YAQEEN_TOKEN_TTL_SECS`: Session lifetime in seconds (default: 86400)
/// - `YAQEEN_PASSWORD_ITERATIONS`: PBKDF2 iterations for new password hashes (default: 600000)
///
/// # Returns
/// * `Ok(())` - If the server starts and shuts down cleanly
/// * `Err(anyhow::Error)` - If startup or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("yaqeen_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("yaqeen_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("YAQEEN_REST_ADDR").unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    let cfg = core_config_from_env()?;
    match cfg.data_file() {
        Some(path) => tracing::info!("++ Persisting records to {}", path.display()),
        None => tracing::warn!("YAQEEN_DATA_FILE not set; records are kept in memory only"),
    }
    let services = Services::open(cfg)?;

    tracing::info!("++ Starting Yaqeen REST on {}", rest_addr);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, router(AppState::new(services)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("-- Yaqeen stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
