//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! Useful for development and debugging. The workspace's main `yaqeen-run` binary serves the same
//! router.

use api_rest::{core_config_from_env, router, AppState, DEFAULT_REST_ADDR};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yaqeen_core::Services;

/// Main entry point for the Yaqeen REST API server
///
/// # Environment Variables
/// - `YAQEEN_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `YAQEEN_DATA_FILE`: JSON snapshot file; records are kept in memory only when unset
/// - `YAQEEN_TOKEN_TTL_SECS`: Session lifetime in seconds (default: 86400)
/// - `YAQEEN_PASSWORD_ITERATIONS`: PBKDF2 iterations for new password hashes (default: 600000)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is invalid or the snapshot cannot be loaded,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("yaqeen_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("YAQEEN_REST_ADDR").unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    tracing::info!("-- Starting Yaqeen REST API on {}", addr);

    let cfg = core_config_from_env()?;
    let services = Services::open(cfg)?;
    let app = router(AppState::new(services));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
