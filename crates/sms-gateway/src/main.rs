//! SMS Gateway mock entry point
//!
//! Run with:
//! ```bash
//! cargo run -p sms-gateway
//! ```
//!
//! Configuration is loaded from environment variables (and `.env`).

use sms_common::{try_init_tracing, AppConfig, AppError, Environment, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Tracing follows APP_ENV; the full config is loaded after it is up
    let _ = dotenvy::dotenv();
    let env = std::env::var("APP_ENV")
        .ok()
        .and_then(|v| v.parse::<Environment>().ok())
        .unwrap_or_default();
    if let Err(e) = try_init_tracing(&TracingConfig::for_environment(env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run().await {
        error!(error = %e, code = e.error_code(), "Gateway failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    info!("Starting SMS Gateway...");

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;

    info!(
        name = %config.app.name,
        env = ?config.app.env,
        address = %config.server.address(),
        "Configuration loaded"
    );

    sms_gateway::run(config).await
}
