//! Gateway server setup
//!
//! Routes, state construction and the serve loop with graceful shutdown.

mod handlers;
mod middleware;
mod state;

pub use handlers::{health_check, observer_socket, submit_mt, HealthResponse, MT_BODY_LIMIT};
pub use middleware::{apply_middleware, REQUEST_ID_HEADER};
pub use state::GatewayState;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use sms_common::{AppConfig, AppError};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::delivery::HttpCourier;
use crate::hub::HubHandle;
use crate::relay::Relay;

/// Create the gateway router
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/mt", post(submit_mt).layer(DefaultBodyLimit::max(MT_BODY_LIMIT)))
        .route("/ws", get(observer_socket))
        .route("/health", get(health_check))
}

/// Build the complete application
///
/// Unmatched paths fall back to the operator console's static files.
pub fn create_app(state: GatewayState) -> Router {
    let console = ServeDir::new(&state.config().server.static_dir);
    apply_middleware(create_router())
        .fallback_service(console)
        .with_state(state)
}

/// Start the hub and wire the relay into it
///
/// Must be called from within a Tokio runtime.
pub async fn create_gateway_state(config: AppConfig) -> Result<GatewayState, AppError> {
    let hub = HubHandle::spawn(&config.hub);

    let courier = HttpCourier::new(config.relay.http_timeout()).map_err(AppError::internal)?;
    let relay = Relay::new(hub.clone(), Arc::new(courier), config.relay.clone());
    hub.on_message(Arc::new(relay.clone()));

    tracing::info!(
        queue_capacity = config.hub.queue_capacity,
        profile = ?config.relay.validation_profile,
        "Hub started, relay installed"
    );

    Ok(GatewayState::new(hub, relay, config))
}

/// Bind the configured address
pub async fn bind(config: &AppConfig) -> Result<TcpListener, AppError> {
    let addr = config.server.address();
    TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::bind(addr, e))
}

/// Run the gateway server on an already bound listener
///
/// On Ctrl-C or SIGTERM the hub is shut down first, closing every observer,
/// then in-flight HTTP requests are drained.
pub async fn run_server(listener: TcpListener, state: GatewayState) -> Result<(), AppError> {
    let addr = listener.local_addr().map_err(AppError::Server)?;
    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("Observers connect to ws://{}/ws", addr);

    let hub = state.hub().clone();
    let app = create_app(state);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal(hub))
        .await
        .map_err(AppError::Server)?;

    tracing::info!("Gateway stopped");
    Ok(())
}

/// Run the complete gateway server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let listener = bind(&config).await?;

    // Create gateway state
    let state = create_gateway_state(config).await?;

    // Run server
    run_server(listener, state).await
}

async fn shutdown_signal(hub: HubHandle) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, closing observers");
    if let Err(e) = hub.shutdown().await {
        tracing::warn!(error = %e, "Hub already stopped");
    }
}
