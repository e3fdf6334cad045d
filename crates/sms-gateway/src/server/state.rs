//! Gateway state
//!
//! Application state for the gateway server.

use std::sync::Arc;

use sms_common::AppConfig;

use crate::hub::HubHandle;
use crate::relay::Relay;

/// Gateway application state
///
/// Holds all shared dependencies for the gateway server.
#[derive(Clone)]
pub struct GatewayState {
    /// Handle to the running hub
    hub: HubHandle,
    /// MT/MO/DLR relay, also installed as the hub's inbound handler
    relay: Relay,
    /// Application configuration
    config: Arc<AppConfig>,
}

impl GatewayState {
    /// Create a new gateway state
    pub fn new(hub: HubHandle, relay: Relay, config: AppConfig) -> Self {
        Self {
            hub,
            relay,
            config: Arc::new(config),
        }
    }

    /// Get the hub handle
    pub fn hub(&self) -> &HubHandle {
        &self.hub
    }

    /// Get the relay
    pub fn relay(&self) -> &Relay {
        &self.relay
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("hub", &self.hub)
            .field("config", &"AppConfig")
            .finish()
    }
}
