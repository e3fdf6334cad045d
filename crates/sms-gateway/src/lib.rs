//! # sms-gateway
//!
//! Premium-SMS gateway mock: MT submission over HTTP, observer fan-out over
//! WebSocket, synthetic delivery receipts and MO forwarding.

pub mod connection;
pub mod delivery;
pub mod hub;
pub mod relay;
pub mod server;

pub use server::{create_app, create_gateway_state, run, run_server, GatewayState};
