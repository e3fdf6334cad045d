//! Integration test utilities for the SMS gateway
//!
//! This crate provides helpers for running end-to-end tests against
//! the MT endpoint and the observer WebSocket.

pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
