//! Automation client backed by an HTTP automation gateway.
//!
//! Provides:
//! - `GatewayClient` - `AutomationClient` that forwards every call to the gateway
//! - `GatewayFactory` - builds configured, unauthenticated gateway clients
//! - Gateway request/response types

pub mod client;
pub mod factory;
pub mod protocol;

pub use client::GatewayClient;
pub use factory::GatewayFactory;
