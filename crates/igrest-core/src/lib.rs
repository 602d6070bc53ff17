//! Core abstractions for the igrest automation client façade.
//!
//! This crate provides the fundamental building blocks:
//! - `AutomationClient` / `ClientFactory` - the seam to the external automation client
//! - `ClientConfig` - baseline proxy, locale, timezone and timeout settings
//! - Session identifier normalization
//! - Media shortcode and story URL conversion
//! - `MockClient` - in-process client for tests (feature: mock)

pub mod config;
pub mod insights;
pub mod media_code;
#[cfg(feature = "mock")]
pub mod mock;
pub mod session_id;
pub mod traits;

pub use config::{ClientConfig, ClientOverrides, DEFAULT_REQUEST_TIMEOUT};
pub use insights::InsightsFeedQuery;
pub use session_id::normalize_session_id;
pub use traits::{AutomationClient, ClientError, ClientFactory, ConfigError, Credentials};

/// Crate version, reported by the server's `/version` route.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
