//! HTTP surface for igrest.
//!
//! Exposes login, logout, media and user operations over form-encoded POSTs.
//! Every authenticated route names its client by the `sessionid` returned
//! from `/auth/login`; the client itself lives in a
//! [`SessionRegistry`](igrest_session::SessionRegistry).

pub mod config;
pub mod error;
pub mod forms;
pub mod logging;
pub mod router;
pub mod routes;
pub mod state;

pub use config::{LoadError, ServerConfig};
pub use error::ApiError;
pub use logging::{LogConfig, LogFormat};
pub use router::create_router;
pub use state::AppState;
