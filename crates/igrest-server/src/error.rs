//! API error type and its HTTP rendering.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use igrest_core::{ClientError, ConfigError, media_code::CodeError};
use igrest_session::RegistryError;
use serde_json::json;

/// Error returned by route handlers.
///
/// Rendered as `{"detail": "..."}` with a status derived from the cause.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Code(#[from] CodeError),
    #[error("Login rejected: check username and password")]
    LoginRejected,
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Registry(RegistryError::SessionNotFound)
            | Self::LoginRejected
            | Self::Client(ClientError::LoginRequired) => StatusCode::UNAUTHORIZED,
            Self::Registry(RegistryError::InvalidHandle) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Registry(RegistryError::Config(_)) | Self::Config(_) | Self::Code(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Client(ClientError::ChallengeRequired(_)) => StatusCode::FORBIDDEN,
            Self::Client(ClientError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Client(ClientError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            Self::Client(
                ClientError::Transport(_) | ClientError::Upstream { .. } | ClientError::Decode(_),
            ) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, "Request failed: {self}");
        } else {
            tracing::debug!(%status, "Request rejected: {self}");
        }

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
