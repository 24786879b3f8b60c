//! Service error types and their wire mapping.
//!
//! One internal enum covers the serving path; on the wire every error is
//! a `{kind, message}` JSON body with a mapped HTTP status. Denial and
//! internal errors stay opaque on the wire so policy details and panic
//! payloads never leak to callers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::config::ConfigError;

/// Machine-readable error kinds carried on the wire.
pub mod kinds {
    pub const UNAUTHENTICATED: &str = "unauthenticated";
    pub const INVALID_ARGUMENT: &str = "invalid_argument";
    pub const CONFIG: &str = "config";
    pub const TRANSPORT: &str = "transport";
    pub const UNAVAILABLE: &str = "unavailable";
    pub const INTERNAL: &str = "internal";
}

/// Error body returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireError {
    /// One of the [`kinds`] constants.
    pub kind: String,
    /// Human-readable detail; deliberately generic for denial and
    /// internal errors.
    pub message: String,
}

/// Service-level errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GateError {
    /// Caller identity missing, unknown, or not permitted for the method.
    #[error("unauthenticated request")]
    Unauthenticated,

    /// Malformed request input.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Malformed ACL document or invalid configuration. Startup-fatal,
    /// never produced while serving.
    #[error("configuration error: {0}")]
    Config(String),

    /// Listener bind failure, or a broken stream send.
    #[error("transport error: {0}")]
    Transport(String),

    /// Shutdown in progress.
    #[error("shutdown in progress")]
    ShuttingDown,

    /// Recovered panic or other internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GateError {
    /// Wire kind for this error.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated => kinds::UNAUTHENTICATED,
            Self::InvalidArgument(_) => kinds::INVALID_ARGUMENT,
            Self::Config(_) => kinds::CONFIG,
            Self::Transport(_) => kinds::TRANSPORT,
            Self::ShuttingDown => kinds::UNAVAILABLE,
            Self::Internal(_) => kinds::INTERNAL,
        }
    }

    /// HTTP status this error maps to.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
            Self::Config(_) | Self::Transport(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message placed on the wire.
    ///
    /// Denials carry no reason (the concrete cause is debug-logged where
    /// it happens) and internal errors carry no payload.
    fn wire_message(&self) -> String {
        match self {
            Self::Unauthenticated => "unauthenticated".to_string(),
            Self::Internal(_) => "internal error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<ConfigError> for GateError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = WireError {
            kind: self.kind().to_string(),
            message: self.wire_message(),
        };
        (status, Json(body)).into_response()
    }
}
