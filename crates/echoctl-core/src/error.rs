// ── Core error types ──
//
// User-facing errors from echoctl-core. The `From<echoctl_api::Error>`
// impl folds transport-layer detail into domain-level variants so the
// CLI only has to map a small, stable set.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    #[error("Session rejected: {message}")]
    AuthenticationFailed { message: String },

    #[error("Cannot reach {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Device not found: {name}")]
    DeviceNotFound { name: String },

    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    #[error("Unexpected response: {message}")]
    UnexpectedResponse { message: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("API error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::DeviceNotFound { .. } | Self::NotFound { .. })
    }
}

impl From<echoctl_api::Error> for CoreError {
    fn from(err: echoctl_api::Error) -> Self {
        use echoctl_api::Error as ApiError;

        match err {
            ApiError::MissingCsrf => Self::AuthenticationFailed {
                message: err.to_string(),
            },
            ApiError::Status {
                status: status @ (401 | 403),
                body,
            } => Self::AuthenticationFailed {
                message: format!("HTTP {status}: {body}"),
            },
            ApiError::Status { status, body } => Self::Api {
                message: format!("HTTP {status}: {body}"),
                status: Some(status),
            },
            ApiError::Transport(e) => Self::ConnectionFailed {
                url: e.url().map(ToString::to_string).unwrap_or_default(),
                reason: e.to_string(),
            },
            ApiError::Deserialization { message, .. } => Self::UnexpectedResponse { message },
            ApiError::Validation { field, reason } => Self::ValidationFailed {
                message: format!("{field}: {reason}"),
            },
            ApiError::NotFound { what } => Self::NotFound {
                entity_type: "resource".into(),
                identifier: what,
            },
            ApiError::InvalidHeader { .. } | ApiError::InvalidUrl(_) | ApiError::Tls(_) => {
                Self::Config {
                    message: err.to_string(),
                }
            }
        }
    }
}
