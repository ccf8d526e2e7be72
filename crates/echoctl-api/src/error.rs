use thiserror::Error;

/// Top-level error type for the `echoctl-api` crate.
///
/// Every operation of the session client, the account directory and the
/// per-device endpoints fails with one of these. `echoctl-core` maps them
/// into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Session ─────────────────────────────────────────────────────
    /// The session cookie has no usable `csrf` value, so a state-mutating
    /// request cannot be authenticated.
    #[error("Session cookie has no numeric 'csrf' value -- POST requests cannot be authenticated")]
    MissingCsrf,

    /// A header name or value could not be encoded.
    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote API answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Domain ──────────────────────────────────────────────────────
    /// Caller input rejected before any request was issued.
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// A looked-up entity (linked service account, search result) does not exist.
    #[error("Not found: {what}")]
    NotFound { what: String },
}

impl Error {
    /// Returns `true` for network failures and non-2xx responses.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. })
    }

    /// Returns `true` if the response body could not be parsed.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Deserialization { .. })
    }

    /// Returns `true` if caller input was rejected locally.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Returns `true` if this is a "not found" error, either local or HTTP 404.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } | Self::Status { status: 404, .. } => true,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }

    /// Returns `true` if the remote rejected the session (HTTP 401/403).
    pub fn is_auth_rejected(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. } | Self::MissingCsrf)
    }

    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
