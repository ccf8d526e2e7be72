// ── Runtime connection configuration ──
//
// These types describe *how* to talk to the web console API. They carry
// the session cookie and transport tuning, but never touch disk: the CLI
// resolves a `ClientConfig` from profiles and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;

use echoctl_api::transport::{TlsMode, TransportConfig};
use echoctl_api::{
    Account, DEFAULT_ACCEPT_LANGUAGE, DEFAULT_API_URL, DEFAULT_CONSOLE_URL, Session,
    SessionClient,
};

use crate::error::CoreError;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Additionally trust a custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification.
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => Self::System,
            TlsVerification::CustomCa(path) => Self::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => Self::DangerAcceptInvalid,
        }
    }
}

/// Everything needed to open a session against the web console API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API host (e.g. `https://layla.amazon.de`).
    pub api_url: Url,
    /// Web console the cookie belongs to (e.g. `https://alexa.amazon.de`).
    pub console_url: Url,
    pub accept_language: String,
    /// Raw `Cookie` header string of a logged-in console session.
    pub cookie: SecretString,
    pub tls: TlsVerification,
    /// `None` keeps the transport default.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Config for the default console with the given session cookie.
    pub fn new(cookie: SecretString) -> Result<Self, CoreError> {
        Ok(Self {
            api_url: parse_url("api_url", DEFAULT_API_URL)?,
            console_url: parse_url("console_url", DEFAULT_CONSOLE_URL)?,
            accept_language: DEFAULT_ACCEPT_LANGUAGE.into(),
            cookie,
            tls: TlsVerification::default(),
            timeout: None,
        })
    }

    /// Parse the cookie, build the HTTP client, and return the account handle.
    pub fn connect(&self) -> Result<Account, CoreError> {
        let session = Session::parse(self.cookie.expose_secret())?;
        if session.csrf().is_none() {
            debug!("session cookie has no numeric csrf value; commands will be rejected");
        }

        let transport = TransportConfig {
            tls: TlsMode::from(&self.tls),
            timeout: self.timeout,
        };
        let client = SessionClient::new(
            self.api_url.clone(),
            &self.console_url,
            session,
            &transport,
        )?
        .with_accept_language(&self.accept_language)?;

        debug!(api = %self.api_url, console = %self.console_url, "session client ready");
        Ok(Account::new(client))
    }
}

/// Parse a URL, reporting the field name on failure.
pub fn parse_url(field: &str, raw: &str) -> Result<Url, CoreError> {
    Url::parse(raw).map_err(|e| CoreError::Config {
        message: format!("invalid {field} '{raw}': {e}"),
    })
}
