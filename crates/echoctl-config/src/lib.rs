//! Shared configuration for echoctl.
//!
//! TOML profiles, session cookie resolution (env + keyring + plaintext +
//! cookie files), and translation to `echoctl_core::ClientConfig`. The CLI
//! layers its flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::{BaseDirs, ProjectDirs};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use echoctl_core::{ClientConfig, TlsVerification, parse_url};

/// Keyring service name; entries are keyed `{profile}/cookie`.
pub const KEYRING_SERVICE: &str = "echoctl";

/// Environment variable holding a raw cookie string.
pub const COOKIE_ENV: &str = "ECHOCTL_COOKIE";

/// Cookie file used when nothing else is configured.
pub const DEFAULT_COOKIE_FILE: &str = "~/.alexa-cookie";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no session cookie configured for profile '{profile}'")]
    NoCookie { profile: String },

    #[error("cannot read cookie file {}: {source}", path.display())]
    CookieFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named console profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// The named profile, or an empty one if it is not defined.
    ///
    /// An empty profile still resolves: default console URLs and the
    /// `~/.alexa-cookie` file.
    pub fn profile_or_default(&self, name: &str) -> Profile {
        self.profiles.get(name).cloned().unwrap_or_default()
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout in seconds; unset keeps the transport default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: None,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

/// A named console profile. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Profile {
    /// API host (e.g. "https://layla.amazon.de").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Web console the cookie belongs to (e.g. "https://alexa.amazon.de").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub console_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept_language: Option<String>,

    /// File holding the raw cookie string. `~` is expanded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookie_file: Option<PathBuf>,

    /// Environment variable name containing the cookie.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookie_env: Option<String>,

    /// Cookie string (plaintext, prefer keyring or a cookie file).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookie: Option<String>,

    /// Request timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Skip TLS verification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Path to custom CA certificate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "echoctl", "echoctl").map_or_else(
        || {
            let mut p = home_dir().unwrap_or_else(|| PathBuf::from("."));
            p.push(".config");
            p.push("echoctl");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// The user's home directory.
pub fn home_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}

/// Expand a leading `~` against `home`.
pub fn expand_tilde(path: &Path, home: Option<&Path>) -> PathBuf {
    match (path.strip_prefix("~"), home) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load Config from `path` (missing file is fine) + `ECHOCTL_` environment.
///
/// Nested keys use a double underscore: `ECHOCTL_DEFAULTS__OUTPUT=json`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ECHOCTL_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Cookie resolution ───────────────────────────────────────────────

/// Where a session cookie was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieSource {
    Env(String),
    Keyring,
    Plaintext,
    File(PathBuf),
}

impl std::fmt::Display for CookieSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Env(var) => write!(f, "environment variable {var}"),
            Self::Keyring => write!(f, "system keyring"),
            Self::Plaintext => write!(f, "config file (plaintext)"),
            Self::File(path) => write!(f, "cookie file {}", path.display()),
        }
    }
}

/// A cookie plus where it came from.
#[derive(Debug, Clone)]
pub struct ResolvedCookie {
    pub secret: SecretString,
    pub source: CookieSource,
}

/// Lookups the cookie chain performs against the outside world.
pub trait CookieLookup {
    fn env(&self, name: &str) -> Option<String>;
    fn keyring(&self, profile_name: &str) -> Option<String>;
    fn home_dir(&self) -> Option<PathBuf>;
}

/// Process environment, system keyring and the user's home directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLookup;

impl CookieLookup for SystemLookup {
    fn env(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn keyring(&self, profile_name: &str) -> Option<String> {
        keyring_entry(profile_name).ok()?.get_password().ok()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        home_dir()
    }
}

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/cookie"),
    )?)
}

/// Store a cookie in the system keyring for `profile_name`.
pub fn store_cookie(profile_name: &str, cookie: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(cookie.expose_secret())?;
    Ok(())
}

/// Read a cookie file, trimming surrounding whitespace.
pub fn read_cookie_file(path: &Path) -> Result<SecretString, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::CookieFile {
        path: path.to_path_buf(),
        source,
    })?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Validation {
            field: "cookie_file".into(),
            reason: format!("{} is empty", path.display()),
        });
    }
    Ok(SecretString::from(trimmed.to_owned()))
}

/// Resolve the session cookie from the system (no CLI flag step).
pub fn resolve_cookie(profile: &Profile, profile_name: &str) -> Result<ResolvedCookie, ConfigError> {
    resolve_cookie_with(profile, profile_name, &SystemLookup)
}

/// Resolve the session cookie through `lookup`.
///
/// Order: `ECHOCTL_COOKIE`, the profile's `cookie_env` variable, the
/// keyring, the plaintext `cookie`, the profile's `cookie_file`, and
/// finally `~/.alexa-cookie` if it exists. Blank values are skipped.
pub fn resolve_cookie_with(
    profile: &Profile,
    profile_name: &str,
    lookup: &impl CookieLookup,
) -> Result<ResolvedCookie, ConfigError> {
    let found = |secret: String, source: CookieSource| {
        debug!(profile = profile_name, %source, "using session cookie");
        Ok(ResolvedCookie {
            secret: SecretString::from(secret),
            source,
        })
    };

    // 1. Environment
    let env_names = std::iter::once(COOKIE_ENV).chain(profile.cookie_env.as_deref());
    for name in env_names {
        if let Some(val) = lookup.env(name).and_then(non_blank) {
            return found(val, CookieSource::Env(name.into()));
        }
    }

    // 2. System keyring
    if let Some(val) = lookup.keyring(profile_name).and_then(non_blank) {
        return found(val, CookieSource::Keyring);
    }

    // 3. Plaintext in config
    if let Some(val) = profile.cookie.clone().and_then(non_blank) {
        return found(val, CookieSource::Plaintext);
    }

    let home = lookup.home_dir();

    // 4. Configured cookie file (must exist)
    if let Some(ref configured) = profile.cookie_file {
        let path = expand_tilde(configured, home.as_deref());
        let secret = read_cookie_file(&path)?;
        debug!(profile = profile_name, path = %path.display(), "using session cookie file");
        return Ok(ResolvedCookie {
            secret,
            source: CookieSource::File(path),
        });
    }

    // 5. Default cookie file (optional)
    let path = expand_tilde(Path::new(DEFAULT_COOKIE_FILE), home.as_deref());
    if path.is_file() {
        let secret = read_cookie_file(&path)?;
        debug!(path = %path.display(), "using default session cookie file");
        return Ok(ResolvedCookie {
            secret,
            source: CookieSource::File(path),
        });
    }

    Err(ConfigError::NoCookie {
        profile: profile_name.into(),
    })
}

fn non_blank(val: String) -> Option<String> {
    let trimmed = val.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

// ── ClientConfig translation ────────────────────────────────────────

/// Build a `ClientConfig` from a profile and an already resolved cookie.
pub fn client_config(profile: &Profile, cookie: SecretString) -> Result<ClientConfig, ConfigError> {
    let mut config = ClientConfig::new(cookie).map_err(|e| ConfigError::Validation {
        field: "defaults".into(),
        reason: e.to_string(),
    })?;

    if let Some(ref raw) = profile.api_url {
        config.api_url = profile_url("api_url", raw)?;
    }
    if let Some(ref raw) = profile.console_url {
        config.console_url = profile_url("console_url", raw)?;
    }
    if let Some(ref lang) = profile.accept_language {
        config.accept_language.clone_from(lang);
    }

    config.tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    config.timeout = profile.timeout.map(Duration::from_secs);
    Ok(config)
}

fn profile_url(field: &str, raw: &str) -> Result<url::Url, ConfigError> {
    parse_url(field, raw).map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Default)]
    struct FakeLookup {
        env: HashMap<String, String>,
        keyring: Option<String>,
        home: Option<PathBuf>,
    }

    impl CookieLookup for FakeLookup {
        fn env(&self, name: &str) -> Option<String> {
            self.env.get(name).cloned()
        }

        fn keyring(&self, _profile_name: &str) -> Option<String> {
            self.keyring.clone()
        }

        fn home_dir(&self) -> Option<PathBuf> {
            self.home.clone()
        }
    }

    fn expose(cookie: &ResolvedCookie) -> &str {
        cookie.secret.expose_secret()
    }

    #[test]
    fn env_wins_over_everything() {
        let lookup = FakeLookup {
            env: HashMap::from([(COOKIE_ENV.into(), " a=1 \n".into())]),
            keyring: Some("b=2".into()),
            ..FakeLookup::default()
        };
        let profile = Profile {
            cookie: Some("c=3".into()),
            ..Profile::default()
        };

        let cookie = resolve_cookie_with(&profile, "default", &lookup).unwrap();
        assert_eq!(expose(&cookie), "a=1");
        assert_eq!(cookie.source, CookieSource::Env(COOKIE_ENV.into()));
    }

    #[test]
    fn profile_env_var_then_keyring_then_plaintext() {
        let profile = Profile {
            cookie_env: Some("WORK_COOKIE".into()),
            cookie: Some("c=3".into()),
            ..Profile::default()
        };

        let lookup = FakeLookup {
            env: HashMap::from([("WORK_COOKIE".into(), "w=1".into())]),
            keyring: Some("k=2".into()),
            ..FakeLookup::default()
        };
        let cookie = resolve_cookie_with(&profile, "work", &lookup).unwrap();
        assert_eq!(cookie.source, CookieSource::Env("WORK_COOKIE".into()));

        let lookup = FakeLookup {
            keyring: Some("k=2".into()),
            ..FakeLookup::default()
        };
        let cookie = resolve_cookie_with(&profile, "work", &lookup).unwrap();
        assert_eq!(cookie.source, CookieSource::Keyring);
        assert_eq!(expose(&cookie), "k=2");

        let cookie = resolve_cookie_with(&profile, "work", &FakeLookup::default()).unwrap();
        assert_eq!(cookie.source, CookieSource::Plaintext);
        assert_eq!(expose(&cookie), "c=3");
    }

    #[test]
    fn blank_values_are_skipped() {
        let lookup = FakeLookup {
            env: HashMap::from([(COOKIE_ENV.into(), "   ".into())]),
            keyring: Some(String::new()),
            ..FakeLookup::default()
        };
        let profile = Profile {
            cookie: Some("c=3".into()),
            ..Profile::default()
        };
        let cookie = resolve_cookie_with(&profile, "default", &lookup).unwrap();
        assert_eq!(cookie.source, CookieSource::Plaintext);
    }

    #[test]
    fn configured_cookie_file_with_tilde() {
        let home = tempfile::tempdir().unwrap();
        std::fs::write(home.path().join("work.cookie"), "x=1; csrf=7\n").unwrap();

        let profile = Profile {
            cookie_file: Some(PathBuf::from("~/work.cookie")),
            ..Profile::default()
        };
        let lookup = FakeLookup {
            home: Some(home.path().to_path_buf()),
            ..FakeLookup::default()
        };

        let cookie = resolve_cookie_with(&profile, "work", &lookup).unwrap();
        assert_eq!(expose(&cookie), "x=1; csrf=7");
        assert_eq!(cookie.source, CookieSource::File(home.path().join("work.cookie")));
    }

    #[test]
    fn missing_configured_cookie_file_is_an_error() {
        let home = tempfile::tempdir().unwrap();
        let profile = Profile {
            cookie_file: Some(home.path().join("nope")),
            ..Profile::default()
        };
        let err = resolve_cookie_with(&profile, "work", &FakeLookup::default()).unwrap_err();
        assert!(matches!(err, ConfigError::CookieFile { .. }), "got {err:?}");
    }

    #[test]
    fn default_cookie_file_is_the_last_resort() {
        let home = tempfile::tempdir().unwrap();
        let lookup = FakeLookup {
            home: Some(home.path().to_path_buf()),
            ..FakeLookup::default()
        };

        let err = resolve_cookie_with(&Profile::default(), "default", &lookup).unwrap_err();
        assert!(matches!(err, ConfigError::NoCookie { .. }), "got {err:?}");

        std::fs::write(home.path().join(".alexa-cookie"), "d=4").unwrap();
        let cookie = resolve_cookie_with(&Profile::default(), "default", &lookup).unwrap();
        assert_eq!(expose(&cookie), "d=4");
    }

    #[test]
    fn empty_cookie_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty");
        std::fs::write(&path, "\n\n").unwrap();
        let err = read_cookie_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }), "got {err:?}");
    }

    #[test]
    fn tilde_expansion() {
        let home = Path::new("/home/me");
        assert_eq!(
            expand_tilde(Path::new("~/.alexa-cookie"), Some(home)),
            PathBuf::from("/home/me/.alexa-cookie")
        );
        assert_eq!(
            expand_tilde(Path::new("/etc/cookie"), Some(home)),
            PathBuf::from("/etc/cookie")
        );
        assert_eq!(
            expand_tilde(Path::new("~/x"), None),
            PathBuf::from("~/x")
        );
    }

    #[test]
    fn client_config_applies_profile() {
        let profile = Profile {
            api_url: Some("https://pitangui.amazon.com".into()),
            console_url: Some("https://alexa.amazon.com".into()),
            accept_language: Some("en-US,en;q=0.9".into()),
            timeout: Some(15),
            ca_cert: Some(PathBuf::from("/etc/ca.pem")),
            ..Profile::default()
        };
        let config = client_config(&profile, SecretString::from("csrf=1".to_owned())).unwrap();

        assert_eq!(config.api_url.as_str(), "https://pitangui.amazon.com/");
        assert_eq!(config.console_url.as_str(), "https://alexa.amazon.com/");
        assert_eq!(config.accept_language, "en-US,en;q=0.9");
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));
        assert_eq!(config.tls, TlsVerification::CustomCa(PathBuf::from("/etc/ca.pem")));
    }

    #[test]
    fn insecure_wins_over_ca_cert() {
        let profile = Profile {
            insecure: Some(true),
            ca_cert: Some(PathBuf::from("/etc/ca.pem")),
            ..Profile::default()
        };
        let config = client_config(&profile, SecretString::from("csrf=1".to_owned())).unwrap();
        assert_eq!(config.tls, TlsVerification::DangerAcceptInvalid);
        assert!(config.timeout.is_none());
    }

    #[test]
    fn bad_profile_url_names_the_field() {
        let profile = Profile {
            api_url: Some("layla".into()),
            ..Profile::default()
        };
        let err = client_config(&profile, SecretString::from("csrf=1".to_owned())).unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation { ref field, .. } if field == "api_url"),
            "got {err:?}"
        );
    }

    #[test]
    fn load_and_save_roundtrip_through_a_file() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            let path = jail.directory().join("nested").join("config.toml");

            let config = load_config_from(&path).unwrap();
            assert_eq!(config.default_profile.as_deref(), Some("default"));
            assert_eq!(config.defaults.output, "table");
            assert!(config.profiles.is_empty());

            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(
                &path,
                r#"
default_profile = "home"

[defaults]
output = "json"
timeout = 20

[profiles.home]
console_url = "https://alexa.amazon.co.uk"
cookie_file = "~/.alexa-cookie-uk"
"#,
            )
            .unwrap();

            let mut config = load_config_from(&path).unwrap();
            assert_eq!(config.default_profile.as_deref(), Some("home"));
            assert_eq!(config.defaults.timeout, Some(20));
            let home = config.profile_or_default("home");
            assert_eq!(home.console_url.as_deref(), Some("https://alexa.amazon.co.uk"));
            assert_eq!(config.profile_or_default("missing"), Profile::default());

            config.profiles.insert(
                "work".into(),
                Profile {
                    cookie_env: Some("WORK_COOKIE".into()),
                    ..Profile::default()
                },
            );
            save_config_to(&config, &path).unwrap();

            let reloaded = load_config_from(&path).unwrap();
            assert_eq!(
                reloaded.profile_or_default("work").cookie_env.as_deref(),
                Some("WORK_COOKIE")
            );
            assert_eq!(reloaded.defaults.output, "json");
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_the_file() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file("config.toml", "[defaults]\noutput = \"json\"\n")?;
            jail.set_env("ECHOCTL_DEFAULTS__OUTPUT", "yaml");
            jail.set_env("ECHOCTL_DEFAULT_PROFILE", "work");

            let config = load_config_from(&jail.directory().join("config.toml")).unwrap();
            assert_eq!(config.defaults.output, "yaml");
            assert_eq!(config.default_profile.as_deref(), Some("work"));
            Ok(())
        });
    }
}
