//! CLI configuration: thin wrapper around `echoctl_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--cookie-file, --api-url, --timeout, ...).

use std::time::Duration;

use clap::ValueEnum;
use secrecy::SecretString;

use echoctl_config::{CookieSource, ResolvedCookie, expand_tilde, home_dir, read_cookie_file};
use echoctl_core::{ClientConfig, TlsVerification, parse_url};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use echoctl_config::{Config, Profile, config_path, load_config, save_config, store_cookie};

// ── Profile selection ───────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// The active profile. A profile named with `--profile` must exist; the
/// implicit default may be absent.
pub fn active_profile(global: &GlobalOpts, config: &Config) -> Result<(String, Profile), CliError> {
    let name = active_profile_name(global, config);
    if global.profile.is_some() && !config.profiles.contains_key(&name) {
        let mut available: Vec<&str> = config.profiles.keys().map(String::as_str).collect();
        available.sort_unstable();
        return Err(CliError::ProfileNotFound {
            name,
            available: if available.is_empty() {
                "(none)".into()
            } else {
                available.join(", ")
            },
        });
    }
    let profile = config.profile_or_default(&name);
    Ok((name, profile))
}

// ── Cookie + client config ──────────────────────────────────────────

/// Resolve the session cookie: `--cookie-file` first, then the shared chain.
pub fn resolve_cookie(
    global: &GlobalOpts,
    profile: &Profile,
    profile_name: &str,
) -> Result<ResolvedCookie, CliError> {
    if let Some(ref path) = global.cookie_file {
        let path = expand_tilde(path, home_dir().as_deref());
        let secret = read_cookie_file(&path)?;
        return Ok(ResolvedCookie {
            secret,
            source: CookieSource::File(path),
        });
    }
    Ok(echoctl_config::resolve_cookie(profile, profile_name)?)
}

/// Translate the active profile + global flags into a `ClientConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_client_config(global: &GlobalOpts, config: &Config) -> Result<ClientConfig, CliError> {
    let (profile_name, profile) = active_profile(global, config)?;
    let cookie = resolve_cookie(global, &profile, &profile_name)?;
    tracing::debug!(profile = %profile_name, source = %cookie.source, "resolved session cookie");

    build_client_config(global, config, &profile, cookie.secret)
}

/// Profile values plus flag overrides for a given cookie.
pub fn build_client_config(
    global: &GlobalOpts,
    config: &Config,
    profile: &Profile,
    cookie: SecretString,
) -> Result<ClientConfig, CliError> {
    let mut client = echoctl_config::client_config(profile, cookie)?;
    apply_overrides(&mut client, global, config)?;
    Ok(client)
}

fn apply_overrides(
    client: &mut ClientConfig,
    global: &GlobalOpts,
    config: &Config,
) -> Result<(), CliError> {
    if let Some(ref raw) = global.api_url {
        client.api_url = parse_url("api_url", raw)?;
    }
    if let Some(ref raw) = global.console_url {
        client.console_url = parse_url("console_url", raw)?;
    }
    if global.insecure {
        client.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        client.timeout = Some(Duration::from_secs(secs));
    } else if client.timeout.is_none() {
        client.timeout = config.defaults.timeout.map(Duration::from_secs);
    }
    Ok(())
}

// ── Output settings ─────────────────────────────────────────────────

/// Output format: flag > config default > table.
pub fn output_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    global
        .output
        .or_else(|| OutputFormat::from_str(&config.defaults.output, true).ok())
        .unwrap_or(OutputFormat::Table)
}

/// Color mode: flag > config default > auto.
pub fn color_mode(global: &GlobalOpts, config: &Config) -> ColorMode {
    global
        .color
        .or_else(|| ColorMode::from_str(&config.defaults.color, true).ok())
        .unwrap_or(ColorMode::Auto)
}
