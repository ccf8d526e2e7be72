//! Config subcommand handlers.

use std::io::Read;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

use super::RenderOpts;

// ── Show view ───────────────────────────────────────────────────────

/// Resolved settings of the active profile. Never contains the cookie.
#[derive(Debug, Serialize)]
struct ResolvedView {
    profile: String,
    config_path: String,
    api_url: String,
    console_url: String,
    accept_language: String,
    timeout_secs: Option<u64>,
    tls: String,
    cookie_source: Option<String>,
    cookie_names: Vec<String>,
    csrf: bool,
}

fn detail(v: &ResolvedView) -> String {
    [
        format!("Profile:         {}", v.profile),
        format!("Config file:     {}", v.config_path),
        format!("API URL:         {}", v.api_url),
        format!("Console URL:     {}", v.console_url),
        format!("Accept-Language: {}", v.accept_language),
        format!(
            "Timeout:         {}",
            v.timeout_secs.map_or_else(|| "-".into(), |t| format!("{t}s"))
        ),
        format!("TLS:             {}", v.tls),
        format!(
            "Cookie:          {}",
            v.cookie_source.as_deref().unwrap_or("not configured")
        ),
        format!(
            "Cookie names:    {}",
            if v.cookie_names.is_empty() {
                "-".into()
            } else {
                v.cookie_names.join(", ")
            }
        ),
        format!("CSRF token:      {}", if v.csrf { "present" } else { "missing" }),
    ]
    .join("\n")
}

// ── Helpers ─────────────────────────────────────────────────────────

fn read_cookie(from_stdin: bool) -> Result<SecretString, CliError> {
    let raw = if from_stdin {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        rpassword::prompt_password("Cookie header value: ")?
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CliError::Validation {
            field: "cookie".into(),
            reason: "cookie cannot be empty".into(),
        });
    }
    Ok(SecretString::from(trimmed.to_owned()))
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(
    args: ConfigArgs,
    global: &GlobalOpts,
    cfg: &Config,
    opts: &RenderOpts,
) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), opts.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let (profile_name, profile) = config::active_profile(global, cfg)?;

            // A missing cookie is reported, not fatal.
            let cookie = match config::resolve_cookie(global, &profile, &profile_name) {
                Ok(cookie) => Some(cookie),
                Err(CliError::NoCookie { .. }) => None,
                Err(e) => return Err(e),
            };
            let secret = cookie
                .as_ref()
                .map_or_else(|| SecretString::from(String::new()), |c| c.secret.clone());
            let client = config::build_client_config(global, cfg, &profile, secret)?;

            let (cookie_names, csrf) = match cookie {
                Some(_) => {
                    let account = client.connect()?;
                    let session = account.client().session();
                    let names = session.cookie_names().into_iter().map(str::to_owned).collect();
                    (names, session.csrf().is_some())
                }
                None => (Vec::new(), false),
            };

            let view = ResolvedView {
                profile: profile_name,
                config_path: config::config_path().display().to_string(),
                api_url: client.api_url.to_string(),
                console_url: client.console_url.to_string(),
                accept_language: client.accept_language.clone(),
                timeout_secs: client.timeout.map(|t| t.as_secs()),
                tls: format!("{:?}", client.tls),
                cookie_source: cookie.map(|c| c.source.to_string()),
                cookie_names,
                csrf,
            };

            let out = output::render_single(opts.format, &view, detail)?;
            output::print_output(&out, opts.quiet);
            Ok(())
        }

        ConfigCommand::SetCookie { stdin, plaintext } => {
            let profile_name = config::active_profile_name(global, cfg);
            let cookie = read_cookie(stdin)?;
            if !cookie.expose_secret().contains("csrf=") {
                eprintln!("warning: cookie has no csrf value; playback commands will be rejected");
            }

            if plaintext {
                let mut updated = config::load_config()?;
                updated
                    .profiles
                    .entry(profile_name.clone())
                    .or_default()
                    .cookie = Some(cookie.expose_secret().to_owned());
                config::save_config(&updated)?;
                if !opts.quiet {
                    eprintln!(
                        "Cookie saved to {} for profile '{profile_name}'",
                        config::config_path().display()
                    );
                }
            } else {
                config::store_cookie(&profile_name, &cookie)?;
                if !opts.quiet {
                    eprintln!("Cookie stored in system keyring for profile '{profile_name}'");
                }
            }
            Ok(())
        }
    }
}
