// Session credentials
//
// The caller hands in the raw `Cookie` header string copied from a
// logged-in web console. It is attached verbatim to every request; the
// parsed map is only consulted for the `csrf` value.

use std::collections::HashMap;
use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Name of the cookie carrying the anti-forgery token.
pub const CSRF_COOKIE: &str = "csrf";

/// Immutable per-process credential bundle.
pub struct Session {
    cookie_header: SecretString,
    cookies: HashMap<String, String>,
    csrf: Option<i64>,
}

impl Session {
    /// Parse a raw cookie header string (`name=value; name2=value2`).
    ///
    /// Fails only if the string contains no cookie at all. A missing or
    /// non-numeric `csrf` cookie is tolerated here: reads still work, and
    /// every POST will fail with [`Error::MissingCsrf`].
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let raw = raw.trim();
        let cookies = parse_cookie_pairs(raw);
        if cookies.is_empty() {
            return Err(Error::validation(
                "cookie",
                "no 'name=value' pairs found in session cookie",
            ));
        }

        let csrf = cookies
            .get(CSRF_COOKIE)
            .and_then(|value| value.trim().parse::<i64>().ok());

        Ok(Self {
            cookie_header: SecretString::from(raw.to_owned()),
            cookies,
            csrf,
        })
    }

    /// The CSRF token, if the `csrf` cookie is present and numeric.
    pub fn csrf(&self) -> Option<i64> {
        self.csrf
    }

    /// Look up a single cookie value by name.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Names of all parsed cookies, sorted.
    pub fn cookie_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.cookies.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The literal cookie header string, exactly as supplied (trimmed).
    pub(crate) fn cookie_header(&self) -> &str {
        self.cookie_header.expose_secret()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("cookies", &self.cookie_names())
            .field("csrf", &self.csrf.is_some())
            .finish_non_exhaustive()
    }
}

/// Split `a=b; c="d"` into a map. First occurrence of a name wins.
fn parse_cookie_pairs(raw: &str) -> HashMap<String, String> {
    let mut cookies = HashMap::new();
    for part in raw.split(';') {
        let Some((name, value)) = part.split_once('=') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);
        cookies
            .entry(name.to_owned())
            .or_insert_with(|| value.to_owned());
    }
    cookies
}
