// Session HTTP client
//
// Wraps `reqwest::Client` with the web console's browser-impersonation
// headers, the verbatim session cookie, CSRF injection on writes, and the
// per-path GET cache. Domain modules (account, device) are built on the
// two request helpers here and never touch reqwest directly.

use std::fmt;

use reqwest::header::{
    ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, CONTENT_TYPE, COOKIE, HeaderMap, HeaderName,
    HeaderValue, ORIGIN, REFERER, USER_AGENT,
};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::cache::ResponseCache;
use crate::error::Error;
use crate::session::Session;
use crate::transport::TransportConfig;

/// API host of the web console backend.
pub const DEFAULT_API_URL: &str = "https://layla.amazon.de";
/// Web console the session cookie was issued by.
pub const DEFAULT_CONSOLE_URL: &str = "https://alexa.amazon.de";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "de-DE,de;q=0.8,en;q=0.6,en-US;q=0.4";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_12_6) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/61.0.3163.100 Safari/537.36";
const ACCEPT_JSON: &str = "application/json, text/javascript, */*; q=0.01";
const ACCEPT_ENCODINGS: &str = "gzip, deflate, br";
const POST_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";
const CSRF_HEADER: &str = "csrf";
const DNT_HEADER: &str = "dnt";
const BODY_PREVIEW_CHARS: usize = 200;

// ── Request options ──────────────────────────────────────────────────

/// Per-call options for [`SessionClient::get`].
#[derive(Debug, Clone)]
pub struct GetOptions {
    /// Serve from / populate the response cache. Defaults to `true`.
    pub cache: bool,
    /// Headers merged on top of the base headers (these win on conflict).
    pub headers: HeaderMap,
}

impl Default for GetOptions {
    fn default() -> Self {
        Self {
            cache: true,
            headers: HeaderMap::new(),
        }
    }
}

impl GetOptions {
    /// Options that always hit the network and never populate the cache.
    pub fn uncached() -> Self {
        Self {
            cache: false,
            ..Self::default()
        }
    }

    /// Add a header override.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// The single authenticated HTTP gateway to the web console API.
///
/// Every request carries the fixed browser headers and the literal session
/// cookie. POSTs additionally carry the integer `csrf` header derived from
/// the session. Successful cacheable GETs are remembered per path for the
/// lifetime of the client.
pub struct SessionClient {
    http: reqwest::Client,
    base_url: Url,
    session: Session,
    headers: HeaderMap,
    cache: ResponseCache,
}

impl SessionClient {
    /// Create a client for `base_url` (the API host), impersonating a
    /// browser tab on `console_url`.
    pub fn new(
        base_url: Url,
        console_url: &Url,
        session: Session,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, base_url, console_url, session)
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        console_url: &Url,
        session: Session,
    ) -> Result<Self, Error> {
        let headers = base_headers(console_url, &session, DEFAULT_ACCEPT_LANGUAGE)?;
        Ok(Self {
            http,
            base_url,
            session,
            headers,
            cache: ResponseCache::new(),
        })
    }

    /// Replace the `Accept-Language` base header.
    pub fn with_accept_language(mut self, accept_language: &str) -> Result<Self, Error> {
        self.headers
            .insert(ACCEPT_LANGUAGE, header_value("Accept-Language", accept_language)?);
        Ok(self)
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The session this client authenticates with.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The response cache (read access for diagnostics and tests).
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a path (with optional query string) onto the API base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Authenticated read.
    ///
    /// With `options.cache` set, a previously cached body for `path` is
    /// parsed and returned without touching the network; otherwise the
    /// request is sent and a successfully parsed body is cached.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        options: &GetOptions,
    ) -> Result<T, Error> {
        if options.cache {
            if let Some(body) = self.cache.get(path) {
                trace!(path, "serving GET from cache");
                return parse_body(&body);
            }
        }

        let url = self.url(path)?;
        debug!(cache = options.cache, "GET {url}");

        let headers = merge_headers(&self.headers, &options.headers);
        let resp = self.http.get(url).headers(headers).send().await?;
        let body = read_body(resp).await?;
        let value = parse_body(&body)?;

        if options.cache {
            self.cache.insert(path, body);
        }
        Ok(value)
    }

    /// Authenticated write.
    ///
    /// Serialises `body` as JSON text (no body when `None`) and attaches the
    /// CSRF header. Caller-supplied `headers` win over everything else.
    /// Never reads or writes the cache.
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&serde_json::Value>,
        headers: Option<&HeaderMap>,
    ) -> Result<T, Error> {
        let csrf = self.session.csrf().ok_or(Error::MissingCsrf)?;
        let url = self.url(path)?;
        debug!("POST {url}");

        let mut write_headers = self.headers.clone();
        write_headers.insert(CONTENT_TYPE, HeaderValue::from_static(POST_CONTENT_TYPE));
        write_headers.insert(HeaderName::from_static(CSRF_HEADER), HeaderValue::from(csrf));
        let write_headers = match headers {
            Some(overrides) => merge_headers(&write_headers, overrides),
            None => write_headers,
        };

        let mut builder = self.http.post(url).headers(write_headers);
        if let Some(body) = body {
            builder = builder.body(body.to_string());
        }

        let resp = builder.send().await?;
        let body = read_body(resp).await?;
        parse_body(&body)
    }
}

impl fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionClient")
            .field("base_url", &self.base_url.as_str())
            .field("session", &self.session)
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

/// The fixed header set every request carries.
fn base_headers(
    console_url: &Url,
    session: &Session,
    accept_language: &str,
) -> Result<HeaderMap, Error> {
    let origin = console_url.origin().ascii_serialization();
    let referer = console_url.join("/spa/index.html")?;

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_JSON));
    headers.insert(ORIGIN, header_value("Origin", &origin)?);
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(HeaderName::from_static(DNT_HEADER), HeaderValue::from_static("1"));
    headers.insert(REFERER, header_value("Referer", referer.as_str())?);
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static(ACCEPT_ENCODINGS));
    headers.insert(ACCEPT_LANGUAGE, header_value("Accept-Language", accept_language)?);

    let mut cookie = header_value("Cookie", session.cookie_header())?;
    cookie.set_sensitive(true);
    headers.insert(COOKIE, cookie);

    Ok(headers)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, Error> {
    HeaderValue::from_str(value).map_err(|e| Error::InvalidHeader {
        name: name.into(),
        reason: e.to_string(),
    })
}

/// Overlay `overrides` onto `base`: any header name present in `overrides`
/// replaces all of its values in `base`.
pub(crate) fn merge_headers(base: &HeaderMap, overrides: &HeaderMap) -> HeaderMap {
    let mut merged = base.clone();
    for name in overrides.keys() {
        merged.remove(name);
        for value in overrides.get_all(name) {
            merged.append(name.clone(), value.clone());
        }
    }
    merged
}

/// Read the body of a successful response, or turn a non-2xx status into
/// [`Error::Status`].
async fn read_body(resp: reqwest::Response) -> Result<String, Error> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Status {
            status: status.as_u16(),
            body: preview(&body),
        });
    }
    Ok(resp.text().await?)
}

/// Parse a JSON body. An empty body is a parse error like any other
/// non-JSON text.
fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(body)),
        body: body.to_owned(),
    })
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

/// Append URL-encoded query parameters to a path.
pub(crate) fn with_query(path: &str, params: &[(&str, &str)]) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    if query.is_empty() {
        path.to_owned()
    } else {
        format!("{path}?{query}")
    }
}
