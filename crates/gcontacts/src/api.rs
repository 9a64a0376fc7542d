//! Authenticated access to the contacts feeds.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use gcontacts_core::{Clock, SystemClock, format_time_for_xml};
use tracing::{debug, trace};

use crate::config::ApiConfig;
use crate::error::{ContactsError, ContactsResult, classify_status};
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};

/// Content type of create and update payloads.
pub const ATOM_CONTENT_TYPE: &str = "application/atom+xml";

/// Query parameters of a request. Keys are unique; setting a key again
/// replaces its value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`QueryParams::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Inserts `key`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.pairs.push((key, value)),
        }
    }

    /// Sets `key` only if it is not already present.
    pub fn set_default(&mut self, key: &str, value: impl Into<String>) {
        if !self.contains(key) {
            self.set(key, value);
        }
    }

    /// The unencoded value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Percent-encoded query string with keys in sorted order.
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<&(String, String)> = self.pairs.iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for QueryParams {
    fn from(pairs: [(K, V); N]) -> Self {
        let mut params = Self::new();
        for (k, v) in pairs {
            params.set(k, v);
        }
        params
    }
}

/// Converts an entry id URL into the path used to modify it:
/// `.../m8/feeds/contacts/{user}/base/{id}` becomes
/// `contacts/{user}/full/{id}`.
pub fn id_path(id_url: &str) -> String {
    let path = id_url
        .split_once("/m8/feeds/")
        .map(|(_, rest)| rest)
        .unwrap_or(id_url);
    path.replacen("/base/", "/full/", 1)
}

/// Fails with the error matching a non-success status.
pub fn ensure_success(response: &HttpResponse) -> ContactsResult<()> {
    let status = response.status().ok_or_else(|| {
        ContactsError::invalid_response(format!(
            "unrecognized response code {:?}",
            response.code
        ))
    })?;
    match classify_status(status) {
        None => Ok(()),
        Some(_) => {
            let body = response.text();
            let snippet: String = body.chars().take(200).collect();
            Err(ContactsError::from_status(
                status,
                format!("request failed: {}", snippet.trim()),
            ))
        }
    }
}

/// Client for the contacts API, sharing one transport between clones.
#[derive(Clone)]
pub struct Api {
    transport: Rc<dyn Transport>,
    config: ApiConfig,
    clock: Rc<dyn Clock>,
}

impl fmt::Debug for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Api")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Api {
    /// Creates a client with the default configuration and system clock.
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::from_shared(Rc::new(transport))
    }

    /// Creates a client over an already shared transport.
    pub fn from_shared(transport: Rc<dyn Transport>) -> Self {
        Self {
            transport,
            config: ApiConfig::default(),
            clock: Rc::new(SystemClock),
        }
    }

    /// Replaces the default configuration.
    pub fn with_config(mut self, config: ApiConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the system clock, e.g. with a
    /// [`ManualClock`](gcontacts_core::ManualClock) in tests.
    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Full URL for `path`, with `alt=json` and `v` added unless given.
    pub fn url_for(&self, path: &str, params: &QueryParams) -> String {
        let mut params = params.clone();
        params.set_default("alt", "json");
        params.set_default("v", self.config.protocol_version.clone());
        format!("{}{}?{}", self.config.base_url, path, params.to_query_string())
    }

    /// GETs a feed path.
    pub fn get(
        &self,
        path: &str,
        params: &QueryParams,
        headers: &[(&str, &str)],
    ) -> ContactsResult<HttpResponse> {
        self.request(HttpMethod::Get, path, params, None, headers)
    }

    /// POSTs `body` to a feed path.
    pub fn post(
        &self,
        path: &str,
        body: &str,
        params: &QueryParams,
        headers: &[(&str, &str)],
    ) -> ContactsResult<HttpResponse> {
        self.request(HttpMethod::Post, path, params, Some(body), headers)
    }

    /// PUTs `body` to a feed path.
    pub fn put(
        &self,
        path: &str,
        body: &str,
        params: &QueryParams,
        headers: &[(&str, &str)],
    ) -> ContactsResult<HttpResponse> {
        self.request(HttpMethod::Put, path, params, Some(body), headers)
    }

    /// DELETEs a feed path.
    pub fn delete(
        &self,
        path: &str,
        params: &QueryParams,
        headers: &[(&str, &str)],
    ) -> ContactsResult<HttpResponse> {
        self.request(HttpMethod::Delete, path, params, None, headers)
    }

    /// Sends a request relative to the feed root.
    ///
    /// A 401, whether returned or attached to a transport error, becomes
    /// [`Unauthorized`](crate::ContactsErrorCode::Unauthorized). Other
    /// statuses are returned as-is; see [`ensure_success`].
    pub fn request(
        &self,
        method: HttpMethod,
        path: &str,
        params: &QueryParams,
        body: Option<&str>,
        headers: &[(&str, &str)],
    ) -> ContactsResult<HttpResponse> {
        let mut request = HttpRequest::new(method, self.url_for(path, params));
        for (name, value) in headers {
            request = request.with_header(*name, *value);
        }
        if let Some(body) = body {
            request = request.with_body(body);
        }

        debug!(method = %method, url = %request.url, "contacts API request");
        let response = self
            .transport
            .execute(&request)
            .map_err(classify_transport_error)?;
        let status = response.status();
        trace!(method = %method, status = ?status, "contacts API response");

        if status == Some(401) {
            return Err(ContactsError::unauthorized(format!(
                "{} {} was not authorized",
                method, path
            )));
        }
        Ok(response)
    }

    /// Fetches an absolute URL (e.g. a photo link) without query
    /// decoration or status interpretation.
    pub fn fetch_absolute(&self, url: &str) -> Result<HttpResponse, TransportError> {
        debug!(url = %url, "fetching absolute URL");
        self.transport
            .execute(&HttpRequest::new(HttpMethod::Get, url))
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Current time formatted for `updated` elements.
    pub fn now_for_xml(&self) -> String {
        format_time_for_xml(&self.clock.now())
    }

    /// Sleeps through the injected clock.
    pub fn sleep(&self, duration: Duration) {
        self.clock.sleep(duration);
    }
}

fn classify_transport_error(err: TransportError) -> ContactsError {
    match err.status() {
        Some(401) => ContactsError::unauthorized(err.message.clone()).with_source(err),
        Some(status) if classify_status(status).is_some() => {
            ContactsError::from_status(status, err.message.clone()).with_source(err)
        }
        _ => ContactsError::network(err.message.clone()).with_source(err),
    }
}
