//! Blocking `reqwest` transport with bearer-token authentication.

use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::Client;
use tracing::trace;

use super::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A [`Transport`] that sends requests with an OAuth 2.0 access token.
///
/// Token acquisition and refresh are out of scope; call
/// [`ReqwestTransport::set_access_token`] after refreshing.
#[derive(Debug)]
pub struct ReqwestTransport {
    client: Client,
    access_token: String,
}

impl ReqwestTransport {
    /// Creates a transport with the default timeout.
    pub fn new(access_token: impl Into<String>) -> Result<Self, TransportError> {
        Self::with_timeout(access_token, DEFAULT_TIMEOUT)
    }

    /// Creates a transport with an explicit timeout.
    pub fn with_timeout(
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("gcontacts/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                TransportError::new(format!("failed to create HTTP client: {}", e)).with_source(e)
            })?;

        Ok(Self {
            client,
            access_token: access_token.into(),
        })
    }

    /// Replaces the access token (after a refresh).
    pub fn set_access_token(&mut self, token: impl Into<String>) {
        self.access_token = token.into();
    }
}

impl Transport for ReqwestTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, &request.url)
            .bearer_auth(&self.access_token);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(ref body) = request.body {
            builder = builder.body(body.clone());
        }

        trace!(method = %request.method, url = %request.url, "sending request");

        let response = builder.send().map_err(|e| {
            let message = if e.is_timeout() {
                "request timeout".to_string()
            } else if e.is_connect() {
                format!("connection failed: {}", e)
            } else {
                format!("request failed: {}", e)
            };
            TransportError::new(message).with_source(e)
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .map_err(|e| {
                TransportError::new(format!("failed to read response: {}", e)).with_source(e)
            })?
            .to_vec();

        Ok(HttpResponse {
            code: super::ResponseCode::Status(status),
            body,
            headers,
        })
    }
}
