//! The injected HTTP transport seam.
//!
//! The library never talks to the network directly. Callers hand it a
//! [`Transport`] that already carries OAuth credentials; the library only
//! decides method, URL, headers and body, and interprets what comes back.
//!
//! Transports in the wild report the HTTP status in one of two shapes: a
//! string `code` or a numeric `status`. [`ResponseCode`] models both and
//! [`parse_response_code`] normalizes them.

#[cfg(test)]
pub(crate) mod mock;
#[cfg(feature = "reqwest")]
mod http;

#[cfg(feature = "reqwest")]
pub use self::http::ReqwestTransport;

use std::fmt;

use thiserror::Error;

/// HTTP verbs used by the contacts API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully resolved request handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL including the query string.
    pub url: String,
    pub body: Option<String>,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// Creates a request without body or headers.
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            headers: Vec::new(),
        }
    }

    /// Builder method to set the body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Builder method to add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Looks up a header value, ignoring ASCII case of the name.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// The status of a response, in whichever shape the transport reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseCode {
    /// String-typed `code` convention, e.g. `"401"`.
    Code(String),
    /// Numeric `status` convention.
    Status(u16),
}

impl ResponseCode {
    /// Returns the numeric status, or `None` if a string code is not numeric.
    pub fn as_u16(&self) -> Option<u16> {
        match self {
            Self::Code(code) => code.trim().parse().ok(),
            Self::Status(status) => Some(*status),
        }
    }
}

/// A response returned by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub code: ResponseCode,
    pub body: Vec<u8>,
    pub headers: Vec<(String, String)>,
}

impl HttpResponse {
    /// Creates a response using the numeric status convention.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            code: ResponseCode::Status(status),
            body: body.into(),
            headers: Vec::new(),
        }
    }

    /// Creates a response using the string code convention.
    pub fn with_code(code: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            code: ResponseCode::Code(code.into()),
            body: body.into(),
            headers: Vec::new(),
        }
    }

    /// Builder method to add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// The normalized numeric status.
    pub fn status(&self) -> Option<u16> {
        parse_response_code(self)
    }

    /// The body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Looks up a header value, ignoring ASCII case of the name.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Extracts the numeric status from a response, whichever convention the
/// transport used.
pub fn parse_response_code(response: &HttpResponse) -> Option<u16> {
    response.code.as_u16()
}

/// A failure raised by the transport itself.
///
/// Some transports raise on non-success statuses instead of returning the
/// response; in that case the response is attached so it can still be
/// classified.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    pub response: Option<HttpResponse>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    /// Creates an error without an attached response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            response: None,
            source: None,
        }
    }

    /// Creates an error carrying the response that triggered it.
    pub fn with_response(message: impl Into<String>, response: HttpResponse) -> Self {
        Self {
            message: message.into(),
            response: Some(response),
            source: None,
        }
    }

    /// Sets the underlying cause.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Status of the attached response, if any.
    pub fn status(&self) -> Option<u16> {
        self.response.as_ref().and_then(parse_response_code)
    }
}

/// An authenticated HTTP client.
pub trait Transport {
    /// Performs `request` and returns the response, blocking until done.
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_string_code_convention() {
        let response = HttpResponse::with_code("401", "");
        assert_eq!(parse_response_code(&response), Some(401));
    }

    #[test]
    fn parses_numeric_status_convention() {
        let response = HttpResponse::new(401, "");
        assert_eq!(parse_response_code(&response), Some(401));
    }

    #[test]
    fn non_numeric_code_is_none() {
        let response = HttpResponse::with_code("unauthorized", "");
        assert_eq!(parse_response_code(&response), None);
    }

    #[test]
    fn header_lookup_ignores_case() {
        let response = HttpResponse::new(200, "").with_header("Content-Type", "image/jpeg");
        assert_eq!(response.header("content-type"), Some("image/jpeg"));
        assert_eq!(response.header("etag"), None);
    }

    #[test]
    fn transport_error_status_comes_from_response() {
        let err = TransportError::with_response("denied", HttpResponse::new(403, ""));
        assert_eq!(err.status(), Some(403));
        assert_eq!(TransportError::new("reset").status(), None);
    }
}
