//! Error types for contacts API operations.
//!
//! Every failure surfaced by this crate is a [`ContactsError`] carrying a
//! [`ContactsErrorCode`]. The code is what callers branch on: only
//! [`ContactsErrorCode::ServerError`] is transient, and it is the only class
//! the batch orchestrator retries.

use std::fmt;
use thiserror::Error;

/// The category of a contacts API error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactsErrorCode {
    /// The provider rejected the credentials (HTTP 401), whichever transport
    /// convention reported it.
    Unauthorized,
    /// The requested entity does not exist (HTTP 404).
    NotFound,
    /// The entity changed server-side since it was loaded (HTTP 412).
    PreconditionFailed,
    /// Any other client error (4xx, including 403).
    ClientRequest,
    /// The provider failed (5xx). Transient.
    ServerError,
    /// The transport failed without an interpretable HTTP response.
    Network,
    /// The response body could not be interpreted.
    InvalidResponse,
    /// Invalid or missing configuration.
    Configuration,
    /// Unexpected internal failure, e.g. while writing XML.
    Internal,
}

impl ContactsErrorCode {
    /// Returns true if the failed operation may succeed when retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ServerError)
    }

    /// Returns a stable snake_case name for this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::NotFound => "not_found",
            Self::PreconditionFailed => "precondition_failed",
            Self::ClientRequest => "client_request",
            Self::ServerError => "server_error",
            Self::Network => "network_error",
            Self::InvalidResponse => "invalid_response",
            Self::Configuration => "configuration_error",
            Self::Internal => "internal_error",
        }
    }
}

impl fmt::Display for ContactsErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Maps a failing HTTP status to its error category.
///
/// Returns `None` for statuses that are not failures (below 400).
pub fn classify_status(status: u16) -> Option<ContactsErrorCode> {
    match status {
        401 => Some(ContactsErrorCode::Unauthorized),
        404 => Some(ContactsErrorCode::NotFound),
        412 => Some(ContactsErrorCode::PreconditionFailed),
        400..=499 => Some(ContactsErrorCode::ClientRequest),
        500..=599 => Some(ContactsErrorCode::ServerError),
        600.. => Some(ContactsErrorCode::InvalidResponse),
        _ => None,
    }
}

/// An error that occurred while talking to the contacts API.
#[derive(Debug, Error)]
pub struct ContactsError {
    code: ContactsErrorCode,
    message: String,
    /// HTTP status of the response that caused the error, if any.
    status: Option<u16>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ContactsError {
    /// Creates a new error with the given code and message.
    pub fn new(code: ContactsErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Creates the error matching a failing HTTP status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let code = classify_status(status).unwrap_or(ContactsErrorCode::InvalidResponse);
        Self::new(code, message).with_status(status)
    }

    /// Creates an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ContactsErrorCode::Unauthorized, message).with_status(401)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ContactsErrorCode::Network, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ContactsErrorCode::InvalidResponse, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ContactsErrorCode::Configuration, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ContactsErrorCode::Internal, message)
    }

    /// Records the HTTP status that caused this error.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the underlying cause.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> ContactsErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the HTTP status, if the error came from a response.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Returns true if the operation may be retried.
    pub fn is_transient(&self) -> bool {
        self.code.is_transient()
    }
}

impl fmt::Display for ContactsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        if let Some(status) = self.status {
            write!(f, " (HTTP {})", status)?;
        }
        Ok(())
    }
}

/// A specialized Result type for contacts API operations.
pub type ContactsResult<T> = Result<T, ContactsError>;
