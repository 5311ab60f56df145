//! Error types for the vCloud Director management crate.

use std::fmt;

/// Categorised error kinds.
#[derive(Debug, Clone)]
pub enum VcloudErrorKind {
    /// vCD REST API unreachable or session expired
    ConnectionError,
    /// Authentication failed (401)
    AuthenticationError,
    /// Resource not found (404, or a record scan that exhausted all records)
    NotFound,
    /// Entity constructed without an href or a fetched resource
    InvalidEntity,
    /// HTTP / API error with status code
    ApiError(u16),
    /// Timeout
    Timeout,
    /// Permission denied (403)
    AccessDenied,
    /// XML parse / malformed representation error
    ParseError,
    /// Generic
    Other,
}

/// Crate error type carrying a kind + human-readable message.
#[derive(Debug, Clone)]
pub struct VcloudError {
    pub kind: VcloudErrorKind,
    pub message: String,
}

impl VcloudError {
    pub fn new(kind: VcloudErrorKind, msg: impl Into<String>) -> Self {
        Self { kind, message: msg.into() }
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        Self::new(VcloudErrorKind::ConnectionError, msg)
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::new(VcloudErrorKind::AuthenticationError, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(VcloudErrorKind::NotFound, msg)
    }

    pub fn invalid_entity(msg: impl Into<String>) -> Self {
        Self::new(VcloudErrorKind::InvalidEntity, msg)
    }

    pub fn api(status: u16, msg: impl Into<String>) -> Self {
        Self::new(VcloudErrorKind::ApiError(status), msg)
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::new(VcloudErrorKind::ParseError, msg)
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::new(VcloudErrorKind::Timeout, msg)
    }
}

impl fmt::Display for VcloudError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.kind, self.message)
    }
}

impl std::error::Error for VcloudError {}

impl From<VcloudError> for String {
    fn from(e: VcloudError) -> String {
        e.to_string()
    }
}

impl From<reqwest::Error> for VcloudError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::timeout(format!("HTTP timeout: {e}"))
        } else if e.is_connect() {
            Self::connection(format!("Connection failed: {e}"))
        } else {
            Self::new(VcloudErrorKind::Other, format!("HTTP error: {e}"))
        }
    }
}

impl From<quick_xml::Error> for VcloudError {
    fn from(e: quick_xml::Error) -> Self {
        Self::parse(format!("XML parse error: {e}"))
    }
}

/// Convenience alias.
pub type VcloudResult<T> = Result<T, VcloudError>;
