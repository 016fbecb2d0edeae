//! Error types for the Taskdock CLI

use std::time::Duration;
use thiserror::Error;

/// Result type alias for Taskdock operations
pub type Result<T> = std::result::Result<T, Error>;

/// Result type for the remote resource layer
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    Other(String),
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Dialoguer(err.to_string())
    }
}

impl Error {
    /// Message suitable for a user-facing notification.
    ///
    /// Request errors carry the server message verbatim; everything else
    /// uses its display form.
    pub fn user_message(&self) -> String {
        match self {
            Error::Api(err) => err.user_message(),
            other => other.to_string(),
        }
    }

    /// Follow-up suggestion printed under the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Error::Api(err) if err.is_unauthorized() => {
                Some("Your session may have expired. Run `taskdock init` to sign in again.")
            }
            _ => None,
        }
    }
}

/// Remote resource errors.
///
/// `Clone` because a single in-flight fetch fans its result out to every
/// caller that joined it.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// Network unreachable, connection refused or timeout
    #[error("Network error: {0}")]
    Transport(String),

    /// Non-2xx response with the server-supplied message
    #[error("Request failed ({status}): {message}")]
    Request { status: u16, message: String },

    /// 2xx response whose body does not have the expected shape
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Query is disabled and nothing is cached yet
    #[error("Query {0} is disabled")]
    Disabled(String),
}

impl ApiError {
    /// Build a request error from a status code and an optional body message.
    pub fn request(status: u16, message: impl Into<String>) -> Self {
        ApiError::Request {
            status,
            message: message.into(),
        }
    }

    /// Server message verbatim for request errors, display form otherwise
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Request { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status for request errors
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the session is missing or expired
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Suggested wait for a 429 response
    pub fn rate_limited(retry_after: Duration) -> Self {
        ApiError::request(
            429,
            format!("Rate limit exceeded. Retry after {:?}", retry_after),
        )
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Transport("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Transport("Failed to connect to API".to_string())
        } else if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// Malformed local input, caught before any request is sent
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("Title must not be empty")]
    EmptyTitle,

    #[error("Message must not be empty")]
    EmptyMessage,

    #[error("Select at least one file to upload")]
    NoFiles,

    #[error("Checklist item {index} does not exist (task has {len} items)")]
    ChecklistIndex { index: usize, len: usize },

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found. Run `taskdock init` to set up.")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),

    #[error("Not signed in. Run `taskdock init` to store a session.")]
    MissingSession,

    #[error("API host not configured. Run `taskdock init` or pass --api-host.")]
    MissingApiHost,
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
