//! Error model for the Plumifly client.
//!
//! # Design
//! Every failure surfaces as a single `PlumiflyError` carrying a
//! machine-readable `ErrorCode`, a human message, the HTTP status when the
//! server answered, and an optional diagnostic context. Lifecycle errors
//! (`AlreadyInitialized`, `MissingApiKey`, `NotInitialized`) come from the
//! instance store; `Api` and `Network` come from the fetch layer.

use std::fmt;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PlumiflyError>;

/// Machine-readable classification of a `PlumiflyError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    AlreadyInitialized,
    MissingApiKey,
    NotInitialized,
    InvalidBaseUrl,
    EmptyIdentifier,
    InvalidIdentifier,
    /// The server answered with a non-success status.
    Api(u16),
    /// The request never produced a usable response.
    Network,
}

impl ErrorCode {
    /// Wire string for this code, e.g. `NOT_INITIALIZED` or `API_ERROR_404`.
    pub fn as_str(&self) -> std::borrow::Cow<'static, str> {
        match self {
            ErrorCode::AlreadyInitialized => "ALREADY_INITIALIZED".into(),
            ErrorCode::MissingApiKey => "MISSING_API_KEY".into(),
            ErrorCode::NotInitialized => "NOT_INITIALIZED".into(),
            ErrorCode::InvalidBaseUrl => "INVALID_BASE_URL".into(),
            ErrorCode::EmptyIdentifier => "EMPTY_IDENTIFIER".into(),
            ErrorCode::InvalidIdentifier => "INVALID_IDENTIFIER".into(),
            ErrorCode::Api(status) => format!("API_ERROR_{status}").into(),
            ErrorCode::Network => "NETWORK_ERROR".into(),
        }
    }

    /// True for failures reported by the fetch layer rather than by the
    /// configuration lifecycle.
    pub fn is_request_failure(&self) -> bool {
        matches!(self, ErrorCode::Api(_) | ErrorCode::Network)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

/// Diagnostic payload attached to a failure.
#[derive(Debug, Error)]
pub enum ErrorContext {
    /// The parsed body of an error response.
    #[error("response body: {0}")]
    Body(serde_json::Value),

    /// The raw failure caught from the transport or the JSON decoder.
    #[error("transport failure")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// The structured error returned by every fallible operation.
///
/// Created at the failure site and never mutated afterwards.
#[derive(Debug, Error)]
#[error("{code}: {message}")]
pub struct PlumiflyError {
    code: ErrorCode,
    message: String,
    status: Option<u16>,
    #[source]
    context: Option<ErrorContext>,
}

impl PlumiflyError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            context: None,
        }
    }

    pub(crate) fn already_initialized() -> Self {
        Self::new(
            ErrorCode::AlreadyInitialized,
            "Plumifly has already been initialized",
        )
    }

    pub(crate) fn missing_api_key() -> Self {
        Self::new(ErrorCode::MissingApiKey, "API key is required")
    }

    pub(crate) fn not_initialized(message: &str) -> Self {
        Self::new(ErrorCode::NotInitialized, message)
    }

    /// A non-success response. The message comes from the body's `message`
    /// field when there is one.
    pub(crate) fn api(status: u16, body: serde_json::Value) -> Self {
        let message = body
            .get("message")
            .and_then(|m| m.as_str())
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Request failed with status {status}"));
        Self {
            code: ErrorCode::Api(status),
            message,
            status: Some(status),
            context: Some(ErrorContext::Body(body)),
        }
    }

    /// A transport or decoding failure with no server-assigned status.
    pub(crate) fn network<E>(source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let source = source.into();
        let description = source.to_string();
        let message = if description.is_empty() {
            "Network request failed".to_string()
        } else {
            description
        };
        Self {
            code: ErrorCode::Network,
            message,
            status: None,
            context: Some(ErrorContext::Transport(source)),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn context(&self) -> Option<&ErrorContext> {
        self.context.as_ref()
    }
}
