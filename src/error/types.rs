//! Error type definitions
//!
//! Every protocol step returns [`Result`]; the public entry points of the
//! clients fold an [`Error`] into a failed result object via [`Error::kind`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the portal protocol clients
#[derive(Error, Debug)]
pub enum Error {
    /// A server-issued token needed for a purchase attempt was missing
    #[error("Purchase requirements unavailable: {missing}")]
    RequirementsUnavailable { missing: String },

    /// Manual mode with a number-set count that differs from the ticket count
    #[error("Invalid manual set count: expected {expected}, got {actual}")]
    InvalidManualSetCount { expected: usize, actual: usize },

    /// The purchase intent or one of its number sets violates its contract
    #[error("Invalid purchase intent: {0}")]
    InvalidIntent(String),

    /// The partner site returned an empty or non-JSON body
    #[error("Malformed response from {context}")]
    MalformedResponse { context: String, raw: String },

    /// An envelope string could not be decoded
    #[error("Envelope decode error: {0}")]
    EnvelopeDecode(String),

    /// The auto-selection exchange did not yield a ticket number
    #[error("Auto number unavailable")]
    AutoNumberUnavailable { raw: String },

    /// The order exchange did not yield an order number and date
    #[error("Order unavailable")]
    OrderUnavailable { raw: String },

    /// An expected HTML anchor was missing
    #[error("Extraction error: anchor {anchor} not found")]
    Extraction { anchor: String },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network/HTTP client errors
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

/// Stable discriminant reported to the notification layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    RequirementsUnavailable,
    InvalidManualSetCount,
    InvalidIntent,
    MalformedResponse,
    EnvelopeDecodeError,
    AutoNumberUnavailable,
    OrderUnavailable,
    ExtractionError,
    Transport,
    Internal,
}

impl Error {
    /// Create a requirements-unavailable error naming the missing token
    pub fn requirements(missing: impl Into<String>) -> Self {
        Self::RequirementsUnavailable {
            missing: missing.into(),
        }
    }

    /// Create an invalid intent error
    pub fn invalid_intent(msg: impl Into<String>) -> Self {
        Self::InvalidIntent(msg.into())
    }

    /// Create a malformed response error keeping the raw body
    pub fn malformed(context: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::MalformedResponse {
            context: context.into(),
            raw: raw.into(),
        }
    }

    /// Create an envelope decode error
    pub fn envelope(msg: impl Into<String>) -> Self {
        Self::EnvelopeDecode(msg.into())
    }

    /// Create an extraction error for a missing anchor
    pub fn extraction(anchor: impl Into<String>) -> Self {
        Self::Extraction {
            anchor: anchor.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Classify this error for a failed result object
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RequirementsUnavailable { .. } => ErrorKind::RequirementsUnavailable,
            Self::InvalidManualSetCount { .. } => ErrorKind::InvalidManualSetCount,
            Self::InvalidIntent(_) => ErrorKind::InvalidIntent,
            Self::MalformedResponse { .. } | Self::Json(_) => ErrorKind::MalformedResponse,
            Self::EnvelopeDecode(_) => ErrorKind::EnvelopeDecodeError,
            Self::AutoNumberUnavailable { .. } => ErrorKind::AutoNumberUnavailable,
            Self::OrderUnavailable { .. } => ErrorKind::OrderUnavailable,
            Self::Extraction { .. } => ErrorKind::ExtractionError,
            Self::Network(_) | Self::Io(_) => ErrorKind::Transport,
            Self::Config(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Raw server text attached to the error, if any
    pub fn raw_body(&self) -> Option<&str> {
        match self {
            Self::MalformedResponse { raw, .. }
            | Self::AutoNumberUnavailable { raw }
            | Self::OrderUnavailable { raw } => Some(raw),
            _ => None,
        }
    }
}
