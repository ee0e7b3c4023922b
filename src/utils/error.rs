//! Error handling module
//!
//! Defines the normalized API error returned by every gateway call and the
//! setup errors raised while building the gateway

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message used when the backend answered without a usable `message` field
///
/// Vietnamese for "An error occurred", localized like
/// [`CONNECTIVITY_ERROR_MESSAGE`] since both reach storefront users as-is.
pub const GENERIC_ERROR_MESSAGE: &str = "Đã xảy ra lỗi.";

/// Message used when no response reached the caller at all
pub const CONNECTIVITY_ERROR_MESSAGE: &str = "Không thể kết nối đến máy chủ.";

/// Status attached to connectivity failures
pub const CONNECTIVITY_SENTINEL_STATUS: u16 = 500;

/// Normalized failure of a single remote call
///
/// Every gateway operation resolves to the unwrapped data or to exactly one
/// of these variants. Raw transport errors never escape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The backend answered with an error status and a `message` field
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The backend answered but gave no parseable message
    #[error("Đã xảy ra lỗi.")]
    RejectedWithoutMessage { status: u16 },

    /// No response was received (DNS, refused connection, timeout)
    #[error("Không thể kết nối đến máy chủ.")]
    Unreachable { reason: String },
}

/// Failure category, one per tier of the fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    StructuredWithMessage,
    StructuredWithoutMessage,
    Connectivity,
}

/// Serialized form of an [`ApiError`]: `{ "message": ..., "status"?: ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedError {
    /// Sentinel status, present only for connectivity failures
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status: Option<u16>,
    /// Human-readable, localized message
    pub message: String,
}

impl ApiError {
    /// Classify an error response body
    ///
    /// A JSON object with a string `message` keeps that message verbatim,
    /// anything else falls back to the generic message.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                value
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            });

        match message {
            Some(message) => ApiError::Rejected { status, message },
            None => ApiError::RejectedWithoutMessage { status },
        }
    }

    /// Build a connectivity failure
    pub fn unreachable(reason: impl Into<String>) -> Self {
        ApiError::Unreachable { reason: reason.into() }
    }

    /// Localized message shown to the user
    pub fn message(&self) -> &str {
        match self {
            ApiError::Rejected { message, .. } => message,
            ApiError::RejectedWithoutMessage { .. } => GENERIC_ERROR_MESSAGE,
            ApiError::Unreachable { .. } => CONNECTIVITY_ERROR_MESSAGE,
        }
    }

    /// Status carried by the normalized shape
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unreachable { .. } => Some(CONNECTIVITY_SENTINEL_STATUS),
            _ => None,
        }
    }

    /// HTTP status actually received from the backend, if any
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } | ApiError::RejectedWithoutMessage { status } => {
                Some(*status)
            }
            ApiError::Unreachable { .. } => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Rejected { .. } => ErrorKind::StructuredWithMessage,
            ApiError::RejectedWithoutMessage { .. } => ErrorKind::StructuredWithoutMessage,
            ApiError::Unreachable { .. } => ErrorKind::Connectivity,
        }
    }

    /// Whether a response reached the caller
    pub fn is_connectivity(&self) -> bool {
        matches!(self, ApiError::Unreachable { .. })
    }

    /// Convert to the uniform `{message, status?}` shape
    pub fn to_normalized(&self) -> NormalizedError {
        NormalizedError {
            status: self.status(),
            message: self.message().to_string(),
        }
    }
}

impl From<ApiError> for NormalizedError {
    fn from(error: ApiError) -> Self {
        error.to_normalized()
    }
}

/// Result type of every gateway call
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors raised while setting up the gateway, outside any remote call
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Route file could not be parsed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Route template rejected
    #[error("Invalid route: {0}")]
    InvalidRoute(String),
}

/// Result type alias for setup operations
pub type AppResult<T> = Result<T, AppError>;
