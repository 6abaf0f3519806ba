//! Error types for MNS client operations.
//!
//! This module defines the error taxonomy used throughout the client, with
//! proper classification for retry logic and the original server error code
//! preserved for diagnostics.

use std::time::Duration;

use thiserror::Error;

/// Comprehensive error type for all MNS operations.
///
/// All variants carry owned string payloads so that promise handles can store
/// a terminal error and still hand out copies to late observers.
#[derive(Debug, Clone, Error)]
pub enum MnsError {
    /// Network-level failure before a reply was received (retryable).
    #[error("Transport failure: {message}")]
    Transport { message: String },

    /// The request exceeded the configured read timeout (retryable).
    #[error("Request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The server replied with a payload the codec could not interpret.
    ///
    /// Non-retryable; indicates protocol drift between client and service.
    #[error("Malformed reply: {message}")]
    Parse { message: String },

    /// The server returned a structured business error.
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// A request failed client-side validation; no network call was made.
    #[error("Invalid argument for {field}: {message}")]
    InvalidArgument { field: String, message: String },
}

impl MnsError {
    /// Check if this error represents a transient condition that may succeed
    /// if retried.
    ///
    /// Transient conditions include:
    /// - Network failures and timeouts
    /// - Server-side throttling
    /// - Internal service errors
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Timeout { .. } => true,
            Self::Parse { .. } => false,
            Self::Service(error) => error.is_transient(),
            Self::InvalidArgument { .. } => false,
        }
    }

    /// Determine if this error should trigger a retry attempt.
    ///
    /// Alias for `is_transient()` to support different retry policy
    /// conventions.
    pub fn should_retry(&self) -> bool {
        self.is_transient()
    }

    /// Get the recommended retry delay for this error.
    ///
    /// Returns `Some(Duration)` if a specific delay is recommended (e.g.
    /// throttling), or `None` to use the configured backoff policy.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Service(error) if error.code == ServiceErrorCode::Throttled => {
                Some(Duration::from_secs(1))
            }
            Self::Transport { .. } => Some(Duration::from_secs(5)),
            _ => None,
        }
    }
}

// ============================================================================
// Service Errors
// ============================================================================

/// A structured error returned by the service on a non-success status code.
///
/// The wire body carries an error code, a human readable message, and the
/// request id assigned by the server; all three are preserved here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code} ({status}): {message}")]
pub struct ServiceError {
    /// Classified error code.
    pub code: ServiceErrorCode,
    /// Server-provided description.
    pub message: String,
    /// Request id assigned by the server, when present.
    pub request_id: Option<String>,
    /// HTTP status code of the reply.
    pub status: u16,
}

impl ServiceError {
    /// Check if this service error is transient.
    pub fn is_transient(&self) -> bool {
        self.code.is_transient()
    }
}

/// Classified service error codes.
///
/// Codes outside the known set are preserved verbatim in `Unrecognized` so
/// callers can still match on the raw wire code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceErrorCode {
    QueueAlreadyExists,
    QueueNotExist,
    TopicAlreadyExists,
    TopicNotExist,
    SubscriptionAlreadyExists,
    SubscriptionNotExist,
    MessageNotExist,
    InvalidReceiptHandle,
    InvalidArgument,
    AccessDenied,
    Throttled,
    InternalError,
    Unrecognized(String),
}

impl ServiceErrorCode {
    /// Classify a wire-level error code string.
    pub fn from_code(code: &str) -> Self {
        match code {
            "QueueAlreadyExist" => Self::QueueAlreadyExists,
            "QueueNotExist" => Self::QueueNotExist,
            "TopicAlreadyExist" => Self::TopicAlreadyExists,
            "TopicNotExist" => Self::TopicNotExist,
            "SubscriptionAlreadyExist" => Self::SubscriptionAlreadyExists,
            "SubscriptionNotExist" => Self::SubscriptionNotExist,
            "MessageNotExist" => Self::MessageNotExist,
            "ReceiptHandleError" | "ReceiptHandleInvalid" => Self::InvalidReceiptHandle,
            "InvalidArgument" => Self::InvalidArgument,
            "AccessDenied" => Self::AccessDenied,
            "Throttled" => Self::Throttled,
            "InternalError" => Self::InternalError,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// Check if this error code represents a transient condition.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::QueueAlreadyExists => false,
            Self::QueueNotExist => false,
            Self::TopicAlreadyExists => false,
            Self::TopicNotExist => false,
            Self::SubscriptionAlreadyExists => false,
            Self::SubscriptionNotExist => false,
            Self::MessageNotExist => false,
            Self::InvalidReceiptHandle => false,
            Self::InvalidArgument => false,
            Self::AccessDenied => false,
            Self::Throttled => true,
            Self::InternalError => true,
            Self::Unrecognized(_) => false,
        }
    }
}

impl std::fmt::Display for ServiceErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            Self::QueueAlreadyExists => "QueueAlreadyExist",
            Self::QueueNotExist => "QueueNotExist",
            Self::TopicAlreadyExists => "TopicAlreadyExist",
            Self::TopicNotExist => "TopicNotExist",
            Self::SubscriptionAlreadyExists => "SubscriptionAlreadyExist",
            Self::SubscriptionNotExist => "SubscriptionNotExist",
            Self::MessageNotExist => "MessageNotExist",
            Self::InvalidReceiptHandle => "ReceiptHandleError",
            Self::InvalidArgument => "InvalidArgument",
            Self::AccessDenied => "AccessDenied",
            Self::Throttled => "Throttled",
            Self::InternalError => "InternalError",
            Self::Unrecognized(code) => code.as_str(),
        };
        write!(f, "{}", code)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
