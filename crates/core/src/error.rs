//! Unified error types for the coordination core.
//!
//! Every remote failure collapses into one [`ErrorKind`]. The kind is what
//! search and popular state carry; [`FetchError`] is what collaborators return.

use serde::{Deserialize, Serialize};

/// Classification of a remote failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No network connectivity.
    Offline,
    /// The backing store is unreachable or overloaded.
    ServiceUnavailable,
    /// The caller is not allowed to read or write the resource.
    PermissionDenied,
    /// The requested resource does not exist.
    NotFound,
    /// Anything else.
    Unknown,
}

impl ErrorKind {
    /// Classify a document-store status code (e.g. `"permission-denied"`).
    ///
    /// Matching is case-insensitive and accepts both `-` and `_` separators.
    pub fn from_remote_code(code: &str) -> Self {
        let normalized = code.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "offline" | "network-error" => ErrorKind::Offline,
            "unavailable" | "deadline-exceeded" | "resource-exhausted" | "aborted" => ErrorKind::ServiceUnavailable,
            "permission-denied" | "unauthenticated" => ErrorKind::PermissionDenied,
            "not-found" => ErrorKind::NotFound,
            _ => ErrorKind::Unknown,
        }
    }

    /// Whether a retry affordance makes sense for this kind.
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::Offline | ErrorKind::ServiceUnavailable | ErrorKind::Unknown)
    }
}

/// Failure returned by fetch and persistence collaborators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// No network connectivity.
    #[error("OFFLINE: {0}")]
    Offline(String),

    /// The backing store is unreachable or overloaded.
    #[error("SERVICE_UNAVAILABLE: {0}")]
    ServiceUnavailable(String),

    /// The caller is not allowed to access the resource.
    #[error("PERMISSION_DENIED: {0}")]
    PermissionDenied(String),

    /// The resource does not exist.
    #[error("NOT_FOUND: {0}")]
    NotFound(String),

    /// Unclassified failure.
    #[error("UNKNOWN: {0}")]
    Unknown(String),
}

impl FetchError {
    /// Build an error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::Offline => FetchError::Offline(message),
            ErrorKind::ServiceUnavailable => FetchError::ServiceUnavailable(message),
            ErrorKind::PermissionDenied => FetchError::PermissionDenied(message),
            ErrorKind::NotFound => FetchError::NotFound(message),
            ErrorKind::Unknown => FetchError::Unknown(message),
        }
    }

    /// Build an error from a document-store status code and message.
    pub fn from_remote(code: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::from_remote_code(code), message)
    }

    /// The kind carried into search/popular state.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Offline(_) => ErrorKind::Offline,
            FetchError::ServiceUnavailable(_) => ErrorKind::ServiceUnavailable,
            FetchError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            FetchError::NotFound(_) => ErrorKind::NotFound,
            FetchError::Unknown(_) => ErrorKind::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FetchError::NotFound("promo abc123".to_string());
        assert!(err.to_string().contains("NOT_FOUND"));
        assert!(err.to_string().contains("abc123"));
    }

    #[test]
    fn test_kind_roundtrips_through_new() {
        for kind in [
            ErrorKind::Offline,
            ErrorKind::ServiceUnavailable,
            ErrorKind::PermissionDenied,
            ErrorKind::NotFound,
            ErrorKind::Unknown,
        ] {
            assert_eq!(FetchError::new(kind, "x").kind(), kind);
        }
    }

    #[test]
    fn test_from_remote_code() {
        assert_eq!(ErrorKind::from_remote_code("unavailable"), ErrorKind::ServiceUnavailable);
        assert_eq!(ErrorKind::from_remote_code("DEADLINE_EXCEEDED"), ErrorKind::ServiceUnavailable);
        assert_eq!(ErrorKind::from_remote_code("permission-denied"), ErrorKind::PermissionDenied);
        assert_eq!(ErrorKind::from_remote_code("unauthenticated"), ErrorKind::PermissionDenied);
        assert_eq!(ErrorKind::from_remote_code("not_found"), ErrorKind::NotFound);
        assert_eq!(ErrorKind::from_remote_code("offline"), ErrorKind::Offline);
        assert_eq!(ErrorKind::from_remote_code("data-loss"), ErrorKind::Unknown);
    }

    #[test]
    fn test_retryable() {
        assert!(ErrorKind::Offline.is_retryable());
        assert!(ErrorKind::ServiceUnavailable.is_retryable());
        assert!(!ErrorKind::PermissionDenied.is_retryable());
        assert!(!ErrorKind::NotFound.is_retryable());
    }
}
