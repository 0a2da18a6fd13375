//! Error types for the Threadline domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each port has its own error enum; the top-level [`Error`] is what a
//! failed query surfaces to the caller.
//!
//! [`AuditPublishError`] is intentionally not convertible into [`Error`]:
//! audit failures are recorded and swallowed at the orchestration boundary.

use serde::Serialize;
use thiserror::Error;

/// The error returned by a failed query.
#[derive(Debug, Error)]
pub enum Error {
    // --- Session state ---
    #[error("State decode error: {0}")]
    StateDecode(#[from] StateDecodeError),

    // --- Retrieval port ---
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    // --- Generation port ---
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Stable, transport-agnostic classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    StateDecode,
    Retrieval,
    Generation,
    Config,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StateDecode => "state_decode",
            Self::Retrieval => "retrieval",
            Self::Generation => "generation",
            Self::Config => "config",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::StateDecode(_) => ErrorKind::StateDecode,
            Self::Retrieval(_) => ErrorKind::Retrieval,
            Self::Generation(_) => ErrorKind::Generation,
            Self::Config { .. } => ErrorKind::Config,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether the caller may retry the same request with the same prior state.
    ///
    /// A token that failed to decode will fail again; backend failures may not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retrieval(_) | Self::Generation(_))
    }

    /// Whether the failure was caused by the request-level deadline expiring.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Retrieval(RetrievalError::Timeout(_)) | Self::Generation(GenerationError::Timeout(_))
        )
    }
}

// --- Bounded context errors ---

/// A prior-state token could not be turned back into a conversation history.
///
/// Messages never echo the token's contents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateDecodeError {
    #[error("malformed state token: {0}")]
    Malformed(String),

    #[error("unsupported state token version")]
    UnsupportedVersion,

    #[error("state token signature rejected: {0}")]
    Signature(String),

    #[error("state token payload is not a valid history")]
    InvalidPayload,

    #[error("state token history violates turn order: {0}")]
    InvalidSequence(String),
}

#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    #[error("Vector store unavailable: {0}")]
    Unavailable(String),

    #[error("Similarity query failed: {0}")]
    QueryFailed(String),

    #[error("Query embedding failed: {0}")]
    EmbeddingFailed(String),

    #[error("Retrieval timed out: {0}")]
    Timeout(String),
}

#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Malformed completion: {0}")]
    InvalidOutput(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failure of either phase of the audit protocol.
#[derive(Debug, Clone, Error)]
pub enum AuditPublishError {
    #[error("Audit channel not configured: {0}")]
    NotConfigured(String),

    #[error("Audit {phase} delivery failed: {reason}")]
    DeliveryFailed { phase: AuditPhase, reason: String },

    #[error("Audit {phase} rejected by channel: {reason}")]
    Rejected { phase: AuditPhase, reason: String },
}

impl AuditPublishError {
    /// The phase that failed, when the failure happened mid-protocol.
    pub fn phase(&self) -> Option<AuditPhase> {
        match self {
            Self::NotConfigured(_) => None,
            Self::DeliveryFailed { phase, .. } | Self::Rejected { phase, .. } => Some(*phase),
        }
    }
}

/// The two steps of a threaded audit publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditPhase {
    /// Posting the question as the thread root.
    Question,
    /// Posting the answer as a reply in that thread.
    Answer,
}

impl std::fmt::Display for AuditPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Question => f.write_str("question"),
            Self::Answer => f.write_str("answer"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_error_displays_correctly() {
        let err = Error::Generation(GenerationError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
        assert_eq!(err.kind(), ErrorKind::Generation);
    }

    #[test]
    fn state_decode_is_not_retryable() {
        let err: Error = StateDecodeError::Malformed("bad base64".into()).into();
        assert_eq!(err.kind(), ErrorKind::StateDecode);
        assert!(!err.is_retryable());
    }

    #[test]
    fn backend_failures_are_retryable() {
        let retrieval: Error = RetrievalError::Unavailable("connection refused".into()).into();
        let generation: Error = GenerationError::Network("reset".into()).into();
        assert!(retrieval.is_retryable());
        assert!(generation.is_retryable());
    }

    #[test]
    fn timeouts_are_detected_per_port() {
        let err: Error = RetrievalError::Timeout("deadline".into()).into();
        assert!(err.is_timeout());
        let err: Error = GenerationError::RateLimited { retry_after_secs: 5 }.into();
        assert!(!err.is_timeout());
    }

    #[test]
    fn audit_error_names_phase() {
        let err = AuditPublishError::Rejected {
            phase: AuditPhase::Answer,
            reason: "thread_not_found".into(),
        };
        assert!(err.to_string().contains("answer"));
        assert!(err.to_string().contains("thread_not_found"));
        assert_eq!(err.phase(), Some(AuditPhase::Answer));
        assert_eq!(AuditPublishError::NotConfigured("x".into()).phase(), None);
    }

    #[test]
    fn error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::StateDecode).unwrap();
        assert_eq!(json, "\"state_decode\"");
        assert_eq!(ErrorKind::Retrieval.to_string(), "retrieval");
    }
}
