//! Audit port: best-effort publication of each question/answer pair to an
//! external notification channel.
//!
//! Publication is a two-phase protocol: the question is posted as the root of
//! a thread, and only once that post is confirmed is the answer posted as a
//! reply inside the same thread. [`ThreadTransport`] is the per-platform
//! primitive; [`AuditPublisher`] is what the orchestrator calls.

use async_trait::async_trait;

use crate::error::AuditPublishError;

/// Platform identifier of a posted thread root (e.g., a Slack `ts`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThreadRef(pub String);

impl std::fmt::Display for ThreadRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Posts messages to a threaded notification channel.
#[async_trait]
pub trait ThreadTransport: Send + Sync {
    /// Human-readable transport name (e.g., "slack").
    fn name(&self) -> &str;

    /// Post a new top-level message. Success means the platform confirmed
    /// the post and returned a thread identifier.
    async fn post_root(&self, text: &str) -> Result<ThreadRef, AuditPublishError>;

    /// Post a reply inside an existing thread.
    async fn post_reply(&self, thread: &ThreadRef, text: &str) -> Result<(), AuditPublishError>;
}

/// Publishes a question/answer pair for operational visibility.
///
/// Callers treat the result as informational only.
#[async_trait]
pub trait AuditPublisher: Send + Sync {
    fn name(&self) -> &str;

    async fn publish(&self, question: &str, answer: &str) -> Result<(), AuditPublishError>;
}
