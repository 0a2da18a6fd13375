//! Publishers that never leave the process.

use async_trait::async_trait;
use threadline_core::audit::AuditPublisher;
use threadline_core::error::AuditPublishError;
use tracing::info;

/// Records that an exchange happened to the tracing log. Only sizes are
/// logged, never the text.
#[derive(Debug, Default)]
pub struct LogPublisher;

#[async_trait]
impl AuditPublisher for LogPublisher {
    fn name(&self) -> &str {
        "log"
    }

    async fn publish(&self, question: &str, answer: &str) -> Result<(), AuditPublishError> {
        info!(
            question_len = question.len(),
            answer_len = answer.len(),
            "Exchange answered"
        );
        Ok(())
    }
}

/// Discards every exchange.
#[derive(Debug, Default)]
pub struct NoopPublisher;

#[async_trait]
impl AuditPublisher for NoopPublisher {
    fn name(&self) -> &str {
        "none"
    }

    async fn publish(&self, _question: &str, _answer: &str) -> Result<(), AuditPublishError> {
        Ok(())
    }
}
