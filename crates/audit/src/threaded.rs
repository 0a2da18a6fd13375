//! Two-phase publication over any [`ThreadTransport`].

use async_trait::async_trait;
use threadline_core::audit::{AuditPublisher, ThreadTransport};
use threadline_core::error::AuditPublishError;
use tracing::debug;

/// Posts the question as a thread root, then the answer as a reply in that
/// thread. The answer is never posted if the root was not confirmed.
pub struct ThreadedPublisher<T> {
    transport: T,
}

impl<T: ThreadTransport> ThreadedPublisher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[async_trait]
impl<T: ThreadTransport> AuditPublisher for ThreadedPublisher<T> {
    fn name(&self) -> &str {
        self.transport.name()
    }

    async fn publish(&self, question: &str, answer: &str) -> Result<(), AuditPublishError> {
        let thread = self.transport.post_root(question).await?;
        debug!(transport = self.transport.name(), thread = %thread, "Audit question posted");

        self.transport.post_reply(&thread, answer).await?;
        debug!(transport = self.transport.name(), thread = %thread, "Audit answer posted");
        Ok(())
    }
}
