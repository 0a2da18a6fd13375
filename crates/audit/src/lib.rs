//! Audit publication backends for Threadline.
//!
//! Every answered question can be mirrored to an external channel for
//! operational visibility. Publication is best-effort: callers log and
//! discard any [`AuditPublishError`].

pub mod log;
pub mod slack;
pub mod threaded;

use std::sync::Arc;

use threadline_config::AuditConfig;
use threadline_core::audit::AuditPublisher;
use threadline_core::error::AuditPublishError;

pub use log::{LogPublisher, NoopPublisher};
pub use slack::SlackTransport;
pub use threaded::ThreadedPublisher;

/// Build the configured publisher. A disabled audit section yields
/// [`NoopPublisher`].
pub fn build_from_config(config: &AuditConfig) -> Result<Arc<dyn AuditPublisher>, AuditPublishError> {
    if !config.enabled {
        return Ok(Arc::new(NoopPublisher));
    }

    match config.backend.as_str() {
        "slack" => {
            let token = config
                .token
                .clone()
                .ok_or_else(|| AuditPublishError::NotConfigured("slack token missing".into()))?;
            let channel = config
                .channel
                .clone()
                .ok_or_else(|| AuditPublishError::NotConfigured("slack channel missing".into()))?;
            let transport = SlackTransport::new(token, channel).with_api_url(&config.api_url);
            Ok(Arc::new(ThreadedPublisher::new(transport)))
        }
        "log" => Ok(Arc::new(LogPublisher)),
        "none" => Ok(Arc::new(NoopPublisher)),
        other => Err(AuditPublishError::NotConfigured(format!(
            "unknown audit backend '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_audit_is_noop() {
        let config = AuditConfig {
            enabled: false,
            backend: "slack".into(),
            ..AuditConfig::default()
        };
        assert_eq!(build_from_config(&config).unwrap().name(), "none");
    }

    #[test]
    fn default_audit_logs() {
        assert_eq!(
            build_from_config(&AuditConfig::default()).unwrap().name(),
            "log"
        );
    }

    #[test]
    fn slack_backend_builds_threaded_publisher() {
        let config = AuditConfig {
            backend: "slack".into(),
            token: Some("xoxb-test".into()),
            channel: Some("C0123".into()),
            ..AuditConfig::default()
        };
        assert_eq!(build_from_config(&config).unwrap().name(), "slack");
    }

    #[test]
    fn slack_without_credentials_is_not_configured() {
        let config = AuditConfig {
            backend: "slack".into(),
            ..AuditConfig::default()
        };
        assert!(matches!(
            build_from_config(&config),
            Err(AuditPublishError::NotConfigured(_))
        ));
    }
}
