//! Slack transport over the Web API `chat.postMessage` method.
//!
//! A root post is confirmed only when Slack answers HTTP 200 with
//! `"ok": true` and a message timestamp; that timestamp is the thread id
//! replies are posted under (`thread_ts`).

use async_trait::async_trait;
use serde::Deserialize;
use threadline_core::audit::{ThreadRef, ThreadTransport};
use threadline_core::error::{AuditPhase, AuditPublishError};
use tracing::debug;

const DEFAULT_API_URL: &str = "https://slack.com/api";

/// Posts audit messages to one Slack channel with a bot token.
pub struct SlackTransport {
    api_url: String,
    token: String,
    channel: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for SlackTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackTransport")
            .field("api_url", &self.api_url)
            .field("token", &"[REDACTED]")
            .field("channel", &self.channel)
            .finish()
    }
}

impl SlackTransport {
    pub fn new(token: impl Into<String>, channel: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            api_url: DEFAULT_API_URL.into(),
            token: token.into(),
            channel: channel.into(),
            client,
        }
    }

    /// Override the Web API base URL (for testing or proxies).
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn post_message(
        &self,
        phase: AuditPhase,
        text: &str,
        thread_ts: Option<&str>,
    ) -> Result<PostMessageResponse, AuditPublishError> {
        let url = format!("{}/chat.postMessage", self.api_url);

        let mut payload = serde_json::json!({
            "channel": self.channel,
            "text": text,
        });
        if let Some(ts) = thread_ts {
            payload["thread_ts"] = serde_json::json!(ts);
        }

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .json(&payload)
            .send()
            .await
            .map_err(|e| AuditPublishError::DeliveryFailed {
                phase,
                reason: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(AuditPublishError::DeliveryFailed {
                phase,
                reason: format!("HTTP {status}"),
            });
        }

        let body: PostMessageResponse =
            response
                .json()
                .await
                .map_err(|e| AuditPublishError::DeliveryFailed {
                    phase,
                    reason: format!("unreadable response: {e}"),
                })?;

        if !body.ok {
            return Err(AuditPublishError::Rejected {
                phase,
                reason: body.error.clone().unwrap_or_else(|| "unknown_error".into()),
            });
        }

        debug!(%phase, channel = %self.channel, "Slack accepted message");
        Ok(body)
    }
}

#[async_trait]
impl ThreadTransport for SlackTransport {
    fn name(&self) -> &str {
        "slack"
    }

    async fn post_root(&self, text: &str) -> Result<ThreadRef, AuditPublishError> {
        let body = self.post_message(AuditPhase::Question, text, None).await?;
        body.thread_ts()
            .map(ThreadRef)
            .ok_or_else(|| AuditPublishError::Rejected {
                phase: AuditPhase::Question,
                reason: "response carried no message timestamp".into(),
            })
    }

    async fn post_reply(&self, thread: &ThreadRef, text: &str) -> Result<(), AuditPublishError> {
        self.post_message(AuditPhase::Answer, text, Some(&thread.0))
            .await
            .map(|_| ())
    }
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    ts: Option<String>,
    #[serde(default)]
    message: Option<PostedMessage>,
}

#[derive(Debug, Deserialize)]
struct PostedMessage {
    #[serde(default)]
    ts: Option<String>,
}

impl PostMessageResponse {
    fn thread_ts(self) -> Option<String> {
        self.message.and_then(|m| m.ts).or(self.ts)
    }
}
