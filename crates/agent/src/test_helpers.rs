//! Shared scripted ports for orchestrator tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use threadline_core::audit::AuditPublisher;
use threadline_core::error::{AuditPhase, AuditPublishError, GenerationError, RetrievalError};
use threadline_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use threadline_core::retrieval::{RetrievedPassage, Retriever};

/// A mock provider that returns a sequence of scripted outcomes.
///
/// Each call to `complete` returns the next outcome in the queue and records
/// the request. Panics if more calls are made than outcomes provided.
pub struct SequentialMockProvider {
    outcomes: Mutex<Vec<Result<String, GenerationError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
    delay: Option<Duration>,
}

impl SequentialMockProvider {
    pub fn new(outcomes: Vec<Result<String, GenerationError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Create a provider that answers with each text in turn.
    pub fn answers(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn failing(err: GenerationError) -> Self {
        Self::new(vec![Err(err)])
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, GenerationError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len() - 1
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let outcome = {
            let outcomes = self.outcomes.lock().unwrap();
            if call >= outcomes.len() {
                panic!(
                    "SequentialMockProvider: no more responses (call #{}, have {})",
                    call,
                    outcomes.len()
                );
            }
            outcomes[call].clone()
        };

        outcome.map(|text| make_text_response(&text))
    }
}

/// Create a simple text response.
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        content: text.to_string(),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Returns the same passages (or error) for every query and records queries.
pub struct FixedRetriever {
    outcome: Result<Vec<RetrievedPassage>, RetrievalError>,
    queries: Mutex<Vec<(String, usize)>>,
    delay: Option<Duration>,
}

impl FixedRetriever {
    pub fn new(passages: Vec<RetrievedPassage>) -> Self {
        Self {
            outcome: Ok(passages),
            queries: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn failing(err: RetrievalError) -> Self {
        Self {
            outcome: Err(err),
            queries: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Retriever for FixedRetriever {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievedPassage>, RetrievalError> {
        self.queries.lock().unwrap().push((query.to_string(), k));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome
            .clone()
            .map(|mut passages| {
                passages.truncate(k);
                passages
            })
    }
}

/// Records published exchanges; can be scripted to fail or stall.
#[derive(Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<(String, String)>>,
    fail: bool,
    delay: Option<Duration>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn published(&self) -> Vec<(String, String)> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditPublisher for RecordingPublisher {
    fn name(&self) -> &str {
        "recording"
    }

    async fn publish(&self, question: &str, answer: &str) -> Result<(), AuditPublishError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(AuditPublishError::Rejected {
                phase: AuditPhase::Question,
                reason: "channel_not_found".into(),
            });
        }
        self.published
            .lock()
            .unwrap()
            .push((question.to_string(), answer.to_string()));
        Ok(())
    }
}
