//! The query orchestrator: one stateless request/response cycle.
//!
//! ```text
//! Decoding -> Retrieving -> Assembling -> Generating -> Updating -> Auditing -> Responding
//! ```
//!
//! Decoding, retrieving and generating can fail; any failure ends the request
//! with no partial response and leaves the caller's prior state valid.
//! Auditing never fails the request.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use threadline_config::{AppConfig, AuditMode};
use threadline_core::audit::AuditPublisher;
use threadline_core::error::{Error, GenerationError, Result, RetrievalError};
use threadline_core::provider::{Provider, ProviderRequest};
use threadline_core::retrieval::Retriever;
use threadline_core::state::{StateCodec, StateToken};
use tokio::time::{Instant, timeout_at};
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::prompt::PromptAssembler;

/// A single question from a caller.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub question: String,

    /// Token from the previous response; `None` starts a new conversation
    pub prior_state: Option<StateToken>,

    /// Skip audit publication. Retrieval and generation still run.
    pub suppress_audit: bool,
}

impl QueryRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            prior_state: None,
            suppress_audit: false,
        }
    }

    pub fn with_prior_state(mut self, state: StateToken) -> Self {
        self.prior_state = Some(state);
        self
    }

    pub fn suppress_audit(mut self, suppress: bool) -> Self {
        self.suppress_audit = suppress;
        self
    }
}

/// The answer plus the token the caller must send with its next question.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub answer: String,
    pub next_state: StateToken,
    /// Source ids of the passages the answer was grounded on, in retrieval order
    pub sources: Vec<String>,
}

/// Pipeline stages, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStage {
    Decoding,
    Retrieving,
    Assembling,
    Generating,
    Updating,
    Auditing,
    Responding,
}

impl QueryStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Decoding => "decoding",
            Self::Retrieving => "retrieving",
            Self::Assembling => "assembling",
            Self::Generating => "generating",
            Self::Updating => "updating",
            Self::Auditing => "auditing",
            Self::Responding => "responding",
        }
    }
}

impl std::fmt::Display for QueryStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generation and pipeline knobs.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    /// Passages requested from the retriever per question
    pub top_k: usize,
    /// Deadline shared by retrieval and generation
    pub timeout: Duration,
    pub audit_mode: AuditMode,
}

impl OrchestratorSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.generation.model.clone(),
            temperature: config.generation.temperature,
            max_tokens: Some(config.generation.max_tokens),
            top_k: config.retrieval.top_k,
            timeout: Duration::from_secs(config.query.timeout_secs),
            audit_mode: config.audit.mode,
        }
    }
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Composes the codec and the three ports into the query pipeline.
///
/// Holds no per-conversation state; one instance serves any number of
/// concurrent requests.
pub struct QueryOrchestrator {
    codec: Arc<dyn StateCodec>,
    retriever: Arc<dyn Retriever>,
    provider: Arc<dyn Provider>,
    publisher: Arc<dyn AuditPublisher>,
    assembler: PromptAssembler,
    settings: OrchestratorSettings,
}

impl QueryOrchestrator {
    pub fn new(
        codec: Arc<dyn StateCodec>,
        retriever: Arc<dyn Retriever>,
        provider: Arc<dyn Provider>,
        publisher: Arc<dyn AuditPublisher>,
    ) -> Self {
        Self {
            codec,
            retriever,
            provider,
            publisher,
            assembler: PromptAssembler::default(),
            settings: OrchestratorSettings::default(),
        }
    }

    pub fn with_assembler(mut self, assembler: PromptAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    pub fn with_settings(mut self, settings: OrchestratorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    pub fn retriever(&self) -> &Arc<dyn Retriever> {
        &self.retriever
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    pub fn publisher(&self) -> &Arc<dyn AuditPublisher> {
        &self.publisher
    }

    /// Answer one question.
    ///
    /// On error no next state exists; the caller keeps and may resend its
    /// prior token.
    pub async fn query(&self, request: QueryRequest) -> Result<QueryResponse> {
        let span = info_span!("query", request_id = %Uuid::new_v4());
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: QueryRequest) -> Result<QueryResponse> {
        let QueryRequest {
            question,
            prior_state,
            suppress_audit,
        } = request;
        let deadline = Instant::now() + self.settings.timeout;

        debug!(stage = %QueryStage::Decoding, "Decoding prior state");
        let mut history = self.codec.decode(prior_state.as_ref()).map_err(|e| {
            warn!(error = %e, "Rejected prior state");
            e
        })?;

        debug!(
            stage = %QueryStage::Retrieving,
            retriever = self.retriever.name(),
            top_k = self.settings.top_k,
            "Retrieving passages"
        );
        let passages = timeout_at(deadline, self.retriever.search(&question, self.settings.top_k))
            .await
            .map_err(|_| {
                RetrievalError::Timeout(format!(
                    "no passages within {}s",
                    self.settings.timeout.as_secs()
                ))
            })??;

        debug!(
            stage = %QueryStage::Assembling,
            passages = passages.len(),
            history_turns = history.len(),
            "Assembling prompt"
        );
        let messages = self.assembler.assemble(&history, &passages, &question);

        debug!(
            stage = %QueryStage::Generating,
            provider = self.provider.name(),
            model = %self.settings.model,
            "Generating answer"
        );
        let request = ProviderRequest {
            model: self.settings.model.clone(),
            messages,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };
        let response = timeout_at(deadline, self.provider.complete(request))
            .await
            .map_err(|_| {
                GenerationError::Timeout(format!(
                    "no answer within {}s",
                    self.settings.timeout.as_secs()
                ))
            })??;
        if response.content.trim().is_empty() {
            return Err(GenerationError::InvalidOutput("empty answer".into()).into());
        }
        if let Some(usage) = &response.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Token usage"
            );
        }
        let answer = response.content;

        debug!(stage = %QueryStage::Updating, "Extending history");
        history.push_exchange(question.clone(), answer.clone());
        let next_state = self.codec.encode(&history);

        if suppress_audit {
            debug!("Audit suppressed by caller");
        } else {
            debug!(stage = %QueryStage::Auditing, mode = ?self.settings.audit_mode, "Publishing audit");
            self.audit(question, answer.clone()).await;
        }

        debug!(stage = %QueryStage::Responding, "Responding");
        info!(
            answer_len = answer.len(),
            turns = history.len(),
            sources = passages.len(),
            "Query answered"
        );

        Ok(QueryResponse {
            answer,
            next_state,
            sources: passages.into_iter().map(|p| p.source_id).collect(),
        })
    }

    async fn audit(&self, question: String, answer: String) {
        match self.settings.audit_mode {
            AuditMode::Inline => publish_logged(self.publisher.as_ref(), &question, &answer).await,
            AuditMode::Detached => {
                let publisher = Arc::clone(&self.publisher);
                tokio::spawn(
                    async move { publish_logged(publisher.as_ref(), &question, &answer).await }
                        .in_current_span(),
                );
            }
        }
    }
}

/// Publish and swallow the outcome.
async fn publish_logged(publisher: &dyn AuditPublisher, question: &str, answer: &str) {
    match publisher.publish(question, answer).await {
        Ok(()) => debug!(publisher = publisher.name(), "Audit published"),
        Err(e) => warn!(
            publisher = publisher.name(),
            phase = ?e.phase(),
            error = %e,
            "Audit publication failed"
        ),
    }
}
