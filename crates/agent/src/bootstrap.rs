//! Wire a [`QueryOrchestrator`] from configuration.

use std::sync::Arc;

use threadline_config::AppConfig;
use threadline_core::audit::AuditPublisher;
use threadline_core::error::{Error, Result};
use threadline_core::retrieval::{Embedder, Retriever};
use threadline_core::state::StateCodec;
use threadline_retrieval::InMemoryRetriever;
use threadline_session::TokenCodec;
use tracing::{info, warn};

use crate::orchestrator::{OrchestratorSettings, QueryOrchestrator};
use crate::prompt::PromptAssembler;

/// Build every port named in `config` and compose them.
///
/// Connects to the vector store when the postgres backend is selected.
pub async fn build_orchestrator(config: &AppConfig) -> Result<QueryOrchestrator> {
    let codec = build_codec(config)?;

    let provider = threadline_providers::build_provider(config);

    let embedder = threadline_providers::build_embedder(config)?;
    let retriever = build_retriever(config, embedder).await?;

    let publisher: Arc<dyn AuditPublisher> = threadline_audit::build_from_config(&config.audit)
        .map_err(|e| Error::Config {
            message: e.to_string(),
        })?;

    info!(
        provider = provider.name(),
        model = %config.generation.model,
        retriever = retriever.name(),
        audit = publisher.name(),
        signed_state = config.state.signing_key.is_some(),
        "Orchestrator ready"
    );

    Ok(QueryOrchestrator::new(codec, retriever, provider, publisher)
        .with_assembler(PromptAssembler::from_config(&config.prompt))
        .with_settings(OrchestratorSettings::from_config(config)))
}

/// Signed tokens when a key is configured, plain otherwise.
pub fn build_codec(config: &AppConfig) -> Result<Arc<dyn StateCodec>> {
    match &config.state.signing_key {
        Some(key) => {
            let codec = TokenCodec::signed(key.as_bytes()).map_err(|e| Error::Config {
                message: format!("state.signing_key: {e}"),
            })?;
            Ok(Arc::new(codec))
        }
        None => Ok(Arc::new(TokenCodec::new())),
    }
}

async fn build_retriever(
    config: &AppConfig,
    embedder: Arc<dyn Embedder>,
) -> Result<Arc<dyn Retriever>> {
    let ret = &config.retrieval;
    match ret.backend.as_str() {
        "memory" => {
            let retriever = match &ret.passages_path {
                Some(path) => InMemoryRetriever::load_json(embedder, path)
                    .await
                    .map_err(|e| Error::Config {
                        message: format!("retrieval.passages_path: {e}"),
                    })?,
                None => {
                    warn!("retrieval.backend = \"memory\" with no passages_path; corpus is empty");
                    InMemoryRetriever::new(embedder)
                }
            };
            Ok(Arc::new(retriever))
        }
        "postgres" => connect_postgres(config, embedder).await,
        other => Err(Error::Config {
            message: format!("unknown retrieval backend '{other}'"),
        }),
    }
}

#[cfg(feature = "postgres")]
async fn connect_postgres(
    config: &AppConfig,
    embedder: Arc<dyn Embedder>,
) -> Result<Arc<dyn Retriever>> {
    use threadline_retrieval::{PostgresRetriever, VectorLayout};

    let ret = &config.retrieval;
    let url = ret.database_url.as_deref().ok_or_else(|| Error::Config {
        message: "retrieval.database_url is required for the postgres backend".into(),
    })?;
    let layout = VectorLayout::parse(&ret.layout).ok_or_else(|| Error::Config {
        message: format!("unknown retrieval.layout '{}'", ret.layout),
    })?;

    let retriever =
        PostgresRetriever::connect(url, ret.max_connections, embedder, &ret.table, layout).await?;
    Ok(Arc::new(retriever))
}

#[cfg(not(feature = "postgres"))]
async fn connect_postgres(
    _config: &AppConfig,
    _embedder: Arc<dyn Embedder>,
) -> Result<Arc<dyn Retriever>> {
    Err(Error::Config {
        message: "built without the postgres feature".into(),
    })
}
