//! Retrieval port: the abstraction over the embedded document store.
//!
//! A [`Retriever`] turns a question into the top-k most similar corpus
//! passages. An [`Embedder`] turns text into the vector a similarity
//! backend searches with.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;

/// A corpus passage returned for one request. Not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedPassage {
    /// The passage text
    pub text: String,

    /// Identifier of the source document
    pub source_id: String,

    /// Similarity to the query (higher is closer)
    pub score: f32,
}

impl RetrievedPassage {
    pub fn new(text: impl Into<String>, source_id: impl Into<String>, score: f32) -> Self {
        Self {
            text: text.into(),
            source_id: source_id.into(),
            score,
        }
    }
}

/// The core Retriever trait.
///
/// Implementations: pgvector over PostgreSQL-compatible warehouses, in-memory
/// (for tests and local demos).
#[async_trait]
pub trait Retriever: Send + Sync {
    /// The backend name (e.g., "postgres", "memory").
    fn name(&self) -> &str;

    /// Return at most `k` passages, most similar first.
    ///
    /// Must be idempotent for an unchanged index and identical query.
    async fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievedPassage>, RetrievalError>;

    /// Health check. Can we reach the store?
    async fn health_check(&self) -> Result<bool, RetrievalError> {
        Ok(true)
    }
}

/// Text → vector capability used by similarity backends.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// The embedding model identifier.
    fn model(&self) -> &str;

    /// Embed each input, returning one vector per input in input order.
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, RetrievalError>;

    /// Embed a single query string.
    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, RetrievalError> {
        self.embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RetrievalError::EmbeddingFailed("embedder returned no vectors".into()))
    }
}
