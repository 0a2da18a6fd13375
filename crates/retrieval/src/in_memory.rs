//! In-memory retriever: useful for testing and local demos.
//!
//! Holds pre-embedded passages and ranks them by cosine similarity to the
//! embedded query.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use threadline_core::error::RetrievalError;
use threadline_core::retrieval::{Embedder, RetrievedPassage, Retriever};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::vector::top_k;

/// A corpus passage with its embedding.
#[derive(Debug, Clone)]
pub struct IndexedPassage {
    pub text: String,
    pub source_id: String,
    pub embedding: Vec<f32>,
}

/// One record of a passages JSON file. Records without an embedding are
/// embedded at load time.
#[derive(Debug, Deserialize)]
struct PassageRecord {
    text: String,
    #[serde(alias = "source")]
    source_id: String,
    #[serde(default)]
    embedding: Option<Vec<f32>>,
}

/// A retriever over passages held in memory.
pub struct InMemoryRetriever {
    embedder: Arc<dyn Embedder>,
    passages: RwLock<Vec<IndexedPassage>>,
}

impl InMemoryRetriever {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            passages: RwLock::new(Vec::new()),
        }
    }

    /// Create from already-embedded passages.
    pub fn from_passages(embedder: Arc<dyn Embedder>, passages: Vec<IndexedPassage>) -> Self {
        Self {
            embedder,
            passages: RwLock::new(passages),
        }
    }

    /// Load passages from a JSON array of `{text, source_id, embedding?}`.
    pub async fn load_json(
        embedder: Arc<dyn Embedder>,
        path: &Path,
    ) -> Result<Self, RetrievalError> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            RetrievalError::Unavailable(format!("cannot read {}: {e}", path.display()))
        })?;
        let records: Vec<PassageRecord> = serde_json::from_str(&raw).map_err(|e| {
            RetrievalError::Unavailable(format!("invalid passages file {}: {e}", path.display()))
        })?;

        let retriever = Self::new(embedder);
        let mut ready = Vec::with_capacity(records.len());
        let mut pending = Vec::new();
        for record in records {
            match record.embedding {
                Some(embedding) => ready.push(IndexedPassage {
                    text: record.text,
                    source_id: record.source_id,
                    embedding,
                }),
                None => pending.push((record.text, record.source_id)),
            }
        }
        retriever.passages.write().await.extend(ready);
        if !pending.is_empty() {
            retriever.index(pending).await?;
        }

        info!(
            path = %path.display(),
            passages = retriever.len().await,
            "Loaded in-memory corpus"
        );
        Ok(retriever)
    }

    /// Embed and add `(text, source_id)` pairs.
    pub async fn index(&self, docs: Vec<(String, String)>) -> Result<usize, RetrievalError> {
        let texts: Vec<String> = docs.iter().map(|(t, _)| t.clone()).collect();
        let embeddings = self.embedder.embed(&texts).await?;
        if embeddings.len() != docs.len() {
            return Err(RetrievalError::EmbeddingFailed(format!(
                "expected {} embeddings, got {}",
                docs.len(),
                embeddings.len()
            )));
        }

        let added = docs.len();
        let mut passages = self.passages.write().await;
        passages.extend(
            docs.into_iter()
                .zip(embeddings)
                .map(|((text, source_id), embedding)| IndexedPassage {
                    text,
                    source_id,
                    embedding,
                }),
        );
        Ok(added)
    }

    pub async fn len(&self) -> usize {
        self.passages.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.passages.read().await.is_empty()
    }
}

#[async_trait]
impl Retriever for InMemoryRetriever {
    fn name(&self) -> &str {
        "memory"
    }

    async fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievedPassage>, RetrievalError> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let query_embedding = self.embedder.embed_query(query).await?;

        let passages = self.passages.read().await;
        let ranked = top_k(
            &query_embedding,
            passages.iter().map(|p| p.embedding.as_slice()),
            k,
        );

        debug!(candidates = passages.len(), returned = ranked.len(), "In-memory search");

        Ok(ranked
            .into_iter()
            .map(|(i, score)| {
                let p = &passages[i];
                RetrievedPassage::new(p.text.clone(), p.source_id.clone(), score)
            })
            .collect())
    }
}
