//! PostgreSQL-wire retriever over an embedded document table.
//!
//! Two storage layouts are supported:
//!
//! - [`VectorLayout::Exploded`]: one row per embedding dimension, as written
//!   by the Yellowbrick vector store loaders.
//!
//!   ```sql
//!   CREATE TABLE doc_vectors_content (doc_id UUID, text VARCHAR(60000), metadata VARCHAR(1024));
//!   CREATE TABLE doc_vectors (doc_id UUID, embedding_id SMALLINT, embedding FLOAT);
//!   ```
//!
//!   Cosine similarity is computed in SQL with `SUM`/`SQRT` over the join.
//!
//! - [`VectorLayout::Pgvector`]: a single table with a pgvector column,
//!   ranked with the `<=>` operator.
//!
//!   ```sql
//!   CREATE TABLE doc_vectors (doc_id UUID, text TEXT, metadata JSONB, embedding vector(1536));
//!   ```
//!
//! # Feature gate
//!
//! This module is behind the `postgres` feature flag (on by default).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use threadline_core::error::RetrievalError;
use threadline_core::retrieval::{Embedder, RetrievedPassage, Retriever};
use tracing::{debug, info};

use crate::vector::to_vector_literal;

/// How embeddings are stored in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorLayout {
    /// `{table}` holds `(doc_id, embedding_id, embedding)` per dimension;
    /// `{table}_content` holds `(doc_id, text, metadata)`.
    Exploded,
    /// `{table}` holds `(doc_id, text, metadata, embedding vector)`.
    Pgvector,
}

impl VectorLayout {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "exploded" => Some(Self::Exploded),
            "pgvector" => Some(Self::Pgvector),
            _ => None,
        }
    }
}

/// Retriever backed by a PostgreSQL-compatible warehouse.
pub struct PostgresRetriever {
    pool: PgPool,
    embedder: Arc<dyn Embedder>,
    table: String,
    layout: VectorLayout,
}

impl PostgresRetriever {
    /// Connect a pool. `table` must already be a validated identifier; it is
    /// interpolated into SQL.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        embedder: Arc<dyn Embedder>,
        table: impl Into<String>,
        layout: VectorLayout,
    ) -> Result<Self, RetrievalError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url)
            .await
            .map_err(|e| RetrievalError::Unavailable(format!("database connection failed: {e}")))?;

        let table = table.into();
        info!(table = %table, ?layout, "Connected to vector store");
        Ok(Self::from_pool(pool, embedder, table, layout))
    }

    /// Create from an existing connection pool.
    pub fn from_pool(
        pool: PgPool,
        embedder: Arc<dyn Embedder>,
        table: impl Into<String>,
        layout: VectorLayout,
    ) -> Self {
        Self {
            pool,
            embedder,
            table: table.into(),
            layout,
        }
    }

    fn search_sql(&self) -> String {
        match self.layout {
            VectorLayout::Exploded => exploded_sql(&self.table),
            VectorLayout::Pgvector => pgvector_sql(&self.table),
        }
    }
}

fn exploded_sql(table: &str) -> String {
    format!(
        "WITH q(embedding_id, embedding) AS ( \
             SELECT * FROM UNNEST($1::int4[], $2::float8[]) \
         ) \
         SELECT c.doc_id::text AS doc_id, c.text AS text, c.metadata::text AS metadata, s.score AS score \
         FROM ( \
             SELECT v.doc_id, \
                    SUM(q.embedding * v.embedding) / \
                    (SQRT(SUM(q.embedding * q.embedding)) * SQRT(SUM(v.embedding * v.embedding))) AS score \
             FROM q INNER JOIN {table} v ON v.embedding_id = q.embedding_id \
             GROUP BY v.doc_id \
             ORDER BY score DESC \
             LIMIT $3 \
         ) s \
         INNER JOIN {table}_content c ON c.doc_id = s.doc_id \
         ORDER BY s.score DESC, c.doc_id"
    )
}

fn pgvector_sql(table: &str) -> String {
    format!(
        "SELECT doc_id::text AS doc_id, text, metadata::text AS metadata, \
                1.0 - (embedding <=> $1::vector) AS score \
         FROM {table} \
         WHERE embedding IS NOT NULL \
         ORDER BY embedding <=> $1::vector ASC, doc_id \
         LIMIT $2"
    )
}

/// `metadata.source` when the metadata is a JSON object carrying one,
/// otherwise the document id.
fn source_id(doc_id: &str, metadata: Option<&str>) -> String {
    metadata
        .and_then(|m| serde_json::from_str::<serde_json::Value>(m).ok())
        .and_then(|v| v.get("source").and_then(|s| s.as_str()).map(String::from))
        .unwrap_or_else(|| doc_id.to_string())
}

fn row_to_passage(row: &PgRow) -> Result<RetrievedPassage, sqlx::Error> {
    let doc_id: String = row.try_get("doc_id")?;
    let text: String = row.try_get("text")?;
    let metadata: Option<String> = row.try_get("metadata")?;
    let score: Option<f64> = row.try_get("score")?;
    Ok(RetrievedPassage::new(
        text,
        source_id(&doc_id, metadata.as_deref()),
        score.unwrap_or(0.0) as f32,
    ))
}

#[async_trait]
impl Retriever for PostgresRetriever {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievedPassage>, RetrievalError> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let embedding = self.embedder.embed_query(query).await?;
        if embedding.is_empty() {
            return Err(RetrievalError::EmbeddingFailed("empty query embedding".into()));
        }

        let sql = self.search_sql();
        let limit = k as i64;
        let rows = match self.layout {
            VectorLayout::Exploded => {
                let ids: Vec<i32> = (0..embedding.len() as i32).collect();
                let values: Vec<f64> = embedding.iter().map(|v| *v as f64).collect();
                sqlx::query(&sql)
                    .bind(ids)
                    .bind(values)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await
            }
            VectorLayout::Pgvector => {
                sqlx::query(&sql)
                    .bind(to_vector_literal(&embedding))
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| RetrievalError::QueryFailed(format!("similarity search failed: {e}")))?;

        let passages = rows
            .iter()
            .map(row_to_passage)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RetrievalError::QueryFailed(format!("unexpected row shape: {e}")))?;

        debug!(table = %self.table, returned = passages.len(), "Vector store search");
        Ok(passages)
    }

    async fn health_check(&self) -> Result<bool, RetrievalError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| true)
            .map_err(|e| RetrievalError::Unavailable(e.to_string()))
    }
}

// ── Unit tests (no DB required) ──────────────────────────────────────────
