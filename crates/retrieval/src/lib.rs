//! Retrieval backends for Threadline.
//!
//! All backends implement the `threadline_core::Retriever` trait and embed
//! the query through an injected `threadline_core::Embedder`.

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod vector;

pub use in_memory::{InMemoryRetriever, IndexedPassage};
#[cfg(feature = "postgres")]
pub use postgres::{PostgresRetriever, VectorLayout};
pub use vector::cosine_similarity;
