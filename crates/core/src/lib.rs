//! # Threadline Core
//!
//! Domain types, port traits, and error definitions for the Threadline
//! stateless retrieval-augmented query pipeline. This crate has **no
//! framework dependencies**: it defines the model every other crate
//! implements against.
//!
//! ## Ports
//!
//! Every external collaborator is a trait here, implemented elsewhere:
//! - [`StateCodec`]: history ⇄ opaque token (`threadline-session`)
//! - [`Retriever`] / [`Embedder`]: vector store (`threadline-retrieval`)
//! - [`Provider`]: language model (`threadline-providers`)
//! - [`AuditPublisher`] / [`ThreadTransport`]: notification channel (`threadline-audit`)
//!
//! Concrete backends are injected at construction time, so tests swap in
//! scripted stubs.

pub mod audit;
pub mod error;
pub mod message;
pub mod provider;
pub mod retrieval;
pub mod state;

// Re-export key types at crate root for ergonomics
pub use audit::{AuditPublisher, ThreadRef, ThreadTransport};
pub use error::{
    AuditPhase, AuditPublishError, Error, ErrorKind, GenerationError, Result, RetrievalError,
    StateDecodeError,
};
pub use message::{ConversationHistory, Role, Turn};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use retrieval::{Embedder, RetrievedPassage, Retriever};
pub use state::{StateCodec, StateToken};
