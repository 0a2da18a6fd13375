//! LLM Provider implementations for Threadline.
//!
//! All providers implement the `threadline_core::Provider` trait.
//! [`build_provider`] selects the backend named in configuration.
//! [`OpenAiCompatProvider`] also serves query embeddings.

pub mod anthropic;
pub mod openai_compat;
pub mod router;

pub use anthropic::AnthropicProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use router::{build_embedder, build_provider};
