//! The query pipeline: the heart of Threadline.
//!
//! Each query follows one fixed cycle:
//!
//! 1. **Decode** the caller's state token into a conversation history
//! 2. **Retrieve** passages for the raw question
//! 3. **Assemble** the prompt (instructions + context, history, question)
//! 4. **Generate** the answer via the configured provider
//! 5. **Update** the history and encode the next token
//! 6. **Audit** the exchange unless the caller suppressed it
//!
//! No conversation state is kept between calls.

pub mod bootstrap;
pub mod orchestrator;
pub mod prompt;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use bootstrap::{build_codec, build_orchestrator};
pub use orchestrator::{
    OrchestratorSettings, QueryOrchestrator, QueryRequest, QueryResponse, QueryStage,
};
pub use prompt::PromptAssembler;
