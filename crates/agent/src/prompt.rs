//! Prompt assembly.
//!
//! Produces the message sequence sent to the generation backend:
//!
//! 1. One system message: fixed instructions, a separator, then the retrieved
//!    passages. Context appears here and nowhere else.
//! 2. Every prior turn, oldest first.
//! 3. One user message holding the new question.
//!
//! Assembly is deterministic and has no failure path.

use threadline_config::PromptConfig;
use threadline_core::message::{ConversationHistory, Turn};
use threadline_core::retrieval::RetrievedPassage;

const CONTEXT_SEPARATOR: &str = "----------------";

/// Builds prompts from a fixed set of instructions.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    instructions: String,
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::for_subject(&PromptConfig::default().subject)
    }
}

impl PromptAssembler {
    /// Default instructions scoped to `subject`.
    pub fn for_subject(subject: &str) -> Self {
        Self {
            instructions: format!(
                "Use the following pieces of context to answer the user's question. \
                 Assume the questions are about {subject}.\n\
                 If you don't know the answer, preface the answer with \"I believe\" or \
                 \"I think\" to indicate uncertainty.\n\
                 If the question requires you to answer in code (like SQL) be very precise \
                 with your answers and do not guess."
            ),
        }
    }

    /// Replace the built-in instructions entirely.
    pub fn with_instructions(instructions: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
        }
    }

    pub fn from_config(config: &PromptConfig) -> Self {
        match &config.instructions {
            Some(custom) => Self::with_instructions(custom),
            None => Self::for_subject(&config.subject),
        }
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Render the system message for a set of passages. The context section
    /// is present (possibly empty) even when nothing was retrieved.
    pub fn system_message(&self, passages: &[RetrievedPassage]) -> String {
        format!(
            "{}\n{CONTEXT_SEPARATOR}\n{}",
            self.instructions,
            render_context(passages)
        )
    }

    /// Build the full message sequence for one query.
    pub fn assemble(
        &self,
        history: &ConversationHistory,
        passages: &[RetrievedPassage],
        question: &str,
    ) -> Vec<Turn> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Turn::system(self.system_message(passages)));
        messages.extend(history.iter().cloned());
        messages.push(Turn::user(question));
        messages
    }
}

/// Passages in retrieval order, each tagged with its source.
fn render_context(passages: &[RetrievedPassage]) -> String {
    passages
        .iter()
        .map(|p| format!("Content: {}\nSource: {}", p.text, p.source_id))
        .collect::<Vec<_>>()
        .join("\n\n")
}
