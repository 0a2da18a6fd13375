//! Conversation turn and history value objects.
//!
//! These flow through the whole pipeline:
//! token → history → prompt → answer → extended history → token.

use serde::{Deserialize, Serialize};

use crate::error::StateDecodeError;

/// The role of a turn's author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Fixed instructions
    System,
    /// The person asking questions
    User,
    /// The model's answers
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in a conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Turn {
    role: Role,
    text: String,
}

impl Turn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    /// Create a user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// Create an assistant turn.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    /// Create a system turn.
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// An ordered conversation, oldest turn first.
///
/// After an optional leading system turn, turns come in complete
/// user → assistant pairs. The empty history is a fresh conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    /// A fresh, empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a history from externally supplied turns, checking turn order.
    pub fn try_from_turns(turns: Vec<Turn>) -> Result<Self, StateDecodeError> {
        let body = match turns.first() {
            Some(first) if first.role == Role::System => &turns[1..],
            _ => &turns[..],
        };

        if body.len() % 2 != 0 {
            return Err(StateDecodeError::InvalidSequence(format!(
                "expected complete user/assistant pairs, found {} trailing turn(s)",
                body.len() % 2
            )));
        }

        for (i, pair) in body.chunks_exact(2).enumerate() {
            if pair[0].role != Role::User || pair[1].role != Role::Assistant {
                return Err(StateDecodeError::InvalidSequence(format!(
                    "exchange {i} is {}/{} instead of user/assistant",
                    pair[0].role, pair[1].role
                )));
            }
        }

        Ok(Self { turns })
    }

    /// Append one question and its answer, in that order.
    pub fn push_exchange(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.turns.push(Turn::user(question));
        self.turns.push(Turn::assistant(answer));
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Number of completed question/answer exchanges.
    pub fn exchanges(&self) -> usize {
        self.turns.iter().filter(|t| t.role == Role::User).count()
    }
}

impl<'a> IntoIterator for &'a ConversationHistory {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}
