//! Opaque conversation state carried by the caller between requests.
//!
//! The server keeps no session. Each response hands back a [`StateToken`]
//! that the caller returns with its next question. Only a [`StateCodec`]
//! knows what is inside a token.

use serde::{Deserialize, Serialize};

use crate::error::StateDecodeError;
use crate::message::ConversationHistory;

/// An encoded conversation history, opaque to everyone but the codec.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateToken(String);

impl StateToken {
    /// The token that starts a new conversation.
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Empty or whitespace-only tokens denote a fresh conversation.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for StateToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for StateToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for StateToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Serialization contract between a [`ConversationHistory`] and a [`StateToken`].
///
/// Implementations must satisfy `decode(encode(h)) == h`, decode an empty or
/// absent token to the empty history, and reject anything else they cannot
/// fully reconstruct.
pub trait StateCodec: Send + Sync {
    fn encode(&self, history: &ConversationHistory) -> StateToken;

    fn decode(&self, token: Option<&StateToken>) -> Result<ConversationHistory, StateDecodeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_token_is_empty() {
        assert!(StateToken::from("  \n").is_empty());
        assert!(StateToken::empty().is_empty());
        assert!(!StateToken::from("v1.abc").is_empty());
    }

    #[test]
    fn token_serializes_as_plain_string() {
        let json = serde_json::to_string(&StateToken::from("v1.abc")).unwrap();
        assert_eq!(json, "\"v1.abc\"");
        let back: StateToken = serde_json::from_str(&json).unwrap();
        assert_eq!(back.as_str(), "v1.abc");
    }
}
