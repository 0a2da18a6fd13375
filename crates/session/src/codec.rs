//! Versioned token codec.
//!
//! Token layout:
//!
//! ```text
//! v1.<base64url(json envelope)>[.<base64url(hmac-sha256 of the payload segment)>]
//! ```
//!
//! The envelope is `{"turns":[{"role":"user","text":"..."}, ...]}`. The third
//! segment is present exactly when the codec holds a signing key. Base64url
//! never produces `.`, so segments split unambiguously.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;

use threadline_core::error::StateDecodeError;
use threadline_core::message::{ConversationHistory, Turn};
use threadline_core::state::{StateCodec, StateToken};

type HmacSha256 = Hmac<Sha256>;

/// Current token format version.
pub const TOKEN_VERSION: &str = "v1";

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    turns: &'a [Turn],
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Envelope {
    turns: Vec<Turn>,
}

/// Encodes histories as base64url JSON, optionally HMAC-signed.
#[derive(Clone, Default)]
pub struct TokenCodec {
    signer: Option<HmacSha256>,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("signed", &self.is_signed())
            .finish()
    }
}

impl TokenCodec {
    /// An unsigned codec.
    pub fn new() -> Self {
        Self::default()
    }

    /// A codec that signs every token and rejects unsigned or tampered ones.
    pub fn signed(key: impl AsRef<[u8]>) -> Result<Self, InvalidLength> {
        let signer = HmacSha256::new_from_slice(key.as_ref())?;
        Ok(Self {
            signer: Some(signer),
        })
    }

    pub fn is_signed(&self) -> bool {
        self.signer.is_some()
    }

    fn sign(&self, signer: &HmacSha256, payload: &str) -> String {
        let mut mac = signer.clone();
        mac.update(payload.as_bytes());
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }

    fn verify(
        &self,
        signer: &HmacSha256,
        payload: &str,
        signature: &str,
    ) -> Result<(), StateDecodeError> {
        let sig = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| StateDecodeError::Signature("signature segment is not base64url".into()))?;
        let mut mac = signer.clone();
        mac.update(payload.as_bytes());
        mac.verify_slice(&sig)
            .map_err(|_| StateDecodeError::Signature("signature mismatch".into()))
    }
}

impl StateCodec for TokenCodec {
    fn encode(&self, history: &ConversationHistory) -> StateToken {
        let json = serde_json::to_vec(&EnvelopeRef {
            turns: history.turns(),
        })
        .expect("serializing role/text pairs cannot fail");
        let payload = URL_SAFE_NO_PAD.encode(json);

        let token = match &self.signer {
            Some(signer) => {
                let signature = self.sign(signer, &payload);
                format!("{TOKEN_VERSION}.{payload}.{signature}")
            }
            None => format!("{TOKEN_VERSION}.{payload}"),
        };

        debug!(turns = history.len(), token_len = token.len(), "Encoded state token");
        StateToken::from(token)
    }

    fn decode(&self, token: Option<&StateToken>) -> Result<ConversationHistory, StateDecodeError> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Ok(ConversationHistory::new());
        };

        let segments: Vec<&str> = token.as_str().trim().split('.').collect();

        let version = segments[0];
        if segments.len() == 1 {
            return Err(StateDecodeError::Malformed("missing version header".into()));
        }
        if version != TOKEN_VERSION {
            return Err(
                if version.len() <= 8 && version.chars().all(|c| c.is_ascii_alphanumeric()) {
                    StateDecodeError::UnsupportedVersion
                } else {
                    StateDecodeError::Malformed("unrecognized version header".into())
                },
            );
        }

        let payload = match (&self.signer, segments.len()) {
            (None, 2) => segments[1],
            (Some(signer), 3) => {
                self.verify(signer, segments[1], segments[2])?;
                segments[1]
            }
            (Some(_), 2) => {
                return Err(StateDecodeError::Signature("token is not signed".into()));
            }
            (None, 3) => {
                return Err(StateDecodeError::Signature(
                    "token is signed but no signing key is configured".into(),
                ));
            }
            (_, n) => {
                return Err(StateDecodeError::Malformed(format!(
                    "expected 2 or 3 segments, found {n}"
                )));
            }
        };

        if payload.is_empty() {
            return Err(StateDecodeError::Malformed("empty payload".into()));
        }

        let bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| StateDecodeError::Malformed("payload is not base64url".into()))?;

        let envelope: Envelope = serde_json::from_slice(&bytes).map_err(|e| {
            debug!(category = ?e.classify(), "State token payload rejected");
            StateDecodeError::InvalidPayload
        })?;

        let history = ConversationHistory::try_from_turns(envelope.turns)?;
        debug!(turns = history.len(), "Decoded state token");
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use threadline_core::message::Role;

    fn sample_history() -> ConversationHistory {
        let mut h = ConversationHistory::new();
        h.push_exchange(
            "What is a distribution key?",
            "A distribution key determines how rows are placed across nodes.",
        );
        h.push_exchange("And how do I choose one?", "Pick a high-cardinality join column.");
        h
    }

    fn raw_token(json: &str) -> StateToken {
        StateToken::from(format!("v1.{}", URL_SAFE_NO_PAD.encode(json)))
    }

    #[test]
    fn roundtrip_preserves_every_turn() {
        let codec = TokenCodec::new();
        let history = sample_history();
        let token = codec.encode(&history);
        assert_eq!(codec.decode(Some(&token)).unwrap(), history);
    }

    #[test]
    fn roundtrip_empty_history() {
        let codec = TokenCodec::new();
        let token = codec.encode(&ConversationHistory::new());
        assert!(!token.is_empty());
        assert!(codec.decode(Some(&token)).unwrap().is_empty());
    }

    #[test]
    fn roundtrip_awkward_text() {
        let codec = TokenCodec::new();
        let mut history = ConversationHistory::new();
        history.push_exchange(
            "SELECT \"a.b\" FROM t WHERE x = 'y';\n-- comment",
            "Ünïcødé ✓ and a literal . dot and \\ backslash",
        );
        let token = codec.encode(&history);
        assert_eq!(codec.decode(Some(&token)).unwrap(), history);
    }

    #[test]
    fn roundtrip_with_leading_system_turn() {
        let codec = TokenCodec::new();
        let history = ConversationHistory::try_from_turns(vec![
            Turn::system("Be precise."),
            Turn::user("q"),
            Turn::assistant("a"),
        ])
        .unwrap();
        let decoded = codec.decode(Some(&codec.encode(&history))).unwrap();
        assert_eq!(decoded.turns()[0].role(), Role::System);
        assert_eq!(decoded, history);
    }

    #[test]
    fn fresh_session_equivalence() {
        let codec = TokenCodec::new();
        let absent = codec.decode(None).unwrap();
        let empty = codec.decode(Some(&StateToken::empty())).unwrap();
        let blank = codec.decode(Some(&StateToken::from("   "))).unwrap();
        assert!(absent.is_empty());
        assert_eq!(absent, empty);
        assert_eq!(empty, blank);
    }

    #[test]
    fn malformed_token_is_a_decode_error() {
        let codec = TokenCodec::new();
        let err = codec
            .decode(Some(&StateToken::from("not-a-real-token")))
            .unwrap_err();
        assert!(matches!(err, StateDecodeError::Malformed(_)));
        // Deterministic: the same input fails the same way.
        let again = codec
            .decode(Some(&StateToken::from("not-a-real-token")))
            .unwrap_err();
        assert_eq!(err, again);
    }

    #[test]
    fn unknown_version_is_reported() {
        let codec = TokenCodec::new();
        let err = codec.decode(Some(&StateToken::from("v9.abcd"))).unwrap_err();
        assert_eq!(err, StateDecodeError::UnsupportedVersion);
        assert!(!err.to_string().contains("v9"));
    }

    #[test]
    fn non_base64_payload_is_rejected() {
        let codec = TokenCodec::new();
        let err = codec.decode(Some(&StateToken::from("v1.@@@@"))).unwrap_err();
        assert!(matches!(err, StateDecodeError::Malformed(_)));
    }

    #[test]
    fn non_history_payload_is_rejected() {
        let codec = TokenCodec::new();
        let err = codec.decode(Some(&raw_token(r#"{"messages":[]}"#))).unwrap_err();
        assert_eq!(err, StateDecodeError::InvalidPayload);

        let err = codec
            .decode(Some(&raw_token(r#"{"turns":[{"role":"tool","text":"x"}]}"#)))
            .unwrap_err();
        assert_eq!(err, StateDecodeError::InvalidPayload);
        assert_eq!(err.to_string(), "state token payload is not a valid history");
    }

    #[test]
    fn extra_turn_fields_are_rejected() {
        let codec = TokenCodec::new();
        let token = raw_token(
            r#"{"turns":[{"role":"user","text":"q","name":"x"},{"role":"assistant","text":"a"}]}"#,
        );
        let err = codec.decode(Some(&token)).unwrap_err();
        assert_eq!(err, StateDecodeError::InvalidPayload);
    }

    #[test]
    fn out_of_order_history_is_rejected() {
        let codec = TokenCodec::new();
        let token = raw_token(
            r#"{"turns":[{"role":"assistant","text":"a"},{"role":"user","text":"q"}]}"#,
        );
        let err = codec.decode(Some(&token)).unwrap_err();
        assert!(matches!(err, StateDecodeError::InvalidSequence(_)));
    }

    #[test]
    fn error_messages_do_not_echo_token_text() {
        let codec = TokenCodec::new();
        let token = raw_token(r#"{"turns":[{"role":"secret-role","text":"secret-text"}]}"#);
        let err = codec.decode(Some(&token)).unwrap_err();
        assert!(!err.to_string().contains("secret"));
    }

    #[test]
    fn signed_roundtrip() {
        let codec = TokenCodec::signed(b"unit-test-key").unwrap();
        let history = sample_history();
        let token = codec.encode(&history);
        assert_eq!(token.as_str().split('.').count(), 3);
        assert_eq!(codec.decode(Some(&token)).unwrap(), history);
    }

    #[test]
    fn tampered_signed_token_is_rejected() {
        let codec = TokenCodec::signed(b"unit-test-key").unwrap();
        let token = codec.encode(&sample_history());
        let mut segments: Vec<String> =
            token.as_str().split('.').map(str::to_string).collect();

        let mut forged = ConversationHistory::new();
        forged.push_exchange("forged question", "forged answer");
        let forged_token = TokenCodec::new().encode(&forged);
        segments[1] = forged_token.as_str().split('.').nth(1).unwrap().to_string();

        let err = codec
            .decode(Some(&StateToken::from(segments.join("."))))
            .unwrap_err();
        assert!(matches!(err, StateDecodeError::Signature(_)));
    }

    #[test]
    fn signature_from_other_key_is_rejected() {
        let ours = TokenCodec::signed(b"key-a").unwrap();
        let theirs = TokenCodec::signed(b"key-b").unwrap();
        let token = theirs.encode(&sample_history());
        assert!(matches!(
            ours.decode(Some(&token)),
            Err(StateDecodeError::Signature(_))
        ));
    }

    #[test]
    fn signing_mode_mismatch_is_rejected() {
        let signed = TokenCodec::signed(b"k").unwrap();
        let unsigned = TokenCodec::new();

        let plain = unsigned.encode(&sample_history());
        assert!(matches!(
            signed.decode(Some(&plain)),
            Err(StateDecodeError::Signature(_))
        ));

        let sealed = signed.encode(&sample_history());
        assert!(matches!(
            unsigned.decode(Some(&sealed)),
            Err(StateDecodeError::Signature(_))
        ));
    }

    #[test]
    fn token_does_not_expose_plaintext() {
        let codec = TokenCodec::new();
        let token = codec.encode(&sample_history());
        assert!(token.as_str().starts_with("v1."));
        assert!(!token.as_str().contains("distribution"));
    }

    #[test]
    fn debug_hides_key_material() {
        let codec = TokenCodec::signed(b"super-secret").unwrap();
        let dbg = format!("{codec:?}");
        assert!(dbg.contains("signed: true"));
        assert!(!dbg.contains("super-secret"));
    }
}
