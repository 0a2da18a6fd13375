//! Session state codec for Threadline.
//!
//! Conversation history travels with the caller as an opaque token instead
//! of living in a server-side session map. [`TokenCodec`] is the only code
//! that reads or writes the token's internals.

pub mod codec;

pub use codec::{TOKEN_VERSION, TokenCodec};
