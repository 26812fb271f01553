//! Codec trait and implementations for serializing token claims.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The token layer doesn't care HOW the claims are serialized before they
//! are signed — it just needs something that implements [`Codec`].
//!
//! Both services must use the same codec: the bytes that get signed are
//! the codec's output, so two codecs that disagree on field order or
//! encoding produce tokens the other side rejects as forged.

use serde::{Serialize, de::DeserializeOwned};

use crate::TokenError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// ## Trait bounds
///
/// - `Send + Sync` → a codec is shared by every request handler, and
///   Tokio may run those handlers on any worker thread.
/// - `Clone` → [`TokenCodec`](crate::TokenCodec) is cloned into each
///   service's shared state.
/// - `'static` → the codec owns everything it needs.
pub trait Codec: Send + Sync + Clone + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `TokenError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, TokenError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `TokenError::Decode` if the bytes are malformed or don't
    /// match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, TokenError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// JSON output for a given struct is deterministic: fields are written in
/// declaration order and the payload's sets are ordered, which is what
/// makes [`TokenCodec::encode`](crate::TokenCodec::encode) deterministic.
///
/// ```rust
/// use quizgate_token::{Codec, JsonCodec, SessionPayload};
///
/// let codec = JsonCodec;
/// let payload = SessionPayload::new("admin");
///
/// let bytes = codec.encode(&payload).unwrap();
/// let decoded: SessionPayload = codec.decode(&bytes).unwrap();
/// assert_eq!(payload, decoded);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, TokenError> {
        serde_json::to_vec(value).map_err(TokenError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, TokenError> {
        serde_json::from_slice(data).map_err(TokenError::Decode)
    }
}
