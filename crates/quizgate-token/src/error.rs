//! Error types for the token layer.
//!
//! Each crate in Quizgate defines its own error enum. A `TokenError` always
//! means "this token cannot be trusted" (or the secret itself was unusable),
//! never a networking or storage problem.

/// Errors produced while building a codec or decoding a session token.
///
/// Callers on the request path almost never inspect the variant: any
/// `Err` from [`TokenCodec::decode`](crate::TokenCodec::decode) means
/// "not authenticated". The variants exist for logging and tests.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The configured signing secret has zero length.
    ///
    /// An empty HMAC key would make every token trivially forgeable, so
    /// it is refused at startup rather than at first use.
    #[error("signing secret must not be empty")]
    EmptySecret,

    /// The token does not have the `BODY.SIG` shape, is too long, or one
    /// of its parts is not valid base64url.
    #[error("malformed token: {0}")]
    Malformed(&'static str),

    /// The signature does not match the body under this secret.
    ///
    /// Also what a secret mismatch between two services looks like.
    #[error("token signature mismatch")]
    BadSignature,

    /// The token was valid once but its expiration time has passed.
    #[error("token expired at {expired_at}")]
    Expired {
        /// Unix timestamp (seconds) carried in the token.
        expired_at: u64,
    },

    /// The encoded token would not fit in a cookie.
    ///
    /// Returned by `encode` so that no token is ever minted that `decode`
    /// would refuse.
    #[error("token of {len} bytes exceeds the {max} byte limit")]
    TooLarge {
        /// Length of the token that would have been produced.
        len: usize,
        /// [`MAX_TOKEN_LEN`](crate::MAX_TOKEN_LEN).
        max: usize,
    },

    /// Serializing the claims failed.
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// The signed body is not a well-formed session payload.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),
}
