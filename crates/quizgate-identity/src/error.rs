//! Error types for the identity layer.

use quizgate_token::TokenError;

/// Errors that can occur while authenticating a user or minting a session.
///
/// The two variants callers care about on the request path map directly to
/// HTTP semantics:
///
/// - [`MissingInput`](Self::MissingInput) → client error (400)
/// - [`AuthenticationFailed`](Self::AuthenticationFailed) → 401
///
/// `AuthenticationFailed` carries no detail on purpose: "unknown user" and
/// "wrong password" must look identical to the caller.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The identity or the secret was empty (after trimming).
    /// Detected before any credential lookup.
    #[error("identity and secret are both required")]
    MissingInput,

    /// The credentials did not match a stored record.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Minting the session token failed.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// The credential file could not be read.
    #[error("failed to read credentials: {0}")]
    Io(#[from] std::io::Error),

    /// The credential file is not valid.
    #[error("invalid credential records: {0}")]
    InvalidRecords(String),
}
