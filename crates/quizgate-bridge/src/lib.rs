//! Trust resolution for Quizgate application services.
//!
//! The quiz service never sees a password and never mints a session. It
//! has to decide, on every protected request, whether the presented cookie
//! was minted by the identity service. This crate makes that decision:
//!
//! - [`RemoteVerifier`] — asks the identity service (`GET /verify`)
//! - [`TrustBridge`] — tries the remote verifier once, within a timeout,
//!   and falls back to decoding the token locally with the shared secret
//!   when the identity service can't be reached
//!
//! # Feature Flags
//!
//! - `http` (default) — [`HttpRemoteVerifier`] via `reqwest`

mod bridge;
mod error;
#[cfg(feature = "http")]
mod http;

pub use bridge::{
    BridgeConfig, DEFAULT_REMOTE_TIMEOUT, Resolution, TrustBridge, TrustSource,
};
pub use error::BridgeError;
#[cfg(feature = "http")]
pub use http::HttpRemoteVerifier;

use quizgate_token::{Identity, VerifyOutcome};

/// The result of one attempt to get a trust decision.
///
/// `TransportUnavailable` is never handed to request handlers: the
/// [`TrustBridge`] reduces it to a local decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustDecision {
    /// The token names this identity.
    Authenticated(Identity),
    /// The token was looked at and rejected.
    Unauthenticated,
    /// No definitive answer could be obtained.
    TransportUnavailable,
}

impl TrustDecision {
    /// Converts a definitive outcome into a decision.
    pub fn from_outcome(outcome: VerifyOutcome) -> Self {
        match outcome.into_identity() {
            Some(identity) => Self::Authenticated(identity),
            None => Self::Unauthenticated,
        }
    }
}

/// Asks the identity service whether a token is valid.
///
/// # Trait bounds
///
/// - `Send + Sync + 'static` → one verifier is shared by every request
///   handler for the lifetime of the service.
/// - The returned future is `Send` so handlers can await it on Tokio's
///   multi-threaded runtime.
///
/// Implementations report "I couldn't find out" as `Err`, and "the
/// identity service said no" as `Ok(VerifyOutcome::unauthenticated())`.
/// The difference matters: only the former triggers the local fallback.
pub trait RemoteVerifier: Send + Sync + 'static {
    /// Verifies `token` remotely.
    fn verify(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<VerifyOutcome, BridgeError>> + Send;
}
