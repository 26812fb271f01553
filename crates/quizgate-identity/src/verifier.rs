//! The session verifier: "is this token one of ours, and whose is it?"
//!
//! This is what `GET /verify` runs. It is a pure function of the token
//! codec: no storage, no side effects. That is the whole point, since the
//! quiz service can call it at high volume, or skip it and run the exact
//! same decode locally when the identity service is unreachable.

use quizgate_token::{TokenCodec, VerifyOutcome};

use crate::AuthState;

/// Checks presented session tokens.
#[derive(Debug, Clone)]
pub struct SessionVerifier {
    codec: TokenCodec,
}

impl SessionVerifier {
    /// Creates a verifier that decodes with `codec`.
    pub fn new(codec: TokenCodec) -> Self {
        Self { codec }
    }

    /// Returns `authenticated: true` and the identity iff the token
    /// decodes. A missing token is simply not authenticated.
    pub fn check(&self, token: Option<&str>) -> VerifyOutcome {
        let Some(token) = token else {
            return VerifyOutcome::unauthenticated();
        };

        match self.codec.decode(token) {
            Ok(payload) => VerifyOutcome::authenticated(payload.identity),
            Err(e) => {
                tracing::debug!(error = %e, "session token rejected");
                VerifyOutcome::unauthenticated()
            }
        }
    }

    /// Classifies the caller for the login entry point.
    pub fn state(&self, token: Option<&str>) -> AuthState {
        match self.check(token).into_identity() {
            Some(identity) => AuthState::Authenticated(identity),
            None => AuthState::Anonymous,
        }
    }
}
