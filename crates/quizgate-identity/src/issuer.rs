//! The session issuer: turns a successful credential check into a token.
//!
//! # Lifecycle
//!
//! ```text
//!              authenticate() ok
//!  [Anonymous] ──────────────────→ [Authenticated]
//!       ↑                                │
//!       └───────── logout() ─────────────┘
//!
//!  authenticate() failed → stays Anonymous, no token
//! ```
//!
//! Logout is advisory. The token lives in the client's cookie, and the
//! server keeps no list of issued tokens, so "logging out" means the client
//! stops presenting it. A copy kept elsewhere stays decodable until its
//! expiration time.

use std::time::Duration;

use quizgate_token::{Identity, SessionPayload, SessionToken, TokenCodec};

use crate::{CredentialStore, CredentialVerifier, IdentityError};

// ---------------------------------------------------------------------------
// IssuedSession / AuthState
// ---------------------------------------------------------------------------

/// The trust artifact handed back after a successful login.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    /// The payload that was signed into the token.
    pub payload: SessionPayload,
    /// The token to put in the session cookie.
    pub token: SessionToken,
    /// How long the client should keep the cookie.
    pub max_age: Duration,
}

impl IssuedSession {
    /// Who this session belongs to.
    pub fn identity(&self) -> &Identity {
        &self.payload.identity
    }
}

/// Where a client stands with the identity service.
#[derive(Debug, Clone)]
pub enum AuthState {
    /// No valid session.
    Anonymous,
    /// Holds a session minted by this service.
    Authenticated(Identity),
}

impl AuthState {
    /// Returns `true` in the `Authenticated` state.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// The authenticated identity, if any.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            Self::Anonymous => None,
        }
    }

    /// Authenticated → Anonymous. The only effect is on the caller's view;
    /// the token itself is untouched.
    pub fn logout(self) -> Self {
        if let Self::Authenticated(identity) = &self {
            tracing::info!(%identity, "session discarded by client logout");
        }
        Self::Anonymous
    }
}

// ---------------------------------------------------------------------------
// SessionIssuer
// ---------------------------------------------------------------------------

/// Verifies credentials and mints session tokens.
pub struct SessionIssuer<S: CredentialStore> {
    verifier: CredentialVerifier<S>,
    codec: TokenCodec,
}

impl<S: CredentialStore> SessionIssuer<S> {
    /// Creates an issuer that checks credentials with `verifier` and signs
    /// with `codec` (whose TTL is the session lifetime).
    pub fn new(verifier: CredentialVerifier<S>, codec: TokenCodec) -> Self {
        Self { verifier, codec }
    }

    /// Verifies `identity`/`secret` and, on success, mints a fresh session.
    ///
    /// The new payload names the (trimmed) identity, is marked permanent,
    /// and starts with no quiz state.
    ///
    /// # Errors
    /// - [`IdentityError::MissingInput`] — empty identity or secret
    /// - [`IdentityError::AuthenticationFailed`] — unknown user or wrong
    ///   password (indistinguishable by design)
    /// - [`IdentityError::Token`] — the session would not fit in a cookie
    pub async fn authenticate(
        &self,
        identity: &str,
        secret: &str,
    ) -> Result<IssuedSession, IdentityError> {
        if !self.verifier.verify(identity, secret).await? {
            tracing::debug!("credential check failed");
            return Err(IdentityError::AuthenticationFailed);
        }

        let payload = SessionPayload::new(identity.trim());
        let token = self.codec.issue(&payload)?;

        tracing::info!(identity = %payload.identity, "session issued");

        Ok(IssuedSession {
            payload,
            token,
            max_age: self.codec.ttl(),
        })
    }

    /// Runs the Anonymous → Authenticated transition.
    ///
    /// Returns the new state plus the issued session; on failure the state
    /// stays `Anonymous` and the error says why.
    pub async fn begin(
        &self,
        identity: &str,
        secret: &str,
    ) -> (AuthState, Result<IssuedSession, IdentityError>) {
        match self.authenticate(identity, secret).await {
            Ok(issued) => (
                AuthState::Authenticated(issued.identity().clone()),
                Ok(issued),
            ),
            Err(e) => (AuthState::Anonymous, Err(e)),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
