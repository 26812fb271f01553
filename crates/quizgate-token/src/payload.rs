//! The data carried inside a session token, and the `/verify` wire type.
//!
//! Everything in this module travels between the two services: the
//! identity service writes a [`SessionPayload`] into a token, the quiz
//! service reads (and updates) it, and the Trust Bridge exchanges
//! [`VerifyOutcome`] values over HTTP.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the cookie that carries the session token in both services.
pub const SESSION_COOKIE: &str = "session";

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The unique name of an authenticated user.
///
/// A newtype over `String` so an identity can't be confused with a password
/// or a token in a function signature. `#[serde(transparent)]` keeps it a
/// plain JSON string on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Wraps a name. No validation happens here; the credential verifier
    /// decides which names are acceptable.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Identity {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Identifier of a question in the quiz bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub u64);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q-{}", self.0)
    }
}

impl From<u64> for QuestionId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// SessionPayload
// ---------------------------------------------------------------------------

/// The state carried inside a session token.
///
/// There is no server-side copy of this value. It lives in the client's
/// cookie, is decoded at the start of a request, may be modified by the
/// handler, and is re-encoded into the response. Its lifetime is bounded
/// by the token's expiration.
///
/// `answered_questions` is a `BTreeSet` rather than a `HashSet` so the
/// serialized form is ordered and encoding stays deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPayload {
    /// Who this session belongs to.
    pub identity: Identity,

    /// Set by the issuer on login; the cookie outlives the browser session.
    #[serde(default)]
    pub permanent: bool,

    /// Accumulated quiz score.
    #[serde(default)]
    pub score: u32,

    /// Questions already consumed in this session.
    #[serde(default)]
    pub answered_questions: BTreeSet<QuestionId>,
}

impl SessionPayload {
    /// Creates a fresh, permanent payload for a newly authenticated user.
    pub fn new(identity: impl Into<Identity>) -> Self {
        Self {
            identity: identity.into(),
            permanent: true,
            score: 0,
            answered_questions: BTreeSet::new(),
        }
    }

    /// Returns `true` if the question was already consumed.
    pub fn has_answered(&self, id: QuestionId) -> bool {
        self.answered_questions.contains(&id)
    }

    /// Records a consumed question. Returns `false` if it was already there.
    pub fn mark_answered(&mut self, id: QuestionId) -> bool {
        self.answered_questions.insert(id)
    }
}

// ---------------------------------------------------------------------------
// VerifyOutcome
// ---------------------------------------------------------------------------

/// The answer to "is this token trustworthy, and whose is it?".
///
/// This is both the return value of the identity service's session
/// verifier and the JSON body of `GET /verify`:
///
/// ```text
/// {"authenticated": true, "identity": "admin"}
/// {"authenticated": false}
/// ```
///
/// `identity` is only ever present when `authenticated` is `true`; the
/// constructors are the only way to build one, so that invariant holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyOutcome {
    authenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    identity: Option<Identity>,
}

impl VerifyOutcome {
    /// A positive outcome naming `identity`.
    pub fn authenticated(identity: Identity) -> Self {
        Self {
            authenticated: true,
            identity: Some(identity),
        }
    }

    /// A negative outcome. Deliberately carries no reason.
    pub fn unauthenticated() -> Self {
        Self {
            authenticated: false,
            identity: None,
        }
    }

    /// Returns `true` if the token was accepted.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated && self.identity.is_some()
    }

    /// The identity named by the token, if it was accepted.
    pub fn identity(&self) -> Option<&Identity> {
        if self.authenticated {
            self.identity.as_ref()
        } else {
            None
        }
    }

    /// Consumes the outcome and returns the identity, if accepted.
    pub fn into_identity(self) -> Option<Identity> {
        if self.authenticated { self.identity } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_payload_new_is_permanent_and_empty() {
        let payload = SessionPayload::new("admin");

        assert_eq!(payload.identity.as_str(), "admin");
        assert!(payload.permanent);
        assert_eq!(payload.score, 0);
        assert!(payload.answered_questions.is_empty());
    }

    #[test]
    fn test_mark_answered_twice_returns_false() {
        let mut payload = SessionPayload::new("admin");

        assert!(payload.mark_answered(QuestionId(7)));
        assert!(!payload.mark_answered(QuestionId(7)));
        assert!(payload.has_answered(QuestionId(7)));
    }

    #[test]
    fn test_session_payload_missing_state_fields_use_defaults() {
        let payload: SessionPayload =
            serde_json::from_str(r#"{"identity":"demo"}"#).unwrap();

        assert_eq!(payload.identity, Identity::from("demo"));
        assert!(!payload.permanent);
        assert_eq!(payload.score, 0);
    }

    #[test]
    fn test_verify_outcome_authenticated_serializes_identity() {
        let json = serde_json::to_value(VerifyOutcome::authenticated(
            Identity::from("admin"),
        ))
        .unwrap();

        assert_eq!(
            json,
            serde_json::json!({"authenticated": true, "identity": "admin"})
        );
    }

    #[test]
    fn test_verify_outcome_unauthenticated_omits_identity() {
        let json =
            serde_json::to_value(VerifyOutcome::unauthenticated()).unwrap();

        assert_eq!(json, serde_json::json!({"authenticated": false}));
    }

    #[test]
    fn test_verify_outcome_identity_hidden_when_not_authenticated() {
        // A hostile or buggy peer could send an identity alongside
        // `authenticated: false`; it must never be surfaced.
        let outcome: VerifyOutcome = serde_json::from_str(
            r#"{"authenticated": false, "identity": "admin"}"#,
        )
        .unwrap();

        assert!(!outcome.is_authenticated());
        assert!(outcome.identity().is_none());
        assert!(outcome.into_identity().is_none());
    }

    #[test]
    fn test_question_id_display() {
        assert_eq!(QuestionId(12).to_string(), "Q-12");
    }
}
