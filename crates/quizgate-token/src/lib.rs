//! Session tokens for Quizgate.
//!
//! This crate is the one contract the identity service and the quiz
//! service share. It defines:
//!
//! - **Payload** ([`SessionPayload`], [`Identity`], [`QuestionId`]) — what
//!   a session carries.
//! - **Token codec** ([`TokenCodec`], [`SigningSecret`]) — how a payload
//!   becomes a signed, expiring, tamper-evident string and back.
//! - **Wire outcome** ([`VerifyOutcome`]) — the body of `GET /verify`.
//!
//! # Architecture
//!
//! ```text
//! identity service: credentials ─→ SessionPayload ─→ TokenCodec::issue ─→ cookie
//! quiz service:     cookie ─→ TokenCodec::decode ─→ SessionPayload (or "not authenticated")
//! ```
//!
//! There is no shared store. A token is trusted because it verifies under
//! the shared secret and hasn't expired, nothing else.

mod codec;
mod error;
mod payload;
mod secret;
mod token;

pub use codec::{Codec, JsonCodec};
pub use error::TokenError;
pub use payload::{
    Identity, QuestionId, SESSION_COOKIE, SessionPayload, VerifyOutcome,
};
pub use secret::{RECOMMENDED_SECRET_LEN, SigningSecret};
pub use token::{
    DEFAULT_TTL, MAX_TOKEN_LEN, SessionClaims, SessionToken, TokenCodec,
    unix_now,
};
