//! The identity side of Quizgate.
//!
//! This crate owns "who is logged in":
//!
//! 1. **Credentials** — checking a username/password against stored
//!    digests ([`CredentialStore`], [`CredentialVerifier`])
//! 2. **Issuance** — minting a session token after a successful check
//!    ([`SessionIssuer`])
//! 3. **Verification** — answering "is this token valid, and whose is it?"
//!    ([`SessionVerifier`])
//! 4. **Provisioning** — writing the credential file the identity service
//!    loads at startup ([`write_records`])
//!
//! # How it fits in the stack
//!
//! ```text
//! HTTP surface (quizgate)  ← /auth, /verify, /logout
//!     ↕
//! Identity layer (this crate)  ← credentials, issuance, verification
//!     ↕
//! Token layer (quizgate-token)  ← payload, signing, expiry
//! ```
//!
//! Nothing here keeps per-session state. Issued tokens are not recorded;
//! verification needs only the shared secret.

mod credentials;
mod error;
mod issuer;
mod provision;
mod store;
mod verifier;

pub use credentials::CredentialVerifier;
pub use error::IdentityError;
pub use issuer::{AuthState, IssuedSession, SessionIssuer};
pub use provision::{demo_records, parse_user_pair, write_records};
pub use store::{
    CredentialRecord, CredentialStore, DEMO_USERS, MAX_IDENTITY_LEN,
    MemoryCredentialStore, PasswordDigest,
};
pub use verifier::SessionVerifier;
