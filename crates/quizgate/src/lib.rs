//! # Quizgate
//!
//! Two services that share a login without sharing a database.
//!
//! The **identity service** checks credentials and hands the browser a
//! signed session cookie. The **quiz service** accepts that cookie: it asks
//! the identity service to confirm it, and if the identity service can't be
//! reached it checks the signature itself with the shared secret.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quizgate::prelude::*;
//!
//! # async fn run() -> Result<(), QuizgateError> {
//! let settings = SessionSettings::new(b"a-long-random-shared-secret-value", DEFAULT_TTL)?;
//!
//! let identity = IdentityServer::builder()
//!     .bind("127.0.0.1:5001")
//!     .build(MemoryCredentialStore::demo(), settings.codec().clone())
//!     .await?;
//!
//! let quiz = QuizServer::builder()
//!     .bind("127.0.0.1:5002")
//!     .build("http://127.0.0.1:5001", settings.codec().clone())
//!     .await?;
//!
//! tokio::try_join!(identity.run(), quiz.run())?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod cookie;
mod error;
pub mod identity_server;
pub mod quiz_server;
mod server;

pub use error::QuizgateError;
pub use server::{HealthResponse, health, init_tracing};
pub(crate) use server::serve;

/// Everything needed to run or embed the services.
pub mod prelude {
    pub use crate::QuizgateError;
    pub use crate::config::{IdentityArgs, ProvisionArgs, QuizArgs, SessionArgs, SessionSettings};
    pub use crate::identity_server::{IdentityServer, IdentityServerBuilder};
    pub use crate::quiz_server::{QuizServer, QuizServerBuilder, RequestSession};

    pub use quizgate_bridge::{
        BridgeConfig, BridgeError, HttpRemoteVerifier, RemoteVerifier, Resolution, TrustBridge,
        TrustDecision, TrustSource,
    };
    pub use quizgate_identity::{
        CredentialStore, IdentityError, MemoryCredentialStore, SessionIssuer, SessionVerifier,
    };
    pub use quizgate_quiz::{Answer, QuestionBank, QuizError};
    pub use quizgate_token::{
        DEFAULT_TTL, Identity, QuestionId, SessionPayload, SessionToken, SigningSecret,
        TokenCodec, TokenError, VerifyOutcome,
    };
}
