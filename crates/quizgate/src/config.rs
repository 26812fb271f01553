//! Configuration for the service binaries and the provisioning tool.
//!
//! CLI arguments with environment-variable fallbacks, using clap. Both
//! services take the same [`SessionArgs`]; deploying them with different
//! `SESSION_SECRET` values makes every cross-service token invalid.
//! [`ProvisionArgs`] writes the `CREDENTIALS_FILE` the identity service
//! reads.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser};
use quizgate_bridge::BridgeConfig;
use quizgate_identity::{CredentialRecord, MemoryCredentialStore, demo_records, parse_user_pair};
use quizgate_quiz::QuestionBank;
use quizgate_token::{SigningSecret, TokenCodec};

use crate::QuizgateError;

/// Session signing settings shared by both services.
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// Shared secret used to sign session cookies
    #[arg(long, env = "SESSION_SECRET", hide_env_values = true)]
    pub session_secret: String,

    /// Session lifetime in seconds
    #[arg(long, env = "SESSION_TTL_SECS", default_value = "1800")]
    pub session_ttl_secs: u64,
}

impl SessionArgs {
    /// Validates the arguments into [`SessionSettings`].
    pub fn settings(&self) -> Result<SessionSettings, QuizgateError> {
        SessionSettings::new(
            self.session_secret.as_bytes(),
            Duration::from_secs(self.session_ttl_secs),
        )
    }
}

/// The signing secret and lifetime, loaded once at boot.
///
/// Immutable afterwards; every request handler gets a clone of the codec.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    codec: TokenCodec,
}

impl SessionSettings {
    /// Rejects an empty secret or a zero TTL; warns on a short secret.
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, QuizgateError> {
        if ttl.is_zero() {
            return Err(QuizgateError::Config("session TTL must be positive".into()));
        }
        let secret = SigningSecret::new(secret.to_vec())?;
        if secret.is_weak() {
            tracing::warn!(
                len = secret.len(),
                "session secret is shorter than recommended; use at least 32 random bytes"
            );
        }
        Ok(Self {
            codec: TokenCodec::new(secret, ttl),
        })
    }

    /// The codec both services sign and verify with.
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn ttl(&self) -> Duration {
        self.codec.ttl()
    }
}

/// Quizgate identity service
#[derive(Parser, Debug, Clone)]
#[command(name = "identity-service")]
#[command(about = "Verifies credentials and issues session cookies")]
pub struct IdentityArgs {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:5001")]
    pub listen: SocketAddr,

    /// JSON file of `{"identity", "digest"}` records
    #[arg(long, env = "CREDENTIALS_FILE")]
    pub credentials_file: Option<PathBuf>,

    /// Seed the built-in demo accounts (admin, user1, demo)
    #[arg(long, env = "DEMO_USERS", default_value = "false")]
    pub demo_users: bool,

    /// Where to send the browser after a successful login
    #[arg(long, env = "HOME_URL", default_value = "/quiz")]
    pub home_url: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[command(flatten)]
    pub session: SessionArgs,
}

impl IdentityArgs {
    /// Builds the credential store: the file if given, otherwise the demo
    /// accounts if enabled.
    pub async fn credential_store(&self) -> Result<MemoryCredentialStore, QuizgateError> {
        match (&self.credentials_file, self.demo_users) {
            (Some(path), _) => Ok(MemoryCredentialStore::load(path).await?),
            (None, true) => {
                tracing::warn!("using built-in demo accounts");
                Ok(MemoryCredentialStore::demo())
            }
            (None, false) => Err(QuizgateError::Config(
                "no credentials: set CREDENTIALS_FILE or DEMO_USERS=true".into(),
            )),
        }
    }
}

/// Quizgate quiz service
#[derive(Parser, Debug, Clone)]
#[command(name = "quiz-service")]
#[command(about = "Serves the quiz to sessions issued by the identity service")]
pub struct QuizArgs {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:5002")]
    pub listen: SocketAddr,

    /// Base URL of the identity service
    #[arg(long, env = "AUTH_SERVICE_URL", default_value = "http://auth-service:5001")]
    pub auth_service_url: String,

    /// How long to wait for the identity service before verifying locally
    #[arg(long, env = "REMOTE_TIMEOUT_MS", default_value = "5000")]
    pub remote_timeout_ms: u64,

    /// Question bank file; the built-in bank is used when unset
    #[arg(long, env = "QUESTIONS_FILE")]
    pub questions_file: Option<PathBuf>,

    /// Where unauthenticated browsers are sent
    #[arg(long, env = "LOGIN_URL", default_value = "/login")]
    pub login_url: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[command(flatten)]
    pub session: SessionArgs,
}

impl QuizArgs {
    /// Remote verification settings for the trust bridge.
    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig {
            remote_timeout: Duration::from_millis(self.remote_timeout_ms),
        }
    }

    /// Loads `QUESTIONS_FILE`, or the built-in bank when unset.
    pub async fn question_bank(&self) -> Result<QuestionBank, QuizgateError> {
        let bank = match &self.questions_file {
            Some(path) => QuestionBank::load(path).await?,
            None => QuestionBank::builtin()?,
        };
        Ok(bank)
    }
}

/// Quizgate credential provisioning
#[derive(Parser, Debug, Clone)]
#[command(name = "provision-users")]
#[command(about = "Writes a credential file of SHA-256 password digests")]
pub struct ProvisionArgs {
    /// Credential file to write
    #[arg(long, short, env = "CREDENTIALS_FILE")]
    pub output: PathBuf,

    /// Include the demo accounts (admin, user1, demo)
    #[arg(long)]
    pub demo: bool,

    /// Replace the file if it already exists
    #[arg(long)]
    pub force: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Accounts to add, as IDENTITY:PASSWORD
    #[arg(value_name = "IDENTITY:PASSWORD", value_parser = parse_user)]
    pub users: Vec<CredentialRecord>,
}

fn parse_user(pair: &str) -> Result<CredentialRecord, String> {
    parse_user_pair(pair).map_err(|e| e.to_string())
}

impl ProvisionArgs {
    /// The demo accounts (if requested) followed by the listed users.
    pub fn records(&self) -> Vec<CredentialRecord> {
        let mut records = if self.demo { demo_records() } else { Vec::new() };
        records.extend(self.users.iter().cloned());
        records
    }

    /// Writes the credential file and returns how many users it holds.
    pub async fn provision(&self) -> Result<usize, QuizgateError> {
        let records = self.records();
        if records.is_empty() {
            return Err(QuizgateError::Config(
                "nothing to provision: pass --demo or IDENTITY:PASSWORD pairs".into(),
            ));
        }
        if !self.force && tokio::fs::try_exists(&self.output).await? {
            return Err(QuizgateError::Config(format!(
                "{} already exists; pass --force to replace it",
                self.output.display()
            )));
        }
        Ok(quizgate_identity::write_records(&self.output, &records).await?)
    }
}
