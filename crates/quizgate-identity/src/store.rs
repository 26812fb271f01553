//! Credential storage: where password digests live.
//!
//! Quizgate doesn't care what backs the credential table — a relational
//! database, an LDAP bridge, a file baked into a container. It defines the
//! [`CredentialStore`] trait: a single async lookup from identity name to
//! stored digest. [`MemoryCredentialStore`] is the implementation the
//! services ship with; it is filled at provisioning time and read-only
//! afterwards, so any number of requests can read it concurrently.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::IdentityError;

/// The demo accounts as `(identity, password)`.
pub const DEMO_USERS: &[(&str, &str)] = &[
    ("admin", "admin123"),
    ("user1", "pass123"),
    ("demo", "demo456"),
];

/// Longest identity name a store accepts, in bytes.
///
/// The identity travels inside every session cookie, which is capped at
/// [`MAX_TOKEN_LEN`](quizgate_token::MAX_TOKEN_LEN); a name this long still
/// leaves room for the quiz state.
pub const MAX_IDENTITY_LEN: usize = 256;

// ---------------------------------------------------------------------------
// PasswordDigest
// ---------------------------------------------------------------------------

/// A one-way SHA-256 digest of a password. Plaintext is never stored.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PasswordDigest([u8; 32]);

impl PasswordDigest {
    /// Digests `secret_text` (its UTF-8 bytes).
    pub fn of(secret_text: &str) -> Self {
        Self(Sha256::digest(secret_text.as_bytes()).into())
    }

    /// Parses a 64-character hex digest, as stored in credential files.
    ///
    /// # Errors
    /// Returns [`IdentityError::InvalidRecords`] for bad hex or length.
    pub fn from_hex(hex_digest: &str) -> Result<Self, IdentityError> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(hex_digest.trim(), &mut bytes).map_err(|e| {
            IdentityError::InvalidRecords(format!("bad digest: {e}"))
        })?;
        Ok(Self(bytes))
    }

    /// Lowercase hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub(crate) fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(..)")
    }
}

// ---------------------------------------------------------------------------
// CredentialRecord
// ---------------------------------------------------------------------------

/// One row of the credential table, in its on-disk JSON form:
///
/// ```json
/// {"identity": "admin", "digest": "240be518fabd2724ddb6f04eeb1da5967448d7e831c08c8fa822809f74c720a9"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub identity: String,
    pub digest: String,
}

impl CredentialRecord {
    /// Builds a record from a plaintext password (provisioning only).
    pub fn from_password(identity: &str, password: &str) -> Self {
        Self {
            identity: identity.to_string(),
            digest: PasswordDigest::of(password).to_hex(),
        }
    }
}

// ---------------------------------------------------------------------------
// CredentialStore
// ---------------------------------------------------------------------------

/// Looks up the stored digest for an identity.
///
/// # Trait bounds
///
/// - `Send + Sync` → the store is shared by every request handler.
/// - `'static` → it lives as long as the server.
///
/// The returned future must be `Send` so handlers can hold it across
/// `.await` on Tokio's multi-threaded runtime.
///
/// # Example
///
/// ```rust
/// use quizgate_identity::{CredentialStore, PasswordDigest};
///
/// /// Everyone's password is "letmein". Tests only!
/// struct OpenDoor;
///
/// impl CredentialStore for OpenDoor {
///     async fn lookup(&self, _identity: &str) -> Option<PasswordDigest> {
///         Some(PasswordDigest::of("letmein"))
///     }
/// }
/// ```
pub trait CredentialStore: Send + Sync + 'static {
    /// Returns the digest stored for `identity`, or `None` if unknown.
    fn lookup(
        &self,
        identity: &str,
    ) -> impl std::future::Future<Output = Option<PasswordDigest>> + Send;
}

// ---------------------------------------------------------------------------
// MemoryCredentialStore
// ---------------------------------------------------------------------------

/// An in-memory credential table keyed by unique identity name.
///
/// Built once (from code, a JSON file, or the demo set) and then shared
/// behind an `Arc`; there are no writes on the request path.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    records: HashMap<String, PasswordDigest>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The [`DEMO_USERS`] accounts.
    pub fn demo() -> Self {
        DEMO_USERS
            .iter()
            .fold(Self::new(), |store, (identity, password)| {
                store.with_user(identity, password)
            })
    }

    /// Adds a user from a plaintext password (builder style).
    pub fn with_user(mut self, identity: &str, password: &str) -> Self {
        self.records
            .insert(identity.to_string(), PasswordDigest::of(password));
        self
    }

    /// Inserts a stored record.
    ///
    /// # Errors
    /// - [`IdentityError::InvalidRecords`] — empty identity, an identity
    ///   longer than [`MAX_IDENTITY_LEN`], bad digest, or an identity that
    ///   is already present (names are unique).
    pub fn insert(
        &mut self,
        record: CredentialRecord,
    ) -> Result<(), IdentityError> {
        let identity = record.identity.trim();
        if identity.is_empty() {
            return Err(IdentityError::InvalidRecords(
                "empty identity".into(),
            ));
        }
        if identity.len() > MAX_IDENTITY_LEN {
            return Err(IdentityError::InvalidRecords(format!(
                "identity of {} bytes exceeds {MAX_IDENTITY_LEN}",
                identity.len()
            )));
        }
        if self.records.contains_key(identity) {
            return Err(IdentityError::InvalidRecords(format!(
                "duplicate identity {identity:?}"
            )));
        }
        let digest = PasswordDigest::from_hex(&record.digest)?;
        self.records.insert(identity.to_string(), digest);
        Ok(())
    }

    /// Builds a store from a list of records.
    ///
    /// # Errors
    /// See [`insert`](Self::insert).
    pub fn from_records(
        records: impl IntoIterator<Item = CredentialRecord>,
    ) -> Result<Self, IdentityError> {
        let mut store = Self::new();
        for record in records {
            store.insert(record)?;
        }
        Ok(store)
    }

    /// Loads a JSON array of [`CredentialRecord`]s from `path`.
    ///
    /// # Errors
    /// - [`IdentityError::Io`] — the file can't be read.
    /// - [`IdentityError::InvalidRecords`] — bad JSON or bad records.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, IdentityError> {
        let text = tokio::fs::read_to_string(path.as_ref()).await?;
        let records: Vec<CredentialRecord> = serde_json::from_str(&text)
            .map_err(|e| IdentityError::InvalidRecords(e.to_string()))?;
        let store = Self::from_records(records)?;
        tracing::info!(
            path = %path.as_ref().display(),
            users = store.len(),
            "credential records loaded"
        );
        Ok(store)
    }

    /// Number of stored identities.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no identities are stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl CredentialStore for MemoryCredentialStore {
    async fn lookup(&self, identity: &str) -> Option<PasswordDigest> {
        self.records.get(identity).copied()
    }
}
