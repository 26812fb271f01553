//! Provisioning: producing the credential file the service loads.
//!
//! The file is a JSON array of [`CredentialRecord`]s holding SHA-256
//! digests, never plaintext. [`write_records`] refuses to write anything
//! [`MemoryCredentialStore::load`] would later reject.

use std::path::Path;

use crate::{CredentialRecord, DEMO_USERS, IdentityError, MemoryCredentialStore};

/// Parses an `IDENTITY:PASSWORD` pair into a record.
///
/// Splits on the first `:`, so passwords may contain colons. Both halves
/// are trimmed the same way the login check trims them.
///
/// # Errors
/// [`IdentityError::InvalidRecords`] if the colon is missing or either
/// half is empty.
pub fn parse_user_pair(pair: &str) -> Result<CredentialRecord, IdentityError> {
    let (identity, password) = pair.split_once(':').ok_or_else(|| {
        IdentityError::InvalidRecords("expected IDENTITY:PASSWORD".into())
    })?;
    let (identity, password) = (identity.trim(), password.trim());
    if identity.is_empty() || password.is_empty() {
        return Err(IdentityError::InvalidRecords(
            "identity and password must both be non-empty".into(),
        ));
    }
    Ok(CredentialRecord::from_password(identity, password))
}

/// Records for the built-in demo accounts.
pub fn demo_records() -> Vec<CredentialRecord> {
    DEMO_USERS
        .iter()
        .map(|(identity, password)| {
            CredentialRecord::from_password(identity, password)
        })
        .collect()
}

/// Writes `records` to `path` as a credential file.
///
/// Returns the number of identities written.
///
/// # Errors
/// - [`IdentityError::InvalidRecords`] — the records would not load back
///   (empty, over-long, or duplicate identities).
/// - [`IdentityError::Io`] — the file can't be written.
pub async fn write_records(
    path: impl AsRef<Path>,
    records: &[CredentialRecord],
) -> Result<usize, IdentityError> {
    let users = MemoryCredentialStore::from_records(records.iter().cloned())?.len();
    let json = serde_json::to_string_pretty(records)
        .map_err(|e| IdentityError::InvalidRecords(e.to_string()))?;
    tokio::fs::write(path.as_ref(), json).await?;

    tracing::info!(
        path = %path.as_ref().display(),
        users,
        "credential records written"
    );
    Ok(users)
}
