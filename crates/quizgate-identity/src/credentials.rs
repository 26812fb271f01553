//! The credential verifier: "is this the right password for this user?"

use std::sync::Arc;

use subtle::ConstantTimeEq;

use crate::{CredentialStore, IdentityError, PasswordDigest};

/// Checks identity/secret pairs against a [`CredentialStore`].
///
/// Stateless per call. The store sits behind an `Arc`, so cloning a
/// verifier is cheap and clones share the same read-only table.
pub struct CredentialVerifier<S: CredentialStore> {
    store: Arc<S>,
    /// Compared against when the identity is unknown, so an unknown user
    /// costs the same digest-and-compare as a known one.
    decoy: PasswordDigest,
}

impl<S: CredentialStore> CredentialVerifier<S> {
    /// Creates a verifier over `store`.
    pub fn new(store: S) -> Self {
        Self::from_shared(Arc::new(store))
    }

    /// Creates a verifier over an already shared store.
    pub fn from_shared(store: Arc<S>) -> Self {
        Self {
            store,
            decoy: PasswordDigest::of("\0quizgate-decoy\0"),
        }
    }

    /// Returns `Ok(true)` if `secret_text` is the password of `identity`.
    ///
    /// Both inputs are trimmed. Unknown identities return `Ok(false)`,
    /// exactly like a wrong password; the digest comparison is constant
    /// time in both cases.
    ///
    /// # Errors
    /// [`IdentityError::MissingInput`] if either input is empty. This is
    /// checked before the store is touched.
    pub async fn verify(
        &self,
        identity: &str,
        secret_text: &str,
    ) -> Result<bool, IdentityError> {
        let identity = identity.trim();
        let secret_text = secret_text.trim();
        if identity.is_empty() || secret_text.is_empty() {
            return Err(IdentityError::MissingInput);
        }

        let presented = PasswordDigest::of(secret_text);
        let (stored, known) = match self.store.lookup(identity).await {
            Some(stored) => (stored, true),
            None => (self.decoy, false),
        };

        let matches: bool =
            presented.as_bytes().ct_eq(stored.as_bytes()).into();
        Ok(matches && known)
    }
}

impl<S: CredentialStore> Clone for CredentialVerifier<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            decoy: self.decoy,
        }
    }
}
