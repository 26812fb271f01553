//! The process-wide signing secret.

use std::fmt;
use std::sync::Arc;

use crate::TokenError;

/// Below this many bytes a secret is accepted but worth a warning at boot.
pub const RECOMMENDED_SECRET_LEN: usize = 32;

/// The HMAC key shared by the identity service and the quiz service.
///
/// Loaded once at startup from configuration and immutable afterwards.
/// Both services must hold byte-identical secrets; if they don't, every
/// token minted by one looks forged to the other.
///
/// Cloning is cheap (`Arc`), and `Debug` never prints the key material.
#[derive(Clone)]
pub struct SigningSecret(Arc<[u8]>);

impl SigningSecret {
    /// Wraps raw key material.
    ///
    /// # Errors
    /// Returns [`TokenError::EmptySecret`] for a zero-length secret.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, TokenError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        Ok(Self(bytes.into()))
    }

    /// Length of the key in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`: empty secrets are rejected by [`new`](Self::new).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if the key is shorter than
    /// [`RECOMMENDED_SECRET_LEN`].
    pub fn is_weak(&self) -> bool {
        self.0.len() < RECOMMENDED_SECRET_LEN
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningSecret")
            .field("len", &self.0.len())
            .finish_non_exhaustive()
    }
}
