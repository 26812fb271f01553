//! Minting and checking signed session tokens.
//!
//! # Format
//!
//! ```text
//! BODY.SIG
//!
//! BODY = base64url(codec({"exp": <unix seconds>, "session": <SessionPayload>}))
//! SIG  = base64url(HMAC-SHA256(secret, CONTEXT || BODY))
//! ```
//!
//! Both parts use the URL-safe alphabet without padding, so the token can
//! go into a cookie unescaped. The signature covers the *encoded* body, so
//! the verifier checks it before parsing anything the client sent.
//!
//! # Fail-closed decoding
//!
//! [`TokenCodec::decode`] never panics and never returns a partial payload.
//! Any problem (shape, base64, signature, body, expiry) is an `Err`, and
//! callers treat every `Err` the same way: not authenticated.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::{Codec, JsonCodec, SessionPayload, SigningSecret, TokenError};

type HmacSha256 = Hmac<Sha256>;

/// Default session lifetime: 30 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// Cookies are capped at 4 KiB by browsers; anything longer isn't ours.
pub const MAX_TOKEN_LEN: usize = 4096;

/// Domain-separation label mixed into every signature. Bumping the version
/// invalidates all outstanding tokens.
const SIGNATURE_CONTEXT: &[u8] = b"quizgate.session.v1\0";

/// Current wall-clock time as Unix seconds.
///
/// Expiration is an absolute timestamp inside the token, so it has to be
/// wall-clock (not `Instant`) to mean the same thing in both services.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// SessionToken / SessionClaims
// ---------------------------------------------------------------------------

/// An encoded, signed session token. Opaque to everyone but [`TokenCodec`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    /// The token text, as stored in the cookie.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the token and returns its text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tokens are bearer credentials; keep them out of debug logs.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken({} bytes)", self.0.len())
    }
}

/// A successfully decoded token: the payload and when it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub payload: SessionPayload,
    /// Unix timestamp (seconds). The token is valid strictly before it.
    pub expires_at: u64,
}

#[derive(Serialize)]
struct ClaimsRef<'a> {
    exp: u64,
    session: &'a SessionPayload,
}

#[derive(Deserialize)]
struct ClaimsOwned {
    exp: u64,
    session: SessionPayload,
}

// ---------------------------------------------------------------------------
// TokenCodec
// ---------------------------------------------------------------------------

/// Encodes and decodes session tokens with a shared secret.
///
/// The codec has no mutable state: concurrent decodes of the same token
/// always agree, which is what lets the quiz service scale out without
/// coordinating with anyone.
///
/// ```rust
/// use std::time::Duration;
/// use quizgate_token::{SessionPayload, SigningSecret, TokenCodec};
///
/// let secret = SigningSecret::new("shared-secret-between-services").unwrap();
/// let codec = TokenCodec::new(secret, Duration::from_secs(1800));
///
/// let token = codec.issue(&SessionPayload::new("admin")).unwrap();
/// let payload = codec.decode(token.as_str()).unwrap();
/// assert_eq!(payload.identity.as_str(), "admin");
/// ```
#[derive(Debug, Clone)]
pub struct TokenCodec<C: Codec = JsonCodec> {
    secret: SigningSecret,
    ttl: Duration,
    codec: C,
}

impl TokenCodec<JsonCodec> {
    /// Creates a JSON-backed codec.
    pub fn new(secret: SigningSecret, ttl: Duration) -> Self {
        Self::with_codec(secret, ttl, JsonCodec)
    }
}

impl<C: Codec> TokenCodec<C> {
    /// Creates a codec that serializes claims with `codec`.
    pub fn with_codec(secret: SigningSecret, ttl: Duration, codec: C) -> Self {
        Self { secret, ttl, codec }
    }

    /// The lifetime given to freshly issued tokens.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mints a token for `payload` that expires `ttl` from now.
    ///
    /// # Errors
    /// Same as [`encode`](Self::encode).
    pub fn issue(
        &self,
        payload: &SessionPayload,
    ) -> Result<SessionToken, TokenError> {
        let expires_at = unix_now().saturating_add(self.ttl.as_secs());
        self.encode(payload, expires_at)
    }

    /// Mints a token for `payload` expiring at `expires_at` (Unix seconds).
    ///
    /// Deterministic: the same payload, secret, and expiry always produce
    /// the same token.
    ///
    /// # Errors
    /// - [`TokenError::TooLarge`] if the token would exceed
    ///   [`MAX_TOKEN_LEN`].
    /// - [`TokenError::Encode`] if the codec cannot serialize the payload.
    pub fn encode(
        &self,
        payload: &SessionPayload,
        expires_at: u64,
    ) -> Result<SessionToken, TokenError> {
        let claims = ClaimsRef {
            exp: expires_at,
            session: payload,
        };
        let body = URL_SAFE_NO_PAD.encode(self.codec.encode(&claims)?);

        let mut mac = self.mac()?;
        mac.update(body.as_bytes());
        let sig = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        let token = format!("{body}.{sig}");
        if token.len() > MAX_TOKEN_LEN {
            return Err(TokenError::TooLarge {
                len: token.len(),
                max: MAX_TOKEN_LEN,
            });
        }
        Ok(SessionToken(token))
    }

    /// Decodes a token and returns its payload.
    ///
    /// # Errors
    /// Any [`TokenError`] means the token must not be trusted.
    pub fn decode(&self, token: &str) -> Result<SessionPayload, TokenError> {
        self.decode_claims(token).map(|claims| claims.payload)
    }

    /// Decodes a token and returns its payload together with its expiry.
    ///
    /// # Errors
    /// Any [`TokenError`] means the token must not be trusted.
    pub fn decode_claims(
        &self,
        token: &str,
    ) -> Result<SessionClaims, TokenError> {
        self.decode_at(token, unix_now())
    }

    /// Like [`decode_claims`](Self::decode_claims) with an explicit "now".
    ///
    /// # Errors
    /// Any [`TokenError`] means the token must not be trusted.
    pub fn decode_at(
        &self,
        token: &str,
        now: u64,
    ) -> Result<SessionClaims, TokenError> {
        if token.is_empty() {
            return Err(TokenError::Malformed("empty token"));
        }
        if token.len() > MAX_TOKEN_LEN {
            return Err(TokenError::Malformed("token too long"));
        }

        let (body, sig) = token
            .split_once('.')
            .ok_or(TokenError::Malformed("missing signature separator"))?;
        if body.is_empty() || sig.is_empty() || sig.contains('.') {
            return Err(TokenError::Malformed("expected exactly two parts"));
        }

        let sig = URL_SAFE_NO_PAD
            .decode(sig)
            .map_err(|_| TokenError::Malformed("signature is not base64url"))?;

        // Signature first: nothing the client wrote is parsed until we
        // know we wrote it.
        let mut mac = self.mac()?;
        mac.update(body.as_bytes());
        mac.verify_slice(&sig)
            .map_err(|_| TokenError::BadSignature)?;

        let body = URL_SAFE_NO_PAD
            .decode(body)
            .map_err(|_| TokenError::Malformed("body is not base64url"))?;
        let claims: ClaimsOwned = self.codec.decode(&body)?;

        if now >= claims.exp {
            return Err(TokenError::Expired {
                expired_at: claims.exp,
            });
        }

        Ok(SessionClaims {
            payload: claims.session,
            expires_at: claims.exp,
        })
    }

    /// Decodes a token, collapsing every failure to `None`.
    pub fn verify(&self, token: &str) -> Option<SessionPayload> {
        self.decode(token).ok()
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        // HMAC accepts keys of any length; the only way this fails is a
        // key the `SigningSecret` constructor already refuses.
        let mut mac = <HmacSha256 as Mac>::new_from_slice(self.secret.as_bytes())
            .map_err(|_| TokenError::EmptySecret)?;
        mac.update(SIGNATURE_CONTEXT);
        Ok(mac)
    }
}

// =========================================================================
// Tests
// =========================================================================
