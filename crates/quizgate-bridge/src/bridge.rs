//! The trust bridge: remote first, local on failure.

use std::sync::Arc;
use std::time::Duration;

use quizgate_token::{Identity, TokenCodec, VerifyOutcome};

use crate::{RemoteVerifier, TrustDecision};

/// Default bound on a single remote verification.
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(5);

/// Tuning for a [`TrustBridge`].
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// How long to wait for the identity service before falling back.
    pub remote_timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }
}

/// Where a [`Resolution`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustSource {
    /// The identity service answered.
    Remote,
    /// The identity service was unavailable; the token was decoded here.
    LocalFallback,
    /// No token was presented, so nobody was asked.
    NoToken,
}

/// A final, definitive trust answer for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Whether the caller is authenticated, and as whom.
    pub outcome: VerifyOutcome,
    /// Which path produced the outcome.
    pub source: TrustSource,
}

impl Resolution {
    /// Returns `true` if the caller is authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.outcome.is_authenticated()
    }

    /// The authenticated identity, if any.
    pub fn identity(&self) -> Option<&Identity> {
        self.outcome.identity()
    }
}

/// Resolves presented tokens to a trust decision.
///
/// Each call makes at most one remote attempt, bounded by
/// [`BridgeConfig::remote_timeout`]. There are no retries; if that one
/// attempt gives no definitive answer the token is decoded locally with the
/// shared secret, which is exactly what the identity service would have done.
///
/// The bridge holds no mutable state, so one instance serves every request
/// concurrently.
pub struct TrustBridge<R> {
    remote: Arc<R>,
    codec: TokenCodec,
    config: BridgeConfig,
}

impl<R> Clone for TrustBridge<R> {
    fn clone(&self) -> Self {
        Self {
            remote: Arc::clone(&self.remote),
            codec: self.codec.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R: RemoteVerifier> TrustBridge<R> {
    /// Creates a bridge asking `remote` first and falling back to `codec`.
    pub fn new(remote: R, codec: TokenCodec, config: BridgeConfig) -> Self {
        Self {
            remote: Arc::new(remote),
            codec,
            config,
        }
    }

    /// The codec used for local fallback decoding.
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Asks the identity service once.
    ///
    /// Transport errors, non-definitive statuses and the timeout all map to
    /// [`TrustDecision::TransportUnavailable`].
    pub async fn remote_decision(&self, token: &str) -> TrustDecision {
        let bound = self.config.remote_timeout;
        match tokio::time::timeout(bound, self.remote.verify(token)).await {
            Ok(Ok(outcome)) => TrustDecision::from_outcome(outcome),
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "remote verification failed");
                TrustDecision::TransportUnavailable
            }
            Err(_) => {
                tracing::debug!(?bound, "remote verification timed out");
                TrustDecision::TransportUnavailable
            }
        }
    }

    /// Decodes `token` with the shared secret, without any network.
    pub fn local_decision(&self, token: &str) -> TrustDecision {
        match self.codec.decode(token) {
            Ok(payload) => TrustDecision::Authenticated(payload.identity),
            Err(e) => {
                tracing::debug!(error = %e, "local token decode rejected");
                TrustDecision::Unauthenticated
            }
        }
    }

    /// Produces the definitive answer for a request.
    ///
    /// A missing token is unauthenticated without consulting anyone.
    pub async fn resolve(&self, token: Option<&str>) -> Resolution {
        let Some(token) = token else {
            return Resolution {
                outcome: VerifyOutcome::unauthenticated(),
                source: TrustSource::NoToken,
            };
        };

        let (decision, source) = match self.remote_decision(token).await {
            TrustDecision::TransportUnavailable => {
                tracing::warn!("identity service unavailable, verifying session locally");
                (self.local_decision(token), TrustSource::LocalFallback)
            }
            definitive => (definitive, TrustSource::Remote),
        };

        let outcome = match decision {
            TrustDecision::Authenticated(identity) => VerifyOutcome::authenticated(identity),
            _ => VerifyOutcome::unauthenticated(),
        };

        Resolution { outcome, source }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use quizgate_token::{SessionPayload, SigningSecret};

    use super::*;
    use crate::BridgeError;

    const SECRET: &str = "bridge-test-secret";

    fn codec() -> TokenCodec {
        TokenCodec::new(SigningSecret::new(SECRET).unwrap(), Duration::from_secs(1800))
    }

    fn token_for(identity: &str) -> String {
        codec()
            .issue(&SessionPayload::new(identity))
            .unwrap()
            .into_string()
    }

    /// Always fails as if the identity service were down.
    struct Down {
        calls: AtomicUsize,
    }

    impl Down {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl RemoteVerifier for Down {
        async fn verify(&self, _token: &str) -> Result<VerifyOutcome, BridgeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(BridgeError::Unreachable("connection refused".into()))
        }
    }

    /// Never answers within any sensible bound.
    struct Hanging;

    impl RemoteVerifier for Hanging {
        async fn verify(&self, _token: &str) -> Result<VerifyOutcome, BridgeError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(VerifyOutcome::unauthenticated())
        }
    }

    /// Returns a fixed answer regardless of the token.
    struct Fixed(VerifyOutcome);

    impl RemoteVerifier for Fixed {
        async fn verify(&self, _token: &str) -> Result<VerifyOutcome, BridgeError> {
            Ok(self.0.clone())
        }
    }

    fn bridge<R: RemoteVerifier>(remote: R) -> TrustBridge<R> {
        TrustBridge::new(remote, codec(), BridgeConfig::default())
    }

    #[tokio::test]
    async fn test_resolve_no_token_skips_remote() {
        let b = bridge(Down::new());

        let r = b.resolve(None).await;

        assert!(!r.is_authenticated());
        assert_eq!(r.source, TrustSource::NoToken);
        assert_eq!(b.remote.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_resolve_unreachable_falls_back_to_local() {
        let b = bridge(Down::new());
        let token = token_for("admin");

        let r = b.resolve(Some(&token)).await;

        assert!(r.is_authenticated());
        assert_eq!(r.identity(), Some(&Identity::from("admin")));
        assert_eq!(r.source, TrustSource::LocalFallback);
        assert_eq!(b.remote.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_resolve_unreachable_with_junk_token_is_unauthenticated() {
        let r = bridge(Down::new()).resolve(Some("junk.token")).await;

        assert!(!r.is_authenticated());
        assert_eq!(r.source, TrustSource::LocalFallback);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_slow_remote_times_out_and_falls_back() {
        let b = TrustBridge::new(
            Hanging,
            codec(),
            BridgeConfig {
                remote_timeout: Duration::from_secs(5),
            },
        );
        let token = token_for("user1");
        let started = tokio::time::Instant::now();

        let r = b.resolve(Some(&token)).await;

        assert!(r.is_authenticated());
        assert_eq!(r.source, TrustSource::LocalFallback);
        assert!(started.elapsed() < Duration::from_secs(6));
    }

    #[tokio::test]
    async fn test_resolve_remote_rejection_is_final() {
        // A perfectly valid token, but the identity service says no.
        let b = bridge(Fixed(VerifyOutcome::unauthenticated()));
        let token = token_for("admin");

        let r = b.resolve(Some(&token)).await;

        assert!(!r.is_authenticated());
        assert_eq!(r.source, TrustSource::Remote);
    }

    #[tokio::test]
    async fn test_resolve_remote_acceptance_is_used() {
        let b = bridge(Fixed(VerifyOutcome::authenticated("demo".into())));

        let r = b.resolve(Some("opaque")).await;

        assert_eq!(r.identity(), Some(&Identity::from("demo")));
        assert_eq!(r.source, TrustSource::Remote);
    }

    #[tokio::test]
    async fn test_resolve_concurrent_requests_all_answer() {
        let b = bridge(Down::new());
        let token = token_for("admin");

        let mut handles = Vec::new();
        for _ in 0..100 {
            let b = b.clone();
            let token = token.clone();
            handles.push(tokio::spawn(async move { b.resolve(Some(&token)).await }));
        }

        for h in handles {
            assert!(h.await.unwrap().is_authenticated());
        }
        assert_eq!(b.remote.calls.load(Ordering::SeqCst), 100);
    }

    #[test]
    fn test_local_decision_foreign_secret_rejected() {
        let other = TokenCodec::new(
            SigningSecret::new("elsewhere").unwrap(),
            Duration::from_secs(60),
        );
        let token = other.issue(&SessionPayload::new("admin")).unwrap();

        let d = bridge(Down::new()).local_decision(token.as_str());

        assert_eq!(d, TrustDecision::Unauthenticated);
    }
}
