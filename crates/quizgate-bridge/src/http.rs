//! HTTP remote verifier using `reqwest`.
//!
//! Calls the identity service's `GET /verify`, forwarding the presented
//! token as the session cookie, exactly as a browser would.

use std::time::Duration;

use quizgate_token::{SESSION_COOKIE, VerifyOutcome};
use reqwest::StatusCode;

use crate::{BridgeError, RemoteVerifier};

/// A [`RemoteVerifier`] that asks the identity service over HTTP.
///
/// Status mapping:
///
/// | Response | Result |
/// |---|---|
/// | 200 + outcome body | `Ok(outcome)` (authenticated or not, as the body says) |
/// | 401 / 403 | `Ok(unauthenticated)`, an explicit rejection |
/// | anything else, bad body, network error | `Err(..)`, meaning fall back |
#[derive(Debug, Clone)]
pub struct HttpRemoteVerifier {
    client: reqwest::Client,
    verify_url: String,
    timeout: Duration,
}

impl HttpRemoteVerifier {
    /// Creates a verifier for the identity service at `base_url`
    /// (e.g. `http://auth-service:5001`).
    ///
    /// `timeout` bounds the whole request, connect included. The
    /// [`TrustBridge`](crate::TrustBridge) applies its own bound on top.
    ///
    /// # Errors
    /// Returns [`BridgeError::Unreachable`] if the HTTP client can't be
    /// built (e.g. no TLS backend).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BridgeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| BridgeError::Unreachable(e.to_string()))?;

        let verify_url = format!("{}/verify", base_url.trim_end_matches('/'));
        tracing::info!(%verify_url, ?timeout, "remote session verifier configured");

        Ok(Self {
            client,
            verify_url,
            timeout,
        })
    }

    /// The full URL of the verification endpoint.
    pub fn verify_url(&self) -> &str {
        &self.verify_url
    }
}

impl RemoteVerifier for HttpRemoteVerifier {
    async fn verify(&self, token: &str) -> Result<VerifyOutcome, BridgeError> {
        let response = self
            .client
            .get(&self.verify_url)
            .header(reqwest::header::COOKIE, format!("{SESSION_COOKIE}={token}"))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BridgeError::Timeout(self.timeout)
                } else {
                    BridgeError::Unreachable(e.to_string())
                }
            })?;

        match response.status() {
            StatusCode::OK => response
                .json::<VerifyOutcome>()
                .await
                .map_err(|e| BridgeError::InvalidResponse(e.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Ok(VerifyOutcome::unauthenticated())
            }
            other => Err(BridgeError::UnexpectedStatus(other.as_u16())),
        }
    }
}
