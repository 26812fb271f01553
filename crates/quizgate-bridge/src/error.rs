/// Errors on the remote leg of trust resolution.
///
/// Every variant means the same thing to the [`TrustBridge`](crate::TrustBridge):
/// the identity service gave no definitive answer, so fall back to local
/// decoding. None of these ever reach an end user.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The remote call did not finish within the configured bound.
    #[error("remote verification timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Connecting or talking to the identity service failed.
    #[error("remote verification unreachable: {0}")]
    Unreachable(String),

    /// The identity service answered with a status that is neither
    /// acceptance nor rejection (e.g. 500 or 502 from a proxy).
    #[error("unexpected status {0} from identity service")]
    UnexpectedStatus(u16),

    /// The response body was not a verification outcome.
    #[error("invalid verification response: {0}")]
    InvalidResponse(String),
}
