//! Typed errors surfaced by the dispatcher core.

use thiserror::Error;

/// The authentication probe against the chat platform failed.
///
/// Fatal at startup; the caller decides whether to retry.
#[derive(Debug, Error)]
#[error("failed to authenticate with the chat platform")]
pub struct AuthError {
    #[source]
    pub source: anyhow::Error,
}

/// A reply could not be delivered.
///
/// The event stays marked as seen, so the same delivery is never retried.
#[derive(Debug, Error)]
#[error("failed to deliver reply to `{channel}` at `{anchor}`")]
pub struct DeliveryError {
    pub channel: String,
    pub anchor: String,
    #[source]
    pub source: anyhow::Error,
}
