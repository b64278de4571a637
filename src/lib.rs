//! Library root for `thread-bot`.
//!
//! Thread-bot is a Slack bot designed to:
//! - Answer when it is mentioned, in a thread under the mentioning message
//! - Keep answering in threads it has replied in, without being re-mentioned
//! - Ignore redelivered events, since Slack delivers at least once
//!
//! Replies come from a pluggable responder (an echo by default). The
//! architecture is built around extensible traits so the chat platform and
//! the responder can be swapped out, or mocked in tests.

pub mod base;
pub mod interaction;
pub mod prelude;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the thread-bot runtime:
/// - Initializes the crypto provider
/// - Resolves the bot identity and builds the dispatcher
/// - Starts the event listener and periodic ledger compaction
pub async fn start(config: Config) -> Void {
    info!("Starting thread-bot ...");

    // Start the crypto provider.
    crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install the default crypto provider."))?;

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
