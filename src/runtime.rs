//! Runtime services and shared state for the thread-bot.

use std::time::Duration;

use crate::{
    interaction::{dispatcher::Dispatcher, identity::Identity, ledger::DedupLedger, registry::ThreadRegistry},
    prelude::*,
    service::{chat::ChatClient, responder::ResponderClient},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the configuration, the chat client, and the dispatcher.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The chat client instance.
    pub chat: ChatClient,
    /// The dispatcher every inbound event goes through.
    pub dispatcher: Dispatcher,
}

impl Runtime {
    /// Create a new runtime instance.
    ///
    /// Fails if the bot cannot authenticate with Slack.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the slack client.
        let chat = ChatClient::slack(&config)?;

        Self::with_chat(config, chat, ResponderClient::echo()).await
    }

    /// Create a runtime around existing chat and responder clients.
    #[instrument(skip_all)]
    pub async fn with_chat(config: Config, chat: ChatClient, responder: ResponderClient) -> Res<Self> {
        // Resolve who we are.
        let identity = Identity::resolve(&chat).await?;

        // Initialize the dispatcher state.
        let ledger = DedupLedger::new(config.dedup_threshold);
        let registry = ThreadRegistry::new();

        let dispatcher = Dispatcher::new(identity, ledger, registry, chat.clone(), responder);

        Ok(Self { config, chat, dispatcher })
    }

    pub async fn start(&self) -> Void {
        let compaction = self.dispatcher.spawn_compaction(Duration::from_secs(self.config.compact_interval_secs));

        let result = self.chat.start(self.dispatcher.clone()).await;

        compaction.abort();

        result
    }
}
