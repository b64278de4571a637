//! Admission and reply for inbound events.
//!
//! Every delivery goes through the same sequence: dedup check, classification,
//! then (for mentions and thread continuations) compose, post, and activate
//! the thread. Nothing persists between deliveries besides the ledger and the
//! registry, and neither lock is ever held across an `.await`.

use std::time::Duration;

use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, info, instrument};

use crate::{
    base::{
        error::DeliveryError,
        types::{Classification, InboundEvent},
    },
    service::{chat::ChatClient, responder::ResponderClient},
};

use super::{classifier::classify, identity::Identity, ledger::DedupLedger, registry::ThreadRegistry};

/// The orchestrating core.
///
/// It is designed to be trivially cloneable; clones share the same ledger and
/// registry, so one dispatcher can serve every concurrent delivery.
#[derive(Clone)]
pub struct Dispatcher {
    identity: Identity,
    ledger: DedupLedger,
    registry: ThreadRegistry,
    chat: ChatClient,
    responder: ResponderClient,
}

impl Dispatcher {
    pub fn new(identity: Identity, ledger: DedupLedger, registry: ThreadRegistry, chat: ChatClient, responder: ResponderClient) -> Self {
        Self {
            identity,
            ledger,
            registry,
            chat,
            responder,
        }
    }

    /// Handle one inbound delivery.
    ///
    /// Ignored and already-seen events succeed without side effects. A
    /// qualifying event is marked seen before the reply goes out, so a failed
    /// post is not retried on redelivery.
    #[instrument(name = "Dispatcher::handle", skip_all)]
    pub async fn handle(&self, event: &InboundEvent) -> Result<(), DeliveryError> {
        let Some(message) = event.message() else {
            debug!("Ignoring event without a message.");
            return Ok(());
        };

        let key = message.event_key();

        if self.ledger.seen(&key) {
            debug!("Skipping already processed event `{}`.", key);
            return Ok(());
        }

        let classification = classify(event, &self.identity, |thread| self.registry.is_active(thread));

        let text = match &classification {
            Classification::Ignore => {
                debug!("Ignoring event `{}`.", key);
                return Ok(());
            }
            Classification::Mention { channel, text, .. } => {
                info!("Received mention in `{}`.", channel);
                text
            }
            Classification::ThreadContinuation { channel, text, .. } => {
                info!("Received thread reply in `{}`.", channel);
                text
            }
        };

        let (Some(anchor), Some(thread)) = (classification.anchor(), classification.thread_key()) else {
            return Ok(());
        };

        self.ledger.mark(key);

        self.reply(&thread.channel, anchor, text).await?;

        self.registry.activate(thread);

        Ok(())
    }

    /// Compose a reply and post it under `anchor`.
    async fn reply(&self, channel: &str, anchor: &str, text: &str) -> Result<(), DeliveryError> {
        let failed = |source: anyhow::Error| DeliveryError {
            channel: channel.to_string(),
            anchor: anchor.to_string(),
            source,
        };

        let response = self.responder.compose(text).await.map_err(failed)?;
        let posted = self.chat.post_message(channel, anchor, &response).await.map_err(failed)?;

        debug!("Posted reply `{}` in `{}`.", posted.ts, posted.channel);

        Ok(())
    }

    /// Reset the dedup ledger if it has outgrown its threshold.
    pub fn compact(&self) -> bool {
        let reset = self.ledger.compact();

        if reset {
            info!("Dedup ledger exceeded {} entries and was reset.", self.ledger.threshold());
        }

        reset
    }

    /// Run [`Dispatcher::compact`] every `period` on a background task.
    pub fn spawn_compaction(&self, period: Duration) -> JoinHandle<()> {
        let dispatcher = self.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            // The first tick completes immediately.
            interval.tick().await;

            loop {
                interval.tick().await;
                dispatcher.compact();
            }
        })
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn ledger(&self) -> &DedupLedger {
        &self.ledger
    }

    pub fn registry(&self) -> &ThreadRegistry {
        &self.registry
    }
}
