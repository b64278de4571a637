pub mod events;
pub mod slack;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::{
    base::types::{PostedMessage, Res, Void},
    interaction::dispatcher::Dispatcher,
};

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait covers every role the dispatcher needs from a chat platform:
/// authenticating the bot, posting replies, and delivering inbound events.
/// Implementing it allows the bot to run against a different platform, or
/// against a mock in tests.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Probe the platform with the bot's credentials.
    ///
    /// Returns the bot's own user id, which the classifier uses to detect
    /// mentions and to ignore the bot's own messages.
    async fn auth_test(&self) -> Res<String>;

    /// Post a message into a channel thread.
    ///
    /// `thread_ts` is the anchor the reply is threaded under.
    async fn post_message(&self, channel_id: &str, thread_ts: &str, text: &str) -> Res<PostedMessage>;

    /// Start the chat client listener.
    ///
    /// Runs until shutdown, handing every decoded inbound event to the
    /// dispatcher.
    async fn start(&self, dispatcher: Dispatcher) -> Void;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
