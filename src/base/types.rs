//! Shared types for the thread-bot.

use std::fmt;

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

// Keys.

/// Identifies one delivery of one message: `(channel, message ts)`.
///
/// Slack redelivers an event with the same channel and timestamp, so two
/// deliveries of the same logical event always produce equal keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventKey {
    pub channel: String,
    pub ts: String,
}

impl EventKey {
    pub fn new(channel: impl Into<String>, ts: impl Into<String>) -> Self {
        Self { channel: channel.into(), ts: ts.into() }
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.channel, self.ts)
    }
}

/// Identifies one conversation thread: `(channel, thread root ts)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThreadKey {
    pub channel: String,
    pub ts: String,
}

impl ThreadKey {
    pub fn new(channel: impl Into<String>, ts: impl Into<String>) -> Self {
        Self { channel: channel.into(), ts: ts.into() }
    }
}

impl fmt::Display for ThreadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.channel, self.ts)
    }
}

// Events.

/// A decoded chat message, independent of the transport it arrived on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// The channel the message was posted in.
    pub channel: String,
    /// The message timestamp (Slack's message id).
    pub ts: String,
    /// The thread root timestamp, when the message lives inside a thread.
    pub thread_ts: Option<String>,
    /// The user id of the author.
    pub author: String,
    /// The raw message text, mention markup included.
    pub text: String,
}

impl ChatMessage {
    pub fn event_key(&self) -> EventKey {
        EventKey::new(&self.channel, &self.ts)
    }
}

/// An inbound event, decided once at the transport boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// The bot was addressed directly (`app_mention`).
    Mention(ChatMessage),
    /// A plain channel or thread message.
    Message(ChatMessage),
    /// Anything else, including events missing required fields.
    Other,
}

impl InboundEvent {
    /// The message carried by this event, if any.
    pub fn message(&self) -> Option<&ChatMessage> {
        match self {
            InboundEvent::Mention(message) | InboundEvent::Message(message) => Some(message),
            InboundEvent::Other => None,
        }
    }
}

/// What the bot decided to do about an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Nothing to do.
    Ignore,
    /// Reply to a fresh mention, threaded under the mentioning message.
    Mention { channel: String, ts: String, text: String },
    /// Keep talking in a thread, threaded under its root.
    ThreadContinuation { channel: String, thread_ts: String, text: String },
}

impl Classification {
    /// The timestamp replies are threaded under.
    pub fn anchor(&self) -> Option<&str> {
        match self {
            Classification::Ignore => None,
            Classification::Mention { ts, .. } => Some(ts),
            Classification::ThreadContinuation { thread_ts, .. } => Some(thread_ts),
        }
    }

    /// The thread that becomes active once the reply is posted.
    pub fn thread_key(&self) -> Option<ThreadKey> {
        match self {
            Classification::Ignore => None,
            Classification::Mention { channel, ts, .. } => Some(ThreadKey::new(channel, ts)),
            Classification::ThreadContinuation { channel, thread_ts, .. } => Some(ThreadKey::new(channel, thread_ts)),
        }
    }
}

/// A message the bot successfully posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    pub channel: String,
    pub ts: String,
}

// Tests.
