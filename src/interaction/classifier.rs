//! Decides whether an inbound event deserves a reply.

use crate::base::types::{ChatMessage, Classification, InboundEvent, ThreadKey};

use super::identity::Identity;

/// Classify an event, in priority order:
///
/// 1. The bot's own messages are ignored.
/// 2. Mentions are answered, with the mention markup stripped.
/// 3. Thread messages are answered when the thread is active or the bot is
///    mentioned in them. The text is passed through untouched.
/// 4. Everything else is ignored.
pub fn classify(event: &InboundEvent, identity: &Identity, is_active: impl Fn(&ThreadKey) -> bool) -> Classification {
    match event {
        InboundEvent::Mention(message) if !identity.is(&message.author) => Classification::Mention {
            channel: message.channel.clone(),
            ts: message.ts.clone(),
            text: strip_mention(&message.text, identity),
        },
        InboundEvent::Message(message) if !identity.is(&message.author) => classify_message(message, identity, is_active),
        _ => Classification::Ignore,
    }
}

fn classify_message(message: &ChatMessage, identity: &Identity, is_active: impl Fn(&ThreadKey) -> bool) -> Classification {
    let Some(thread_ts) = &message.thread_ts else {
        return Classification::Ignore;
    };

    let thread = ThreadKey::new(&message.channel, thread_ts);

    // Unlike a mention, a re-mention inside a thread keeps its markup.
    if is_active(&thread) || message.text.contains(&identity.mention_token()) {
        return Classification::ThreadContinuation {
            channel: message.channel.clone(),
            thread_ts: thread_ts.clone(),
            text: message.text.clone(),
        };
    }

    Classification::Ignore
}

fn strip_mention(text: &str, identity: &Identity) -> String {
    text.replace(&identity.mention_token(), "").trim().to_string()
}
