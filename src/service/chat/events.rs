//! Decoding of Slack push events into transport-independent inbound events.
//!
//! Malformed or irrelevant events decode to [`InboundEvent::Other`] rather
//! than failing, since the upstream event shapes evolve.

use slack_morphism::prelude::*;

use crate::base::types::{ChatMessage, InboundEvent};

/// Decode the body of an event callback.
pub fn decode_event(body: &SlackEventCallbackBody) -> InboundEvent {
    match body {
        SlackEventCallbackBody::AppMention(event) => decode_app_mention(event),
        SlackEventCallbackBody::Message(event) => decode_message(event),
        _ => InboundEvent::Other,
    }
}

fn decode_app_mention(event: &SlackAppMentionEvent) -> InboundEvent {
    let message = chat_message(
        Some(&event.channel),
        &event.origin,
        Some(&event.user),
        event.content.text.as_deref(),
    );

    message.map_or(InboundEvent::Other, InboundEvent::Mention)
}

fn decode_message(event: &SlackMessageEvent) -> InboundEvent {
    // Edits, deletions, joins and the like are not conversation.
    let conversational = match &event.subtype {
        None => true,
        Some(subtype) => matches!(subtype, SlackMessageEventType::ThreadBroadcast | SlackMessageEventType::FileShare),
    };

    if !conversational {
        return InboundEvent::Other;
    }

    let text = event.content.as_ref().and_then(|c| c.text.as_deref());
    let message = chat_message(event.origin.channel.as_ref(), &event.origin, event.sender.user.as_ref(), text);

    message.map_or(InboundEvent::Other, InboundEvent::Message)
}

fn chat_message(channel: Option<&SlackChannelId>, origin: &SlackMessageOrigin, user: Option<&SlackUserId>, text: Option<&str>) -> Option<ChatMessage> {
    let channel = channel.map(|c| c.0.as_str()).filter(|c| !c.is_empty())?;
    let author = user.map(|u| u.0.as_str()).filter(|u| !u.is_empty())?;
    let ts = Some(origin.ts.0.as_str()).filter(|ts| !ts.is_empty())?;
    let thread_ts = origin.thread_ts.as_ref().map(|t| t.0.clone()).filter(|t| !t.is_empty());

    Some(ChatMessage {
        channel: channel.to_string(),
        ts: ts.to_string(),
        thread_ts,
        author: author.to_string(),
        text: text.unwrap_or_default().to_string(),
    })
}

// Tests.
