//! Event admission and thread continuation for thread-bot.
//!
//! This module holds the logic that decides what the bot does with an event:
//! - Resolving the bot's own identity
//! - Deduplicating redelivered events
//! - Classifying events into mentions, thread continuations, or noise
//! - Tracking the threads the bot keeps answering in
//! - Dispatching replies through the chat and responder services

pub mod chat_event;
pub mod classifier;
pub mod dispatcher;
pub mod identity;
pub mod ledger;
pub mod registry;
