//! Service integrations for external APIs and clients.
//!
//! This module contains the collaborators the dispatcher talks to:
//! - Chat services (e.g., Slack), which authenticate, post and deliver events
//! - Responders, which turn an inbound message into reply text
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod chat;
pub mod responder;
