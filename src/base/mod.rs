//! Core components, types, and utilities for the thread-bot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - Event, key and classification types.
//! - Typed errors for the dispatcher core.

pub mod config;
pub mod error;
pub mod types;
