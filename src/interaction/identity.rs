//! The bot's own identity on the chat platform.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::{base::error::AuthError, service::chat::ChatClient};

/// The bot's user id, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    user_id: Arc<str>,
}

impl Identity {
    pub fn new(user_id: impl Into<String>) -> Self {
        let user_id: String = user_id.into();
        Self { user_id: Arc::from(user_id) }
    }

    /// Resolve the identity with a single authentication probe.
    ///
    /// Not retried; the caller decides what to do on failure.
    #[instrument(name = "Identity::resolve", skip_all)]
    pub async fn resolve(chat: &ChatClient) -> Result<Self, AuthError> {
        let user_id = chat.auth_test().await.map_err(|source| AuthError { source })?;

        info!("Bot user ID: {}", user_id);

        Ok(Self::new(user_id))
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The markup the platform uses to mention this user, e.g. `<@U123>`.
    pub fn mention_token(&self) -> String {
        format!("<@{}>", self.user_id)
    }

    pub fn is(&self, user_id: &str) -> bool {
        &*self.user_id == user_id
    }
}
