//! Echo responder: replies with the text it was given.

use std::sync::Arc;

use async_trait::async_trait;

use crate::base::types::Res;

use super::{GenericResponder, ResponderClient};

// Extra methods on `ResponderClient` applied by the echo implementation.

impl ResponderClient {
    pub fn echo() -> Self {
        Self { inner: Arc::new(EchoResponder) }
    }
}

/// Responder that returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoResponder;

#[async_trait]
impl GenericResponder for EchoResponder {
    async fn compose(&self, text: &str) -> Res<String> {
        Ok(text.to_string())
    }
}
