pub mod echo;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::Res;

// Traits.

/// Generic responder trait that reply engines must implement.
///
/// The dispatcher hands it the (possibly mention-stripped) message text and
/// posts whatever comes back. A generation engine slots in here.
#[async_trait]
pub trait GenericResponder: Send + Sync + 'static {
    /// Compose the reply text for an inbound message.
    async fn compose(&self, text: &str) -> Res<String>;
}

// Structs.

/// Responder for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ResponderClient {
    inner: Arc<dyn GenericResponder>,
}

impl Deref for ResponderClient {
    type Target = dyn GenericResponder;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ResponderClient {
    pub fn new(inner: Arc<dyn GenericResponder>) -> Self {
        Self { inner }
    }
}
