use tracing::{Instrument, error, instrument};

use crate::base::types::InboundEvent;

use super::dispatcher::Dispatcher;

/// Hands an inbound event to the dispatcher on its own task.
///
/// The transport acknowledges the delivery without waiting for the reply to
/// be posted; delivery failures are logged here.
#[instrument(skip_all)]
pub fn handle_chat_event(event: InboundEvent, dispatcher: Dispatcher) {
    tokio::spawn(
        async move {
            // Process the event.
            let result = dispatcher.handle(&event).await;

            // Log any errors.
            if let Err(err) = &result {
                error!("Error while handling: {}: {:#}", err, err.source);
            }
        }
        .in_current_span(),
    );
}
