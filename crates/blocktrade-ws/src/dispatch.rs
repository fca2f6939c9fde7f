//! Frame decoding and handler dispatch
//!
//! Every inbound frame goes through the same steps: parse the envelope,
//! resolve the topic, find the handler, decode the payload, deliver. List
//! payloads are delivered one item per call in the order they arrived; a
//! list payload that is missing or `null` delivers nothing.

use crate::error::StreamError;
use crate::registry::{Handler, SubscriptionRegistry};
use blocktrade_types::{Envelope, TickerUpdate, UserOrdersPayload, UserTradesPayload};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// What happened to a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Handler called once per item
    Delivered { items: usize },
    /// Payload did not decode; handler called once with the error
    DecodeFailed,
    /// Known topic without a registered handler
    NoHandler,
    /// `message_type` this client does not know
    Unhandled,
    /// Frame was not a valid envelope
    Malformed,
}

/// Routes decoded frames to the handlers of a [`SubscriptionRegistry`]
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<SubscriptionRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<SubscriptionRegistry>) -> Self {
        Self { registry }
    }

    /// Registry the dispatcher reads from
    pub fn registry(&self) -> &Arc<SubscriptionRegistry> {
        &self.registry
    }

    /// Process one raw frame
    pub fn dispatch(&self, frame: &[u8]) -> DispatchOutcome {
        let envelope = match Envelope::parse(frame) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, "Malformed stream message");
                return DispatchOutcome::Malformed;
            }
        };

        let Some(topic) = envelope.topic() else {
            debug!(message_type = %envelope.message_type, "Unhandled message_type");
            return DispatchOutcome::Unhandled;
        };

        let payload = envelope.payload;
        let outcome = self
            .registry
            .with_handler(topic, move |handler| deliver(handler, payload))
            .unwrap_or(DispatchOutcome::NoHandler);

        trace!(%topic, ?outcome, "Frame dispatched");
        outcome
    }
}

fn deliver(handler: &mut Handler, payload: Value) -> DispatchOutcome {
    match handler {
        Handler::UserOrders(f) => deliver_items(
            UserOrdersPayload::from_value(payload).map(|p| p.data),
            f,
        ),
        Handler::UserTrades(f) => deliver_items(
            UserTradesPayload::from_value(payload).map(|p| p.data),
            f,
        ),
        Handler::Ticker(f) => deliver_items(
            serde_json::from_value::<TickerUpdate>(payload).map(|update| vec![update]),
            f,
        ),
    }
}

fn deliver_items<T, F>(items: Result<Vec<T>, serde_json::Error>, f: &mut F) -> DispatchOutcome
where
    F: FnMut(Result<T, StreamError>) + ?Sized,
{
    match items {
        Ok(items) => {
            let count = items.len();
            for item in items {
                f(Ok(item));
            }
            DispatchOutcome::Delivered { items: count }
        }
        Err(e) => {
            warn!(error = %e, "Stream payload did not decode");
            f(Err(StreamError::Decode(e)));
            DispatchOutcome::DecodeFailed
        }
    }
}
