//! Topic to handler mapping
//!
//! Each topic has at most one handler. The registry lock is held for the
//! whole delivery of a frame, so handlers must not call back into the
//! registry (subscribe/unsubscribe) from inside the callback.

use crate::error::StreamError;
use blocktrade_types::{Order, TickerUpdate, Topic, Trade};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;

/// Callback for `user_orders` items
pub type OrderHandler = Box<dyn FnMut(Result<Order, StreamError>) + Send>;
/// Callback for `user_trades` items
pub type TradeHandler = Box<dyn FnMut(Result<Trade, StreamError>) + Send>;
/// Callback for `ticker` updates
pub type TickerHandler = Box<dyn FnMut(Result<TickerUpdate, StreamError>) + Send>;

/// A handler together with the topic it serves
pub enum Handler {
    UserOrders(OrderHandler),
    UserTrades(TradeHandler),
    Ticker(TickerHandler),
}

impl Handler {
    /// Wrap a callback for order updates
    pub fn user_orders(f: impl FnMut(Result<Order, StreamError>) + Send + 'static) -> Self {
        Self::UserOrders(Box::new(f))
    }

    /// Wrap a callback for trade executions
    pub fn user_trades(f: impl FnMut(Result<Trade, StreamError>) + Send + 'static) -> Self {
        Self::UserTrades(Box::new(f))
    }

    /// Wrap a callback for ticker updates
    pub fn ticker(f: impl FnMut(Result<TickerUpdate, StreamError>) + Send + 'static) -> Self {
        Self::Ticker(Box::new(f))
    }

    /// Topic this handler serves
    pub fn topic(&self) -> Topic {
        match self {
            Self::UserOrders(_) => Topic::UserOrders,
            Self::UserTrades(_) => Topic::UserTrades,
            Self::Ticker(_) => Topic::Ticker,
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler").field(&self.topic()).finish()
    }
}

/// Registered handlers of one stream connection
#[derive(Default)]
pub struct SubscriptionRegistry {
    handlers: Mutex<HashMap<Topic, Handler>>,
}

impl SubscriptionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, returning the one it replaced
    pub fn register(&self, handler: Handler) -> Option<Handler> {
        self.handlers.lock().insert(handler.topic(), handler)
    }

    /// Remove the handler of `topic`, returning whether one was registered
    pub fn unregister(&self, topic: Topic) -> bool {
        self.handlers.lock().remove(&topic).is_some()
    }

    /// Check if `topic` has a handler
    pub fn is_registered(&self, topic: Topic) -> bool {
        self.handlers.lock().contains_key(&topic)
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        self.handlers.lock().len()
    }

    /// Check if no handler is registered
    pub fn is_empty(&self) -> bool {
        self.handlers.lock().is_empty()
    }

    /// Run `f` on the handler of `topic` while holding the registry lock
    ///
    /// Returns `None` if no handler is registered.
    pub fn with_handler<R>(&self, topic: Topic, f: impl FnOnce(&mut Handler) -> R) -> Option<R> {
        let mut handlers = self.handlers.lock();
        handlers.get_mut(&topic).map(f)
    }
}

impl fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.handlers.lock();
        f.debug_struct("SubscriptionRegistry")
            .field("topics", &handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
