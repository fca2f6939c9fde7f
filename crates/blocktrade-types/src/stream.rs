//! Stream envelope, topics and outbound control messages

use crate::trading::{Order, Trade};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Stream topics a handler can be registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    /// Private order updates
    UserOrders,
    /// Private trade executions
    UserTrades,
    /// Public ticker of a trading pair
    Ticker,
}

impl Topic {
    /// Returns the topic name as used in `message_type`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserOrders => "user_orders",
            Self::UserTrades => "user_trades",
            Self::Ticker => "ticker",
        }
    }

    /// Parse a `message_type` value; `None` for topics this SDK does not know
    pub fn from_message_type(message_type: &str) -> Option<Self> {
        match message_type {
            "user_orders" => Some(Self::UserOrders),
            "user_trades" => Some(Self::UserTrades),
            "ticker" => Some(Self::Ticker),
            _ => None,
        }
    }

    /// Returns true if this topic requires the user's websocket auth token
    pub fn is_private(&self) -> bool {
        matches!(self, Self::UserOrders | Self::UserTrades)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outer structure of every inbound stream frame
///
/// The payload stays untyped until a handler for `message_type` is found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub message_type: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Envelope {
    /// Parse an envelope from raw frame bytes
    pub fn parse(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// The known topic of this envelope, if any
    pub fn topic(&self) -> Option<Topic> {
        Topic::from_message_type(&self.message_type)
    }
}

/// Payload of the `user_orders` topic
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserOrdersPayload {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Vec<Order>,
}

/// Payload of the `user_trades` topic
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserTradesPayload {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Vec<Trade>,
}

impl UserOrdersPayload {
    /// Decode a `user_orders` payload; a missing (`null`) payload has no orders
    pub fn from_value(payload: serde_json::Value) -> Result<Self, serde_json::Error> {
        decode_list_payload(payload)
    }
}

impl UserTradesPayload {
    /// Decode a `user_trades` payload; a missing (`null`) payload has no trades
    pub fn from_value(payload: serde_json::Value) -> Result<Self, serde_json::Error> {
        decode_list_payload(payload)
    }
}

fn decode_list_payload<P>(payload: serde_json::Value) -> Result<P, serde_json::Error>
where
    P: DeserializeOwned + Default,
{
    if payload.is_null() {
        return Ok(P::default());
    }
    serde_json::from_value(payload)
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Outbound control messages
///
/// Each variant serializes as a single-key object, e.g.
/// `{"subscribe_ticker":{"trading_pair_id":1}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMessage {
    SubscribeUserOrders {
        auth_token: String,
    },
    UnsubscribeUserOrders {},
    SubscribeUserTrades {
        auth_token: String,
        /// Replay trades since this epoch-millisecond timestamp
        #[serde(skip_serializing_if = "Option::is_none")]
        start_time: Option<i64>,
    },
    UnsubscribeUserTrades {},
    SubscribeTicker {
        trading_pair_id: i64,
    },
    UnsubscribeTicker {
        trading_pair_id: i64,
    },
}

impl ControlMessage {
    /// Topic this message controls
    pub fn topic(&self) -> Topic {
        match self {
            Self::SubscribeUserOrders { .. } | Self::UnsubscribeUserOrders {} => Topic::UserOrders,
            Self::SubscribeUserTrades { .. } | Self::UnsubscribeUserTrades {} => Topic::UserTrades,
            Self::SubscribeTicker { .. } | Self::UnsubscribeTicker { .. } => Topic::Ticker,
        }
    }

    /// Returns true for subscribe messages
    pub fn is_subscribe(&self) -> bool {
        matches!(
            self,
            Self::SubscribeUserOrders { .. }
                | Self::SubscribeUserTrades { .. }
                | Self::SubscribeTicker { .. }
        )
    }

    /// Serialize to the JSON text sent over the wire
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
