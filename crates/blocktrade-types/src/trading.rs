//! Order and trade records

use crate::enums::{Direction, OrderType, TimeInForce};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Request body for creating an order with a client-assigned id
///
/// Optional fields are omitted from the JSON body when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerOrderRequest {
    /// Client-assigned order id
    pub customer_order_id: String,
    pub portfolio_id: i64,
    pub direction: Direction,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub trading_pair_id: i64,
    #[serde(deserialize_with = "crate::decimal::exact")]
    pub amount: Decimal,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::decimal::exact_opt"
    )]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_in_force: Option<TimeInForce>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::decimal::exact_opt"
    )]
    pub stop_price: Option<Decimal>,
}

impl CustomerOrderRequest {
    /// Create a limit order request
    pub fn limit(
        customer_order_id: impl Into<String>,
        portfolio_id: i64,
        trading_pair_id: i64,
        direction: Direction,
        amount: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            customer_order_id: customer_order_id.into(),
            portfolio_id,
            direction,
            order_type: OrderType::Limit,
            trading_pair_id,
            amount,
            price: Some(price),
            time_in_force: None,
            stop_price: None,
        }
    }

    /// Create a market order request
    pub fn market(
        customer_order_id: impl Into<String>,
        portfolio_id: i64,
        trading_pair_id: i64,
        direction: Direction,
        amount: Decimal,
    ) -> Self {
        Self {
            customer_order_id: customer_order_id.into(),
            portfolio_id,
            direction,
            order_type: OrderType::Market,
            trading_pair_id,
            amount,
            price: None,
            time_in_force: None,
            stop_price: None,
        }
    }

    /// Set the time in force
    pub fn with_time_in_force(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = Some(tif);
        self
    }

    /// Set a stop price
    pub fn with_stop_price(mut self, stop_price: Decimal) -> Self {
        self.stop_price = Some(stop_price);
        self
    }
}

/// Order acknowledgement / order state as returned by the exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Exchange-assigned id
    pub id: i64,
    /// Client-assigned id, empty for orders placed without one
    #[serde(default)]
    pub customer_order_id: String,
}

/// An execution of one of the user's orders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: i64,
    pub order_id: i64,
    pub trading_pair_id: i64,
    #[serde(default)]
    pub symbol: String,
    pub direction: Direction,
    #[serde(deserialize_with = "crate::decimal::exact")]
    pub amount: Decimal,
    #[serde(deserialize_with = "crate::decimal::exact")]
    pub price: Decimal,
    /// Epoch milliseconds
    pub date: i64,
    #[serde(deserialize_with = "crate::decimal::exact")]
    pub fee_value: Decimal,
    #[serde(deserialize_with = "crate::decimal::exact")]
    pub trade_value: Decimal,
    /// True if the user's order was resting in the book
    pub maker: bool,
}
