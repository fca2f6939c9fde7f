//! Private trading endpoints
//!
//! These endpoints require authentication.

use crate::error::RestResult;
use crate::transport::{Access, HttpTransport};
use blocktrade_types::{CustomerOrderRequest, Order};
use tracing::{debug, info, instrument};
use urlencoding::encode;

/// Private trading endpoints
pub struct TradingEndpoints<'a> {
    transport: &'a HttpTransport,
}

impl<'a> TradingEndpoints<'a> {
    pub fn new(transport: &'a HttpTransport) -> Self {
        Self { transport }
    }

    /// Place an order identified by a client-assigned id
    #[instrument(skip(self, request), fields(customer_order_id = %request.customer_order_id))]
    pub async fn create_customer_order(&self, request: &CustomerOrderRequest) -> RestResult<Order> {
        info!(
            "Placing {} {} order on pair {}",
            request.direction, request.order_type, request.trading_pair_id
        );
        self.transport
            .post_json("/customer_orders", Access::Signed, Some(request))
            .await
    }

    /// Get an order by exchange id
    #[instrument(skip(self))]
    pub async fn order(&self, id: i64) -> RestResult<Order> {
        debug!("Fetching order {}", id);
        self.transport
            .get_json(&format!("/orders/{}", id), Access::Signed)
            .await
    }

    /// Get an order by client-assigned id
    ///
    /// The id is percent-encoded into a single path segment.
    #[instrument(skip(self))]
    pub async fn customer_order(&self, customer_order_id: &str) -> RestResult<Order> {
        debug!("Fetching customer order {}", customer_order_id);
        self.transport
            .get_json(
                &format!("/customer_orders/{}", encode(customer_order_id)),
                Access::Signed,
            )
            .await
    }

    /// Cancel an order by client-assigned id
    #[instrument(skip(self))]
    pub async fn cancel_customer_order(&self, customer_order_id: &str) -> RestResult<Order> {
        info!("Cancelling customer order {}", customer_order_id);
        self.transport
            .post_json::<(), _>(
                &format!("/customer_orders/{}/cancel", encode(customer_order_id)),
                Access::Signed,
                None,
            )
            .await
    }
}
