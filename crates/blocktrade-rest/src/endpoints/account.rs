//! Private account endpoints
//!
//! These endpoints require authentication.

use crate::error::RestResult;
use crate::transport::{Access, HttpTransport};
use blocktrade_types::{FeeSchedule, Portfolio, User};
use tracing::{debug, instrument};

/// Private account endpoints
pub struct AccountEndpoints<'a> {
    transport: &'a HttpTransport,
}

impl<'a> AccountEndpoints<'a> {
    pub fn new(transport: &'a HttpTransport) -> Self {
        Self { transport }
    }

    /// Get the fee schedule of the user
    #[instrument(skip(self))]
    pub async fn fees(&self) -> RestResult<FeeSchedule> {
        debug!("Fetching fees");
        self.transport.get_json("/fees", Access::Signed).await
    }

    /// Get the user profile, including the stream auth token
    #[instrument(skip(self))]
    pub async fn user(&self) -> RestResult<User> {
        debug!("Fetching user");
        self.transport.get_json("/user", Access::Signed).await
    }

    /// Get all portfolios with their balances
    #[instrument(skip(self))]
    pub async fn portfolios(&self) -> RestResult<Vec<Portfolio>> {
        debug!("Fetching portfolios");
        self.transport.get_json("/portfolios", Access::Signed).await
    }
}
