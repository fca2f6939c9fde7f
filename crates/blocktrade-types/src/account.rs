//! Account records: profile, portfolios and fee schedule

use crate::enums::{AccountType, KycStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single fee rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fee {
    #[serde(deserialize_with = "crate::decimal::exact")]
    pub min_fee: Decimal,
    #[serde(deserialize_with = "crate::decimal::exact")]
    pub percent_value: Decimal,
}

/// Fee schedule of the authenticated user, keyed by category then asset
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeeSchedule {
    #[serde(rename = "TRADING", default)]
    pub trading: HashMap<String, Fee>,
    #[serde(rename = "TRANSFER_IN_CREDIT_CARD", default)]
    pub transfer_in_credit_card: HashMap<String, Fee>,
    #[serde(rename = "TRANSFER_IN_SEPA", default)]
    pub transfer_in_sepa: HashMap<String, Fee>,
    #[serde(rename = "TRANSFER_IN_OUTSIDE_SEPA", default)]
    pub transfer_in_outside_sepa: HashMap<String, Fee>,
    #[serde(rename = "TRANSFER_OUT_SEPA", default)]
    pub transfer_out_sepa: HashMap<String, Fee>,
    #[serde(rename = "TRANSFER_OUT_OUTSIDE_SEPA", default)]
    pub transfer_out_outside_sepa: HashMap<String, Fee>,
    #[serde(rename = "MINER_FEE", default)]
    pub miner_fee: HashMap<String, Fee>,
    #[serde(rename = "TRANSFER_OUT", default)]
    pub transfer_out: HashMap<String, Fee>,
}

/// Primary (display) currency of the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryCurrency {
    pub id: i64,
    pub name: String,
}

/// Profile of the authenticated user
///
/// `websocket_auth_token` is required to subscribe to the private
/// `user_orders` and `user_trades` stream topics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub email: String,
    #[serde(default)]
    pub primary_currency: Option<PrimaryCurrency>,
    pub kyc_status: KycStatus,
    pub websocket_auth_token: String,
    #[serde(default)]
    pub is_2fa_enabled: bool,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub gender: String,
    /// Epoch milliseconds
    #[serde(default)]
    pub date_of_birth: i64,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub aml_required: bool,
    pub account_type: AccountType,
}

/// Balance of one asset inside a portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioAsset {
    pub trading_asset_id: i64,
    #[serde(deserialize_with = "crate::decimal::exact")]
    pub available_amount: Decimal,
    #[serde(deserialize_with = "crate::decimal::exact")]
    pub reserved_amount: Decimal,
    #[serde(default)]
    pub wallet_address: Option<String>,
}

impl PortfolioAsset {
    /// Available plus reserved
    pub fn total(&self) -> Decimal {
        self.available_amount + self.reserved_amount
    }
}

/// A portfolio (sub-account) of the authenticated user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub id: i64,
    #[serde(default)]
    pub assets: Vec<PortfolioAsset>,
}

impl Portfolio {
    /// Balance entry for the given asset
    pub fn asset(&self, trading_asset_id: i64) -> Option<&PortfolioAsset> {
        self.assets
            .iter()
            .find(|a| a.trading_asset_id == trading_asset_id)
    }
}
