//! Direction, OrderType, TimeInForce and account/reference enums

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order and trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Buy the base asset
    Buy,
    /// Sell the base asset
    Sell,
}

impl Direction {
    /// Returns the direction as used in API messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }

    /// Returns the opposite direction
    pub fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    /// Limit order - executes at specified price or better
    Limit,
    /// Market order - executes immediately at best available price
    Market,
}

impl OrderType {
    /// Returns the order type as used in API messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Limit => "LIMIT",
            Self::Market => "MARKET",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time in force
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TimeInForce {
    /// Good till cancelled
    #[default]
    #[serde(rename = "GTC")]
    Gtc,
}

/// Asset currency class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CurrencyType {
    Fiat,
    Cryptocurrency,
    #[serde(other)]
    Unknown,
}

/// Supported deposit channels for an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DepositMethod {
    WalletAddress,
    ClearJunctionSepa,
    Coinify,
    #[serde(other)]
    Unknown,
}

/// Account holder type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Individual,
    Company,
    #[serde(other)]
    Unknown,
}

/// Identity verification state of the account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KycStatus {
    NotVerified,
    Pending,
    Resubmit,
    Ok,
    Rejected,
    #[serde(other)]
    Unknown,
}

impl KycStatus {
    /// Returns true once the exchange has accepted the verification
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Ok)
    }
}
