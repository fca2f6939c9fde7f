//! Exact decimal decoding
//!
//! The exchange sends amounts and prices as decimal strings. These helpers
//! reject any value that would need rounding to fit a [`Decimal`], so a
//! decoded amount always prints back with the digits it arrived with.
//!
//! ```
//! use blocktrade_types::PortfolioAsset;
//!
//! let json = r#"{"trading_asset_id":1,"available_amount":"0.1234567890123456789012345678901","reserved_amount":"0"}"#;
//! assert!(serde_json::from_str::<PortfolioAsset>(json).is_err());
//! ```

use rust_decimal::Decimal;
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use std::fmt;

struct Exact(Decimal);

struct ExactVisitor;

impl<'de> Visitor<'de> for ExactVisitor {
    type Value = Exact;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal string representable without rounding")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Exact, E> {
        Decimal::from_str_exact(v)
            .map(Exact)
            .map_err(|e| E::custom(format!("decimal {:?}: {}", v, e)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Exact, E> {
        Ok(Exact(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Exact, E> {
        Ok(Exact(Decimal::from(v)))
    }
}

impl<'de> Deserialize<'de> for Exact {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ExactVisitor)
    }
}

/// Decode a required decimal field
pub fn exact<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    Exact::deserialize(deserializer).map(|e| e.0)
}

/// Decode an optional decimal field; `null` becomes `None`
pub fn exact_opt<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Decimal>, D::Error> {
    Option::<Exact>::deserialize(deserializer).map(|o| o.map(|e| e.0))
}
