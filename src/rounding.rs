//! Price rounding.
//!
//! Each decoration method names a rounding rule in its catalog rules record.
//! Rounding is applied after margin and print-cost composition; whether
//! upcharges land before or after the rounding step is method-specific, so
//! the composers own that ordering and this module only supplies the step
//! itself.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::PricingError;

/// How a composed price is snapped to customer-facing money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoundingMethod {
    /// Round up to the next $0.50; exact half-dollar amounts are unchanged.
    #[default]
    CeilHalfDollar,

    /// Round to the nearest $0.50, midpoints away from zero.
    RoundHalfDollar,

    /// Round up to the next whole dollar.
    CeilDollar,

    /// Pass the amount through untouched.
    None,
}

impl RoundingMethod {
    /// Apply the rounding rule to an amount.
    ///
    /// Idempotent: rounding an already-rounded amount returns it unchanged.
    #[must_use]
    pub fn apply(self, amount: Decimal) -> Decimal {
        match self {
            Self::CeilHalfDollar => (amount * Decimal::TWO).ceil() / Decimal::TWO,
            Self::RoundHalfDollar => {
                (amount * Decimal::TWO)
                    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                    / Decimal::TWO
            }
            Self::CeilDollar => amount.ceil(),
            Self::None => amount,
        }
    }

    /// Parse an upstream rounding-rule name.
    ///
    /// The upstream rules records use a handful of historical names; the
    /// bare `HalfDollarUp` always meant round *up*, while the `_Final`
    /// suffixed `HalfDollarUp_Final` meant nearest-half.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::MalformedUpstreamResponse`] for names not in
    /// the catalog vocabulary.
    pub fn from_rule_name(name: &str) -> Result<Self, PricingError> {
        match name {
            "HalfDollarCeil_Final" | "HalfDollarUpAlways_Final" | "HalfDollarUp" => {
                Ok(Self::CeilHalfDollar)
            }
            "HalfDollarUp_Final" => Ok(Self::RoundHalfDollar),
            "CeilDollar" => Ok(Self::CeilDollar),
            "None" => Ok(Self::None),
            other => Err(PricingError::MalformedUpstreamResponse(format!(
                "unknown rounding method: {other}"
            ))),
        }
    }
}
