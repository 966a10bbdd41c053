//! Degraded pricing.
//!
//! A coarse fallback table for quoting when catalog data cannot be fetched.
//! Nothing in the engine reaches for it automatically: every pricing path
//! surfaces [`crate::error::PricingError::MissingCatalogData`] instead, and a
//! caller that wants an estimate anyway opts in here and labels the result
//! as such.

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;

use crate::catalog::DecorationMethod;

/// Flat estimate table used only on explicit opt-in.
#[derive(Debug, Clone, PartialEq)]
pub struct DegradedPricing {
    base: Decimal,
    size_overrides: FxHashMap<String, Decimal>,
    volume_breaks: Vec<(u32, Decimal)>,
}

impl DegradedPricing {
    /// The standard estimate table: an $18 garment with upsized overrides
    /// and modest volume discounts at 48 and 72 pieces.
    #[must_use]
    pub fn standard() -> Self {
        let mut size_overrides = FxHashMap::default();
        for (size, dollars) in [("2XL", 22), ("XXL", 22), ("3XL", 23), ("4XL", 25)] {
            size_overrides.insert(size.to_string(), Decimal::from(dollars));
        }
        Self {
            base: Decimal::from(18),
            size_overrides,
            volume_breaks: vec![(72, Decimal::TWO), (48, Decimal::ONE)],
        }
    }

    /// Flat per-piece decoration estimate for a method.
    #[must_use]
    pub fn decoration_cost(method: DecorationMethod) -> Decimal {
        match method {
            DecorationMethod::Embroidery | DecorationMethod::CapEmbroidery => Decimal::new(350, 2),
            DecorationMethod::ScreenPrint => Decimal::new(250, 2),
            DecorationMethod::Dtg => Decimal::from(4),
        }
    }

    /// Estimated decorated unit price for a size and quantity.
    #[must_use]
    pub fn unit_price(&self, method: DecorationMethod, size: &str, quantity: u32) -> Decimal {
        let garment = self
            .size_overrides
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(size))
            .map_or(self.base, |(_, price)| *price);
        let discount = self
            .volume_breaks
            .iter()
            .find(|(threshold, _)| quantity >= *threshold)
            .map_or(Decimal::ZERO, |(_, amount)| *amount);
        garment - discount + Self::decoration_cost(method)
    }
}
