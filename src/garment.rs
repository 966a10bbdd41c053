//! Garment base pricing.
//!
//! This is a margin-division model, not markup-addition: a denominator of
//! `0.6` on a $3.53 garment yields $5.88, so the stated margin is
//! `1 - denominator` (40%) of the final garment-only price.

use rust_decimal::Decimal;
use rusty_money::{Money, iso};

use crate::catalog::Tier;

/// Convert a wholesale garment cost into its undecorated sell price for a
/// tier by dividing by the tier's margin denominator.
///
/// The round-trip `base_sell_price(cost, tier) * denominator == cost` holds
/// exactly under [`Decimal`] arithmetic.
#[must_use]
pub fn base_sell_price(wholesale_cost: Decimal, tier: &Tier) -> Decimal {
    // Tier construction rejects zero denominators.
    wholesale_cost / tier.margin_denominator()
}

/// Add a decoration cost onto the marked-up garment price. Used for
/// primary-location pricing; additional-location print costs are already
/// margin-adjusted upstream and stand alone (see the method composers).
#[must_use]
pub fn add_print_cost(garment_sell_price: Decimal, print_cost: Decimal) -> Decimal {
    garment_sell_price + print_cost
}

/// Format an amount as display money (all catalog pricing is USD).
#[must_use]
pub fn display_price(amount: Decimal) -> Money<'static, iso::Currency> {
    Money::from_decimal(amount, iso::USD)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::error::PricingError;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap_or_default()
    }

    fn tier() -> Result<Tier, PricingError> {
        Tier::new("24-47", 24, Some(47), dec("0.6"), dec("50"))
    }

    #[test]
    fn margin_division_not_markup_addition() -> TestResult {
        let price = base_sell_price(dec("3.53"), &tier()?);
        assert_eq!(price.round_dp(4), dec("5.8833"));
        Ok(())
    }

    #[test]
    fn margin_round_trip() -> TestResult {
        let tier = tier()?;
        for cost in ["0.01", "3.53", "7.50", "120.00"] {
            let cost = dec(cost);
            let sell = base_sell_price(cost, &tier);
            assert_eq!(
                (sell * tier.margin_denominator()).round_dp(10),
                cost,
                "round trip failed for {cost}"
            );
        }
        Ok(())
    }

    #[test]
    fn print_cost_is_straight_addition() -> TestResult {
        let decorated = add_print_cost(base_sell_price(dec("3.53"), &tier()?), dec("6.00"));
        assert_eq!(decorated.round_dp(4), dec("11.8833"));
        Ok(())
    }

    #[test]
    fn displays_as_usd() {
        let money = display_price(dec("13.25"));
        assert_eq!(money, Money::from_decimal(dec("13.25"), iso::USD));
    }
}
