//! Tier resolution.

use rust_decimal::Decimal;

use crate::{
    catalog::{Tier, TierSchedule},
    error::PricingError,
};

/// The outcome of resolving an order quantity against a tier schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTier<'a> {
    tier: &'a Tier,
    below_minimum: bool,
}

impl<'a> ResolvedTier<'a> {
    /// The tier whose rates apply to the order.
    pub fn tier(&self) -> &'a Tier {
        self.tier
    }

    /// Whether the quantity fell below the schedule's lowest minimum and was
    /// snapped onto the lowest tier.
    pub fn below_minimum(&self) -> bool {
        self.below_minimum
    }

    /// The less-than-minimum fee the caller must add, or zero when none
    /// applies. The fee is charged when the quantity was snapped up from
    /// below the schedule, and inside a defined no-minimum tier (a `1-23`
    /// tier starting at quantity 1, which exists to absorb orders under the
    /// standard minimum). A standard tier's recorded fee prices the snap
    /// case only; orders inside its range never pay it.
    pub fn ltm_fee(&self) -> Decimal {
        if self.below_minimum || self.tier.min_qty() == 1 {
            self.tier.ltm_fee()
        } else {
            Decimal::ZERO
        }
    }

    /// The LTM fee spread across the order, added to each unit's price.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidDecorationParameter`] for a zero
    /// quantity.
    pub fn ltm_fee_per_unit(&self, quantity: u32) -> Result<Decimal, PricingError> {
        if quantity == 0 {
            return Err(PricingError::InvalidDecorationParameter(
                "cannot distribute LTM fee across zero units".into(),
            ));
        }
        Ok(self.ltm_fee() / Decimal::from(quantity))
    }
}

/// Map an order quantity to its pricing tier.
///
/// Quantities below the lowest defined tier's minimum are not rejected: they
/// are priced at the lowest tier's garment/print rates, and that tier's LTM
/// fee is surfaced through [`ResolvedTier::ltm_fee`] for the caller to add.
/// Small orders pay the next tier's rates plus a flat surcharge, not an
/// extrapolated rate.
///
/// # Errors
///
/// Returns [`PricingError::TierNotFound`] for a zero quantity, or when the
/// quantity falls inside the schedule's span but no tier matches (a data
/// fault — well-formed in-range quantities are never silently defaulted).
pub fn resolve_tier<'a>(
    quantity: u32,
    schedule: &'a TierSchedule,
) -> Result<ResolvedTier<'a>, PricingError> {
    let (span_min, span_max) = schedule.span();
    if quantity == 0 {
        return Err(PricingError::TierNotFound {
            quantity,
            span_min,
            span_max,
        });
    }

    if quantity < schedule.lowest().min_qty() {
        return Ok(ResolvedTier {
            tier: schedule.lowest(),
            below_minimum: true,
        });
    }

    schedule
        .containing(quantity)
        .map(|tier| ResolvedTier {
            tier,
            below_minimum: false,
        })
        .ok_or(PricingError::TierNotFound {
            quantity,
            span_min,
            span_max,
        })
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::catalog::Tier;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap_or_default()
    }

    fn schedule() -> Result<TierSchedule, PricingError> {
        TierSchedule::new(vec![
            Tier::new("24-47", 24, Some(47), dec("0.6"), dec("50"))?,
            Tier::new("48-71", 48, Some(71), dec("0.55"), Decimal::ZERO)?,
            Tier::new("72+", 72, None, dec("0.5"), Decimal::ZERO)?,
        ])
    }

    #[test]
    fn resolves_in_range_quantities() -> TestResult {
        let schedule = schedule()?;
        let resolved = resolve_tier(48, &schedule)?;

        assert_eq!(resolved.tier().label(), "48-71");
        assert!(!resolved.below_minimum());
        assert_eq!(resolved.ltm_fee(), Decimal::ZERO);
        Ok(())
    }

    #[test]
    fn open_ended_tier_covers_large_quantities() -> TestResult {
        let schedule = schedule()?;
        assert_eq!(resolve_tier(5000, &schedule)?.tier().label(), "72+");
        Ok(())
    }

    #[test]
    fn in_range_orders_in_the_lowest_tier_pay_no_fee() -> TestResult {
        // The 24-47 record carries the snap fee, which in-range orders in
        // that tier never owe.
        let schedule = schedule()?;
        let resolved = resolve_tier(30, &schedule)?;

        assert!(!resolved.below_minimum());
        assert_eq!(resolved.ltm_fee(), Decimal::ZERO);
        assert_eq!(resolved.ltm_fee_per_unit(30)?, Decimal::ZERO);
        Ok(())
    }

    #[test]
    fn defined_no_minimum_tier_charges_its_fee_in_range() -> TestResult {
        let schedule = TierSchedule::new(vec![
            Tier::new("1-23", 1, Some(23), dec("0.57"), dec("50"))?,
            Tier::new("24-47", 24, Some(47), dec("0.57"), Decimal::ZERO)?,
            Tier::new("48+", 48, None, dec("0.57"), Decimal::ZERO)?,
        ])?;
        let resolved = resolve_tier(12, &schedule)?;

        assert_eq!(resolved.tier().label(), "1-23");
        assert!(!resolved.below_minimum());
        assert_eq!(resolved.ltm_fee(), dec("50"));
        Ok(())
    }

    #[test]
    fn below_minimum_snaps_to_lowest_tier_with_fee() -> TestResult {
        let schedule = schedule()?;
        let resolved = resolve_tier(20, &schedule)?;

        assert_eq!(resolved.tier().label(), "24-47");
        assert!(resolved.below_minimum());
        assert_eq!(resolved.ltm_fee(), dec("50"));
        assert_eq!(resolved.ltm_fee_per_unit(20)?, dec("2.50"));
        Ok(())
    }

    #[test]
    fn zero_quantity_is_a_tier_not_found() -> TestResult {
        let schedule = schedule()?;
        assert_eq!(
            resolve_tier(0, &schedule),
            Err(PricingError::TierNotFound {
                quantity: 0,
                span_min: 24,
                span_max: u32::MAX,
            })
        );
        Ok(())
    }

    #[test]
    fn every_quantity_from_one_resolves_to_exactly_one_tier() -> TestResult {
        let schedule = schedule()?;
        for quantity in 1..500u32 {
            let resolved = resolve_tier(quantity, &schedule)?;
            assert!(
                resolved.below_minimum() || resolved.tier().contains(quantity),
                "quantity {quantity} resolved to non-containing tier"
            );
        }
        Ok(())
    }
}
