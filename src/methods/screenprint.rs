//! Screen print pricing.
//!
//! Screen print costs are keyed by tier and ink color count, split into
//! primary-location and additional-location scopes. Primary costs are raw
//! production costs that go through the tier's margin denominator together
//! with the garment; additional-location costs arrive already margin-adjusted
//! and are charged per piece as-is. Dark garments need a white underbase
//! screen, which raises the effective color count for cost lookup (capped at
//! the catalog's maximum) and adds a real screen to setup (never capped).

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;

use crate::{
    catalog::{GarmentSize, TierSchedule, UpchargeMap, standard_garment, upcharge_for},
    error::PricingError,
    garment::{add_print_cost, base_sell_price},
    rounding::RoundingMethod,
    tiers::{ResolvedTier, resolve_tier},
};

/// Whether a cost row prices the primary location or an additional one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CostScope {
    /// The first print location, priced together with the garment.
    Primary,
    /// Any further location, priced per piece on its own.
    Additional,
}

/// One fetched screen print cost row.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenPrintCost {
    /// Which location scope the row prices.
    pub scope: CostScope,
    /// Tier label the row belongs to.
    pub tier_label: String,
    /// Ink color count the row prices, underbase included.
    pub color_count: u8,
    /// The cost amount. Raw for [`CostScope::Primary`], margin-adjusted
    /// upstream for [`CostScope::Additional`].
    pub base_cost: Decimal,
}

/// Production parameters for screen printing.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenPrintParams {
    /// Per-color flash cure charge folded into the primary print cost.
    pub flash_charge: Decimal,
    /// Flat setup fee per screen burned.
    pub setup_fee_per_screen: Decimal,
    /// Per-piece surcharge for a location printed with safety stripes.
    pub safety_stripe_fee: Decimal,
    /// Highest color count the cost catalog carries rows for.
    pub max_color_count: u8,
    /// Rounding applied to finished per-piece prices.
    pub rounding: RoundingMethod,
}

impl Default for ScreenPrintParams {
    fn default() -> Self {
        Self {
            flash_charge: Decimal::new(35, 2),
            setup_fee_per_screen: Decimal::from(30),
            safety_stripe_fee: Decimal::TWO,
            max_color_count: 6,
            rounding: RoundingMethod::CeilHalfDollar,
        }
    }
}

/// One requested print placement on an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintLocation {
    /// Placement code, e.g. `LC` or `FB`.
    pub code: String,
    /// Ink colors in the design, underbase excluded.
    pub color_count: u8,
    /// Whether the location prints reflective safety stripes.
    pub safety_stripes: bool,
}

impl PrintLocation {
    /// Create a placement request.
    pub fn new(code: impl Into<String>, color_count: u8, safety_stripes: bool) -> Self {
        Self {
            code: code.into(),
            color_count,
            safety_stripes,
        }
    }

    /// Screens burned for the location: its color count plus the underbase
    /// screen on dark garments. Unlike cost lookup this is never capped; a
    /// seventh screen is still burned and still paid for.
    #[must_use]
    pub fn screens(&self, dark_garment: bool) -> u32 {
        let underbase = u32::from(dark_garment && self.color_count > 0);
        u32::from(self.color_count) + underbase
    }
}

/// Setup fees for one location: screens burned and the resulting charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationSetup {
    /// Placement code the fee belongs to.
    pub code: String,
    /// Screens burned for the location, underbase included and never capped.
    pub screen_count: u32,
    /// `screen_count` times the per-screen fee.
    pub fee: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CostKey {
    scope: CostScope,
    tier_label: String,
    color_count: u8,
}

/// Screen print pricing catalog: the tier schedule, cost rows, and
/// production parameters.
#[derive(Debug, Clone)]
pub struct ScreenPrintCatalog {
    tiers: TierSchedule,
    costs: FxHashMap<CostKey, Decimal>,
    params: ScreenPrintParams,
}

impl ScreenPrintCatalog {
    /// Assemble a catalog from fetched cost rows.
    pub fn new(
        tiers: TierSchedule,
        costs: impl IntoIterator<Item = ScreenPrintCost>,
        params: ScreenPrintParams,
    ) -> Self {
        let costs = costs
            .into_iter()
            .map(|row| {
                (
                    CostKey {
                        scope: row.scope,
                        tier_label: row.tier_label,
                        color_count: row.color_count,
                    },
                    row.base_cost,
                )
            })
            .collect();
        Self {
            tiers,
            costs,
            params,
        }
    }

    /// The catalog's tier schedule.
    pub fn tiers(&self) -> &TierSchedule {
        &self.tiers
    }

    /// Production parameters.
    pub fn params(&self) -> &ScreenPrintParams {
        &self.params
    }

    /// Resolve the order quantity against the schedule.
    ///
    /// # Errors
    ///
    /// See [`resolve_tier`].
    pub fn resolve(&self, quantity: u32) -> Result<ResolvedTier<'_>, PricingError> {
        resolve_tier(quantity, &self.tiers)
    }

    /// The color count used for cost lookup: a dark garment adds one for the
    /// white underbase, capped at the catalog's maximum color count.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidDecorationParameter`] when the design's
    /// own color count exceeds the catalog maximum.
    pub fn effective_color_count(
        &self,
        color_count: u8,
        dark_garment: bool,
    ) -> Result<u8, PricingError> {
        if color_count > self.params.max_color_count {
            return Err(PricingError::InvalidDecorationParameter(format!(
                "{color_count} colors exceeds the {} color maximum",
                self.params.max_color_count
            )));
        }
        if color_count == 0 {
            return Ok(0);
        }
        let with_underbase = if dark_garment {
            color_count.saturating_add(1)
        } else {
            color_count
        };
        Ok(with_underbase.min(self.params.max_color_count))
    }

    fn cost_for(
        &self,
        scope: CostScope,
        tier_label: &str,
        color_count: u8,
    ) -> Result<Decimal, PricingError> {
        self.costs
            .get(&CostKey {
                scope,
                tier_label: tier_label.to_string(),
                color_count,
            })
            .copied()
            .ok_or_else(|| {
                PricingError::MissingCatalogData(format!(
                    "no screen print cost for tier {tier_label} at {color_count} colors"
                ))
            })
    }

    /// Decorated unit price for one size at one quantity with the primary
    /// location printed in `color_count` colors. A zero color count prices
    /// the garment alone (a blank included in a printed order).
    ///
    /// The garment and the margin-divided print cost are summed first and
    /// rounded once, so the finished price lands on a clean figure.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::MissingCatalogData`] for unknown sizes or
    /// missing cost rows, [`PricingError::InvalidDecorationParameter`] for
    /// over-maximum color counts, and tier-resolution errors.
    pub fn primary_unit_price(
        &self,
        sizes: &[GarmentSize],
        upcharges: &UpchargeMap,
        size: &str,
        quantity: u32,
        color_count: u8,
        dark_garment: bool,
    ) -> Result<Decimal, PricingError> {
        let resolved = self.resolve(quantity)?;
        let tier = resolved.tier();
        let standard = standard_garment(sizes)?;

        if !sizes
            .iter()
            .any(|record| record.size == size && record.is_available())
        {
            return Err(PricingError::MissingCatalogData(format!(
                "size {size} has no usable wholesale cost"
            )));
        }

        let garment =
            base_sell_price(standard.wholesale_cost, tier) + upcharge_for(upcharges, size);

        let effective = self.effective_color_count(color_count, dark_garment)?;
        if effective == 0 {
            return Ok(self.params.rounding.apply(garment));
        }

        let raw_print = self.cost_for(CostScope::Primary, tier.label(), effective)?
            + self.params.flash_charge * Decimal::from(effective);
        let print = raw_print / tier.margin_denominator();

        Ok(self.params.rounding.apply(add_print_cost(garment, print)))
    }

    /// Per-piece price for one additional location at a quantity. Additional
    /// costs are margin-adjusted upstream, so the row's amount is rounded and
    /// charged directly, with no size variation.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::MissingCatalogData`] for missing cost rows,
    /// [`PricingError::InvalidDecorationParameter`] for over-maximum color
    /// counts or a zero-color additional location, and tier-resolution
    /// errors.
    pub fn additional_location_price(
        &self,
        quantity: u32,
        color_count: u8,
        dark_garment: bool,
    ) -> Result<Decimal, PricingError> {
        if color_count == 0 {
            return Err(PricingError::InvalidDecorationParameter(
                "an additional location needs at least one color".into(),
            ));
        }
        let resolved = self.resolve(quantity)?;
        let effective = self.effective_color_count(color_count, dark_garment)?;
        let cost = self.cost_for(CostScope::Additional, resolved.tier().label(), effective)?;
        Ok(self.params.rounding.apply(cost))
    }

    /// One-time setup fees for the order, itemised per location.
    pub fn setup_fees(
        &self,
        locations: &[PrintLocation],
        dark_garment: bool,
    ) -> Vec<LocationSetup> {
        locations
            .iter()
            .map(|location| {
                let screen_count = location.screens(dark_garment);
                LocationSetup {
                    code: location.code.clone(),
                    screen_count,
                    fee: Decimal::from(screen_count) * self.params.setup_fee_per_screen,
                }
            })
            .collect()
    }

    /// Total of [`Self::setup_fees`].
    pub fn total_setup_fee(&self, locations: &[PrintLocation], dark_garment: bool) -> Decimal {
        self.setup_fees(locations, dark_garment)
            .iter()
            .map(|setup| setup.fee)
            .sum()
    }

    /// Per-piece safety stripe surcharge across the order's locations.
    pub fn safety_stripe_surcharge(&self, locations: &[PrintLocation]) -> Decimal {
        let flagged = locations
            .iter()
            .filter(|location| location.safety_stripes)
            .count();
        self.params.safety_stripe_fee * Decimal::from(flagged)
    }
}
