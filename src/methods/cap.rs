//! Cap embroidery pricing.
//!
//! Same base math as shirt embroidery but with cap production parameters:
//! caps run at a different margin (0.57 in the current catalog), bill extra
//! stitches at $1.00 per 1,000 instead of $1.25, and price additional logos
//! against a 5,000-stitch base. The front logo is always required and present
//! by default; extra positions come from a fetched position catalog and are
//! each independently configurable.

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::{
    catalog::{GarmentSize, TierSchedule, UpchargeMap, upcharge_for},
    error::PricingError,
    garment::{add_print_cost, base_sell_price},
    methods::embroidery::{AdditionalLogoPricing, Logo, StitchParams},
    rounding::RoundingMethod,
    tiers::{ResolvedTier, resolve_tier},
};

/// One-size-fits-all style size labels tried, in order, when picking the
/// standard cap for base pricing.
const PREFERRED_CAP_SIZES: [&str; 5] = ["OSFA", "S/M", "M/L", "L/XL", "OS"];

/// Cap stitch billing defaults: 8,000 base stitches at $1.00 per 1,000.
#[must_use]
pub fn cap_stitch_params() -> StitchParams {
    StitchParams {
        base_stitch_count: 8_000,
        rate_per_thousand: Decimal::ONE,
    }
}

/// Cap AL stitch billing defaults: 5,000 base stitches at $1.00 per 1,000.
#[must_use]
pub fn cap_additional_logo_stitch_params() -> StitchParams {
    StitchParams {
        base_stitch_count: 5_000,
        rate_per_thousand: Decimal::ONE,
    }
}

/// The decoration plan for a cap order: a required front logo plus optional
/// additional positions drawn from the catalog's position list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapDecoration {
    front: Logo,
    additional: Vec<Logo>,
}

impl CapDecoration {
    /// Create a plan with the required front logo.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidDecorationParameter`] for a zero stitch
    /// count.
    pub fn new(front_stitch_count: u32, front_needs_digitizing: bool) -> Result<Self, PricingError> {
        Ok(Self {
            front: Logo::primary("Cap Front", front_stitch_count, front_needs_digitizing)?,
            additional: Vec::new(),
        })
    }

    /// Add an additional position, validated against the catalog's position
    /// list.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidDecorationParameter`] when the position
    /// is not in the catalog, and logo-construction errors.
    pub fn add_position(
        &mut self,
        catalog: &CapEmbroideryCatalog,
        position: &str,
        stitch_count: u32,
        needs_digitizing: bool,
    ) -> Result<(), PricingError> {
        if !catalog.offers_position(position) {
            return Err(PricingError::InvalidDecorationParameter(format!(
                "cap position {position} is not offered"
            )));
        }
        self.additional
            .push(Logo::additional(position, stitch_count, needs_digitizing)?);
        Ok(())
    }

    /// The required front logo.
    pub fn front(&self) -> &Logo {
        &self.front
    }

    /// Additional position logos.
    pub fn additional(&self) -> &[Logo] {
        &self.additional
    }

    /// Number of logos across the plan that need digitizing.
    pub fn digitizing_count(&self) -> usize {
        usize::from(self.front.needs_digitizing())
            + self
                .additional
                .iter()
                .filter(|logo| logo.needs_digitizing())
                .count()
    }
}

/// Cap embroidery pricing catalog.
#[derive(Debug, Clone)]
pub struct CapEmbroideryCatalog {
    tiers: TierSchedule,
    costs: FxHashMap<String, Decimal>,
    stitch: StitchParams,
    al_stitch: StitchParams,
    digitizing_fee: Decimal,
    rounding: RoundingMethod,
    additional_logos: AdditionalLogoPricing,
    positions: SmallVec<[String; 4]>,
}

impl CapEmbroideryCatalog {
    /// Assemble a catalog from its fetched parts. `positions` is the fetched
    /// catalog of optional placements (the front is always implied).
    pub fn new(
        tiers: TierSchedule,
        costs: FxHashMap<String, Decimal>,
        digitizing_fee: Decimal,
        rounding: RoundingMethod,
        additional_logos: AdditionalLogoPricing,
        positions: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            tiers,
            costs,
            stitch: cap_stitch_params(),
            al_stitch: cap_additional_logo_stitch_params(),
            digitizing_fee,
            rounding,
            additional_logos,
            positions: positions.into_iter().collect(),
        }
    }

    /// The catalog's tier schedule.
    pub fn tiers(&self) -> &TierSchedule {
        &self.tiers
    }

    /// One-time flat fee per logo needing digitization.
    pub fn digitizing_fee(&self) -> Decimal {
        self.digitizing_fee
    }

    /// Whether the catalog offers an optional placement.
    pub fn offers_position(&self, position: &str) -> bool {
        self.positions
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(position))
    }

    /// Resolve the order quantity against the schedule.
    ///
    /// # Errors
    ///
    /// See [`resolve_tier`].
    pub fn resolve(&self, quantity: u32) -> Result<ResolvedTier<'_>, PricingError> {
        resolve_tier(quantity, &self.tiers)
    }

    /// The per-piece cap embroidery cost for a tier.
    ///
    /// # Errors
    ///
    /// A missing tier entry is a [`PricingError::MissingCatalogData`].
    pub fn tier_cost(&self, tier_label: &str) -> Result<Decimal, PricingError> {
        self.costs.get(tier_label).copied().ok_or_else(|| {
            PricingError::MissingCatalogData(format!(
                "no cap embroidery cost for tier {tier_label}"
            ))
        })
    }

    /// The standard cap used for base pricing: the first OSFA-style size
    /// with a usable cost, falling back to the cheapest available size.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::MissingCatalogData`] if no size has a usable
    /// wholesale cost.
    pub fn standard_cap_cost(&self, sizes: &[GarmentSize]) -> Result<Decimal, PricingError> {
        for preferred in PREFERRED_CAP_SIZES {
            if let Some(record) = sizes
                .iter()
                .find(|record| record.size.eq_ignore_ascii_case(preferred) && record.is_available())
            {
                return Ok(record.wholesale_cost);
            }
        }
        sizes
            .iter()
            .filter(|record| record.is_available())
            .map(|record| record.wholesale_cost)
            .min()
            .ok_or_else(|| {
                PricingError::MissingCatalogData("no cap size has a usable wholesale cost".into())
            })
    }

    /// Decorated unit price for one cap size at one quantity.
    ///
    /// Same bottom-up order as shirts: round the base decorated price first,
    /// then add extra-stitch fees and the size upcharge on top.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::MissingCatalogData`] for missing tier costs or
    /// an unusable size run, and tier-resolution errors from [`resolve_tier`].
    pub fn decorated_unit_price(
        &self,
        sizes: &[GarmentSize],
        upcharges: &UpchargeMap,
        size: &str,
        quantity: u32,
        decoration: &CapDecoration,
    ) -> Result<Decimal, PricingError> {
        let resolved = self.resolve(quantity)?;
        let tier = resolved.tier();
        let emb_cost = self.tier_cost(tier.label())?;

        let base_cost = sizes
            .iter()
            .find(|record| record.size == size && record.is_available())
            .map_or_else(|| self.standard_cap_cost(sizes), |record| Ok(record.wholesale_cost))?;

        let decorated = add_print_cost(base_sell_price(base_cost, tier), emb_cost);
        let rounded = self.rounding.apply(decorated);

        let extra = self
            .stitch
            .extra_stitch_charge(decoration.front().stitch_count());

        Ok(rounded + extra + upcharge_for(upcharges, size))
    }

    /// Per-piece price for one additional cap logo: the cap AL table price
    /// plus extra stitches over the 5,000-stitch AL base, unrounded.
    ///
    /// # Errors
    ///
    /// Tier-resolution errors from [`resolve_tier`].
    pub fn additional_logo_price(
        &self,
        quantity: u32,
        logo: &Logo,
    ) -> Result<Decimal, PricingError> {
        let resolved = self.resolve(quantity)?;
        let table_price = self
            .additional_logos
            .price_for(resolved.tier().label(), logo.position());
        Ok(table_price + self.al_stitch.extra_stitch_charge(logo.stitch_count()))
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::catalog::Tier;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap_or_default()
    }

    fn catalog() -> Result<CapEmbroideryCatalog, PricingError> {
        let tiers = TierSchedule::new(vec![
            Tier::new("1-23", 1, Some(23), dec("0.57"), dec("50"))?,
            Tier::new("24-47", 24, Some(47), dec("0.57"), Decimal::ZERO)?,
            Tier::new("48-71", 48, Some(71), dec("0.57"), Decimal::ZERO)?,
            Tier::new("72+", 72, None, dec("0.57"), Decimal::ZERO)?,
        ])?;
        let mut costs = FxHashMap::default();
        costs.insert("1-23".to_string(), dec("12"));
        costs.insert("24-47".to_string(), dec("12"));
        costs.insert("48-71".to_string(), dec("10"));
        costs.insert("72+".to_string(), dec("8.5"));

        Ok(CapEmbroideryCatalog::new(
            tiers,
            costs,
            dec("100"),
            RoundingMethod::CeilHalfDollar,
            AdditionalLogoPricing::default(),
            ["Cap Back".to_string(), "Cap Side".to_string()],
        ))
    }

    fn sizes() -> Vec<GarmentSize> {
        vec![GarmentSize::new("OSFA", dec("3.41"), 1)]
    }

    #[test]
    fn front_logo_is_always_present() -> TestResult {
        let decoration = CapDecoration::new(8_000, true)?;
        assert_eq!(decoration.front().position(), "Cap Front");
        assert!(decoration.front().is_primary());
        assert_eq!(decoration.digitizing_count(), 1);
        Ok(())
    }

    #[test]
    fn positions_come_from_the_catalog() -> TestResult {
        let catalog = catalog()?;
        let mut decoration = CapDecoration::new(8_000, false)?;

        decoration.add_position(&catalog, "Cap Back", 6_000, false)?;
        assert!(matches!(
            decoration.add_position(&catalog, "Sleeve", 6_000, false),
            Err(PricingError::InvalidDecorationParameter(_))
        ));
        Ok(())
    }

    #[test]
    fn snapback_prices_with_cap_margin_and_rounding() -> TestResult {
        // 3.41 / 0.57 = 5.9825, + 12.00 = 17.9825, CeilHalfDollar = 18.00.
        let catalog = catalog()?;
        let decoration = CapDecoration::new(8_000, false)?;
        let price =
            catalog.decorated_unit_price(&sizes(), &UpchargeMap::default(), "OSFA", 24, &decoration)?;
        assert_eq!(price, dec("18.00"));
        Ok(())
    }

    #[test]
    fn extra_stitches_bill_at_one_dollar_after_rounding() -> TestResult {
        let catalog = catalog()?;
        let decoration = CapDecoration::new(10_000, false)?;
        let price =
            catalog.decorated_unit_price(&sizes(), &UpchargeMap::default(), "OSFA", 24, &decoration)?;
        // 18.00 base + 2 * $1.00 extra stitch, no re-rounding.
        assert_eq!(price, dec("20.00"));
        Ok(())
    }

    #[test]
    fn cap_al_uses_five_thousand_stitch_base() -> TestResult {
        let catalog = catalog()?;
        let logo = Logo::additional("Cap Back", 7_000, false)?;
        // Default 24-47 AL table = $6.00, + 2 * $1.00 over the 5k base.
        assert_eq!(catalog.additional_logo_price(24, &logo)?, dec("8.00"));
        Ok(())
    }

    #[test]
    fn standard_cap_prefers_osfa_labels() -> TestResult {
        let catalog = catalog()?;
        let run = vec![
            GarmentSize::new("S/M", dec("4.10"), 1),
            GarmentSize::new("L/XL", dec("4.25"), 2),
        ];
        assert_eq!(catalog.standard_cap_cost(&run)?, dec("4.10"));
        Ok(())
    }
}
