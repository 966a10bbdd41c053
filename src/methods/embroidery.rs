//! Embroidery pricing.
//!
//! Flat embroidery on garments: a per-tier embroidery cost covers the base
//! stitch count (typically 8,000); stitches beyond that bill in whole-thousand
//! increments, partial thousands rounding up. Additional (non-primary) logos
//! are priced per position from a tier-indexed AL table, and digitizing is a
//! one-time flat fee per logo that needs it, never scaled by quantity.

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;

use crate::{
    catalog::{GarmentSize, TierSchedule, UpchargeMap, standard_garment, upcharge_for},
    error::PricingError,
    garment::{add_print_cost, base_sell_price},
    rounding::RoundingMethod,
    tiers::{ResolvedTier, resolve_tier},
};

/// Extra-stitch billing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StitchParams {
    /// Stitches included free in the base embroidery cost.
    pub base_stitch_count: u32,
    /// Charge per whole 1,000 stitches over the base.
    pub rate_per_thousand: Decimal,
}

impl StitchParams {
    /// Shirt embroidery defaults: 8,000 base stitches at $1.25 per 1,000.
    #[must_use]
    pub fn shirt() -> Self {
        Self {
            base_stitch_count: 8_000,
            rate_per_thousand: Decimal::new(125, 2),
        }
    }

    /// The charge for stitches beyond the included base, billed in whole
    /// thousands with partial thousands rounding up.
    #[must_use]
    pub fn extra_stitch_charge(&self, stitch_count: u32) -> Decimal {
        let extra = stitch_count.saturating_sub(self.base_stitch_count);
        Decimal::from(extra.div_ceil(1_000)) * self.rate_per_thousand
    }
}

/// A single embroidered logo on an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logo {
    position: String,
    stitch_count: u32,
    needs_digitizing: bool,
    is_primary: bool,
}

impl Logo {
    /// Create the order's primary logo.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidDecorationParameter`] for a zero stitch
    /// count.
    pub fn primary(
        position: impl Into<String>,
        stitch_count: u32,
        needs_digitizing: bool,
    ) -> Result<Self, PricingError> {
        Self::new(position, stitch_count, needs_digitizing, true)
    }

    /// Create an additional (non-primary) logo.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidDecorationParameter`] for a zero stitch
    /// count.
    pub fn additional(
        position: impl Into<String>,
        stitch_count: u32,
        needs_digitizing: bool,
    ) -> Result<Self, PricingError> {
        Self::new(position, stitch_count, needs_digitizing, false)
    }

    fn new(
        position: impl Into<String>,
        stitch_count: u32,
        needs_digitizing: bool,
        is_primary: bool,
    ) -> Result<Self, PricingError> {
        if stitch_count == 0 {
            return Err(PricingError::InvalidDecorationParameter(
                "stitch count must be positive".into(),
            ));
        }
        Ok(Self {
            position: position.into(),
            stitch_count,
            needs_digitizing,
            is_primary,
        })
    }

    /// Placement name, e.g. `Left Chest`.
    pub fn position(&self) -> &str {
        &self.position
    }

    /// Total stitches in the design.
    pub fn stitch_count(&self) -> u32 {
        self.stitch_count
    }

    /// Whether artwork must be digitized for this logo.
    pub fn needs_digitizing(&self) -> bool {
        self.needs_digitizing
    }

    /// Whether this is the order's primary logo.
    pub fn is_primary(&self) -> bool {
        self.is_primary
    }
}

/// Documented fallback AL prices by tier label, used when the fetched table
/// has no entry for a position.
const AL_DEFAULT_PRICES: [(&str, i64); 4] = [("1-23", 7), ("24-47", 6), ("48-71", 5), ("72+", 4)];

const AL_DEFAULT_FALLBACK: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Tier-indexed additional-logo price table.
///
/// Lookups normalise position names (case and whitespace insensitive) and
/// tolerate substring matches as a fallback; exact matches win. Positions
/// missing from the table fall back to [`AL_DEFAULT_PRICES`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdditionalLogoPricing {
    prices: FxHashMap<String, Vec<(String, Decimal)>>,
}

fn normalize_position(position: &str) -> String {
    position
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl AdditionalLogoPricing {
    /// Build a table from `(tier label, position, price)` entries.
    #[must_use]
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String, Decimal)>,
    {
        let mut prices: FxHashMap<String, Vec<(String, Decimal)>> = FxHashMap::default();
        for (tier, position, price) in entries {
            prices.entry(tier).or_default().push((position, price));
        }
        Self { prices }
    }

    /// The AL price for a position at a tier.
    #[must_use]
    pub fn price_for(&self, tier_label: &str, position: &str) -> Decimal {
        let wanted = normalize_position(position);

        if let Some(entries) = self.prices.get(tier_label) {
            let exact = entries
                .iter()
                .find(|(candidate, _)| normalize_position(candidate) == wanted);
            let matched = exact.or_else(|| {
                entries.iter().find(|(candidate, _)| {
                    let candidate = normalize_position(candidate);
                    candidate.contains(&wanted) || wanted.contains(&candidate)
                })
            });
            if let Some((_, price)) = matched {
                return *price;
            }
        }

        AL_DEFAULT_PRICES
            .iter()
            .find(|(label, _)| *label == tier_label)
            .map_or(AL_DEFAULT_FALLBACK, |(_, dollars)| Decimal::from(*dollars))
    }
}

/// Embroidery pricing catalog for one decoration context: the tier schedule,
/// per-tier embroidery costs, stitch billing parameters, and AL table.
#[derive(Debug, Clone)]
pub struct EmbroideryCatalog {
    tiers: TierSchedule,
    costs: FxHashMap<String, Decimal>,
    stitch: StitchParams,
    digitizing_fee: Decimal,
    rounding: RoundingMethod,
    additional_logos: AdditionalLogoPricing,
}

impl EmbroideryCatalog {
    /// Assemble a catalog from its fetched parts.
    pub fn new(
        tiers: TierSchedule,
        costs: FxHashMap<String, Decimal>,
        stitch: StitchParams,
        digitizing_fee: Decimal,
        rounding: RoundingMethod,
        additional_logos: AdditionalLogoPricing,
    ) -> Self {
        Self {
            tiers,
            costs,
            stitch,
            digitizing_fee,
            rounding,
            additional_logos,
        }
    }

    /// The catalog's tier schedule.
    pub fn tiers(&self) -> &TierSchedule {
        &self.tiers
    }

    /// Stitch billing parameters.
    pub fn stitch_params(&self) -> &StitchParams {
        &self.stitch
    }

    /// One-time flat fee per logo needing digitization.
    pub fn digitizing_fee(&self) -> Decimal {
        self.digitizing_fee
    }

    /// Resolve the order quantity against the schedule.
    ///
    /// # Errors
    ///
    /// See [`resolve_tier`].
    pub fn resolve(&self, quantity: u32) -> Result<ResolvedTier<'_>, PricingError> {
        resolve_tier(quantity, &self.tiers)
    }

    /// The per-piece embroidery cost for a tier.
    ///
    /// # Errors
    ///
    /// A missing tier entry is a [`PricingError::MissingCatalogData`], never
    /// a zero-price fallback.
    pub fn tier_cost(&self, tier_label: &str) -> Result<Decimal, PricingError> {
        self.costs.get(tier_label).copied().ok_or_else(|| {
            PricingError::MissingCatalogData(format!(
                "no embroidery cost for tier {tier_label}"
            ))
        })
    }

    /// Decorated unit price for one size at one quantity.
    ///
    /// Composition order matters and matches the authoritative cost model:
    /// the standard garment's decorated price is rounded first, then the
    /// size's relative upcharge and the primary logo's extra-stitch charge
    /// are added on top without further rounding.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::MissingCatalogData`] when the size is unknown
    /// or the tier has no cost entry, and tier-resolution errors from
    /// [`resolve_tier`].
    pub fn decorated_unit_price(
        &self,
        sizes: &[GarmentSize],
        upcharges: &UpchargeMap,
        size: &str,
        quantity: u32,
        primary_logo: &Logo,
    ) -> Result<Decimal, PricingError> {
        let resolved = self.resolve(quantity)?;
        let tier = resolved.tier();
        let standard = standard_garment(sizes)?;

        let record = sizes
            .iter()
            .find(|candidate| candidate.size == size)
            .ok_or_else(|| {
                PricingError::MissingCatalogData(format!("size {size} is not in the size run"))
            })?;
        if !record.is_available() {
            return Err(PricingError::MissingCatalogData(format!(
                "size {size} has no usable wholesale cost"
            )));
        }

        let emb_cost = self.tier_cost(tier.label())?;
        let decorated = add_print_cost(
            base_sell_price(standard.wholesale_cost, tier),
            emb_cost,
        );
        let rounded = self.rounding.apply(decorated);

        // Upcharges are relative to the base size so tall-only runs whose
        // first size already carries an upcharge price correctly.
        let relative_upcharge =
            upcharge_for(upcharges, size) - upcharge_for(upcharges, &standard.size);
        let extra_stitches = self.stitch.extra_stitch_charge(primary_logo.stitch_count());

        Ok(rounded + relative_upcharge + extra_stitches)
    }

    /// Per-piece price for an additional logo at a quantity.
    ///
    /// AL prices come from the tier table plus extra-stitch charges; no
    /// rounding and no margin division are applied.
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
        Ok(table_price + self.stitch.extra_stitch_charge(logo.stitch_count()))
    }

    /// The full tier-by-size decorated price grid at the base stitch count,
    /// for display layers.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::MissingCatalogData`] when a tier has no cost
    /// entry or no size has a usable cost.
    pub fn price_profile(
        &self,
        sizes: &[GarmentSize],
        upcharges: &UpchargeMap,
    ) -> Result<FxHashMap<String, FxHashMap<String, Decimal>>, PricingError> {
        let standard = standard_garment(sizes)?;
        let base_upcharge = upcharge_for(upcharges, &standard.size);

        let mut profile = FxHashMap::default();
        for tier in &self.tiers {
            let emb_cost = self.tier_cost(tier.label())?;
            let rounded = self.rounding.apply(add_print_cost(
                base_sell_price(standard.wholesale_cost, tier),
                emb_cost,
            ));

            let mut row = FxHashMap::default();
            for record in sizes.iter().filter(|record| record.is_available()) {
                let relative = upcharge_for(upcharges, &record.size) - base_upcharge;
                row.insert(record.size.clone(), rounded + relative);
            }
            profile.insert(tier.label().to_string(), row);
        }
        Ok(profile)
    }
}
