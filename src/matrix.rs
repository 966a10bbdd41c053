//! Price matrix assembly.
//!
//! The matrix is the display-ready product of the engine: for every offered
//! print location, a size-by-tier grid of finished unit prices. Location
//! codes may be combined (`LC_FB` is a left chest plus a full back); the
//! constituent print costs are summed before margin division. Sizes whose
//! wholesale cost is unusable get no cells at all, so a lookup against them
//! fails loudly instead of returning a price for a garment that cannot be
//! bought.

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;

use crate::{
    catalog::{GarmentSize, Location, TierSchedule, UpchargeMap, lowest_wholesale_cost, upcharge_for},
    error::PricingError,
    garment::{add_print_cost, base_sell_price},
    rounding::RoundingMethod,
    tiers::{ResolvedTier, resolve_tier},
};

/// Canonical size ordering used to interpret size-range row keys.
pub const SIZE_ORDER: [&str; 10] = [
    "XS", "S", "M", "L", "XL", "2XL", "3XL", "4XL", "5XL", "6XL",
];

/// A fetched per-location, per-tier print cost.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationCost {
    /// Single location code the cost prices, e.g. `LC`.
    pub location_code: String,
    /// Tier label the cost belongs to.
    pub tier_label: String,
    /// Raw print cost, margin-divided during assembly.
    pub cost: Decimal,
}

type SizeGrid = FxHashMap<String, FxHashMap<String, Decimal>>;

/// The assembled location → size → tier price grid.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceMatrix {
    cells: FxHashMap<String, SizeGrid>,
    tiers: TierSchedule,
}

fn size_rank(size: &str) -> Option<usize> {
    SIZE_ORDER
        .iter()
        .position(|candidate| candidate.eq_ignore_ascii_case(size))
}

fn range_key_covers(key: &str, size: &str) -> bool {
    let Some((low, high)) = key.split_once('-') else {
        return false;
    };
    match (size_rank(low), size_rank(high), size_rank(size)) {
        (Some(low), Some(high), Some(wanted)) => low <= wanted && wanted <= high,
        _ => false,
    }
}

impl PriceMatrix {
    /// Wrap prebuilt cells, e.g. a grid fetched with size-range row keys.
    pub fn from_cells(cells: FxHashMap<String, SizeGrid>, tiers: TierSchedule) -> Self {
        Self { cells, tiers }
    }

    /// The schedule quantities are resolved against.
    pub fn tiers(&self) -> &TierSchedule {
        &self.tiers
    }

    /// Location codes the matrix covers.
    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    /// Direct cell access by location, size key, and tier label.
    pub fn price(&self, location: &str, size: &str, tier_label: &str) -> Option<Decimal> {
        self.cells
            .get(location)?
            .get(size)?
            .get(tier_label)
            .copied()
    }

    /// Resolve a quantity and look up the unit price for a location and
    /// size. The size is matched against exact row keys first, then against
    /// size-range keys such as `S-XL` using the canonical size order.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::MissingCatalogData`] when the location, size,
    /// or tier has no cell, and tier-resolution errors from [`resolve_tier`].
    pub fn lookup_price(
        &self,
        location: &str,
        size: &str,
        quantity: u32,
    ) -> Result<Decimal, PricingError> {
        let resolved = self.resolve(quantity)?;
        let tier_label = resolved.tier().label();

        let grid = self.cells.get(location).ok_or_else(|| {
            PricingError::MissingCatalogData(format!("no prices for location {location}"))
        })?;

        let row = grid.get(size).or_else(|| {
            grid.iter()
                .find(|(key, _)| range_key_covers(key, size))
                .map(|(_, row)| row)
        });
        let row = row.ok_or_else(|| {
            PricingError::MissingCatalogData(format!(
                "no price row for size {size} at location {location}"
            ))
        })?;

        row.get(tier_label).copied().ok_or_else(|| {
            PricingError::MissingCatalogData(format!(
                "no price for tier {tier_label} at location {location}, size {size}"
            ))
        })
    }

    /// Resolve the order quantity against the schedule.
    ///
    /// # Errors
    ///
    /// See [`resolve_tier`].
    pub fn resolve(&self, quantity: u32) -> Result<ResolvedTier<'_>, PricingError> {
        resolve_tier(quantity, &self.tiers)
    }
}

/// Assemble the full price matrix from fetched catalog data.
///
/// Every location gets a row per available size and a price per tier: the
/// cheapest usable wholesale cost is margin-divided, the location's summed
/// print cost added, the result rounded, and the size's absolute upcharge
/// layered on last so it survives rounding intact.
///
/// # Errors
///
/// Returns [`PricingError::MissingCatalogData`] when no size is usable or a
/// location constituent has no cost for a tier.
pub fn build_matrix(
    costs: &[LocationCost],
    tiers: TierSchedule,
    sizes: &[GarmentSize],
    upcharges: &UpchargeMap,
    locations: &[Location],
    rounding: RoundingMethod,
) -> Result<PriceMatrix, PricingError> {
    let base_cost = lowest_wholesale_cost(sizes)?;

    let mut indexed: FxHashMap<(&str, &str), Decimal> = FxHashMap::default();
    for row in costs {
        indexed.insert((row.location_code.as_str(), row.tier_label.as_str()), row.cost);
    }

    let mut cells: FxHashMap<String, SizeGrid> = FxHashMap::default();
    for location in locations {
        let mut grid: SizeGrid = FxHashMap::default();
        for tier in &tiers {
            let mut print_cost = Decimal::ZERO;
            for constituent in location.code.split('_') {
                let cost = indexed.get(&(constituent, tier.label())).ok_or_else(|| {
                    PricingError::MissingCatalogData(format!(
                        "no print cost for location {constituent} at tier {}",
                        tier.label()
                    ))
                })?;
                print_cost += *cost;
            }

            let rounded =
                rounding.apply(add_print_cost(base_sell_price(base_cost, tier), print_cost));

            for record in sizes.iter().filter(|record| record.is_available()) {
                grid.entry(record.size.clone())
                    .or_default()
                    .insert(tier.label().to_string(), rounded + upcharge_for(upcharges, &record.size));
            }
        }
        cells.insert(location.code.clone(), grid);
    }

    Ok(PriceMatrix { cells, tiers })
}
