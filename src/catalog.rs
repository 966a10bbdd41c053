//! Catalog records.
//!
//! The engine consumes three categories of externally-fetched catalog data,
//! each modeled here as plain typed records: the tier catalog, the cost
//! catalog, and the garment catalog (per-size wholesale costs and upcharges).
//! All records are constructed fresh per pricing request, used read-only, and
//! discarded.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::PricingError;

/// Additive per-size amounts layered onto the base price for non-standard
/// sizes. Sizes not present imply a zero upcharge.
pub type UpchargeMap = FxHashMap<String, Decimal>;

/// The decoration methods this engine knows how to price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecorationMethod {
    /// Flat embroidery on garments.
    Embroidery,
    /// Embroidery on caps, with distinct production parameters.
    CapEmbroidery,
    /// Screen printing.
    ScreenPrint,
    /// Direct-to-garment printing.
    Dtg,
}

impl DecorationMethod {
    /// Parse an embellishment-method string.
    ///
    /// # Errors
    ///
    /// Unknown method strings are an [`PricingError::InvalidDecorationParameter`];
    /// the engine never guesses a default method.
    pub fn parse(value: &str) -> Result<Self, PricingError> {
        match value {
            "embroidery" => Ok(Self::Embroidery),
            "cap-embroidery" => Ok(Self::CapEmbroidery),
            "screenprint" | "screen-print" => Ok(Self::ScreenPrint),
            "dtg" => Ok(Self::Dtg),
            other => Err(PricingError::InvalidDecorationParameter(format!(
                "unknown embellishment method: {other}"
            ))),
        }
    }
}

/// A quantity range with an associated margin denominator and
/// less-than-minimum fee.
#[derive(Debug, Clone, PartialEq)]
pub struct Tier {
    label: String,
    min_qty: u32,
    max_qty: Option<u32>,
    margin_denominator: Decimal,
    ltm_fee: Decimal,
}

impl Tier {
    /// Create a tier, validating the margin denominator and fee.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::MalformedUpstreamResponse`] if the margin
    /// denominator falls outside `(0, 1]`, the LTM fee is negative, or the
    /// quantity range is empty.
    pub fn new(
        label: impl Into<String>,
        min_qty: u32,
        max_qty: Option<u32>,
        margin_denominator: Decimal,
        ltm_fee: Decimal,
    ) -> Result<Self, PricingError> {
        let label = label.into();
        if margin_denominator <= Decimal::ZERO || margin_denominator > Decimal::ONE {
            return Err(PricingError::MalformedUpstreamResponse(format!(
                "tier {label}: margin denominator {margin_denominator} outside (0, 1]"
            )));
        }
        if ltm_fee < Decimal::ZERO {
            return Err(PricingError::MalformedUpstreamResponse(format!(
                "tier {label}: negative LTM fee {ltm_fee}"
            )));
        }
        if min_qty == 0 || max_qty.is_some_and(|max| max < min_qty) {
            return Err(PricingError::MalformedUpstreamResponse(format!(
                "tier {label}: empty quantity range"
            )));
        }
        Ok(Self {
            label,
            min_qty,
            max_qty,
            margin_denominator,
            ltm_fee,
        })
    }

    /// The tier label, e.g. `24-47` or `72+`.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Lowest quantity the tier covers.
    pub fn min_qty(&self) -> u32 {
        self.min_qty
    }

    /// Highest quantity the tier covers, or `None` for an open-ended tier.
    pub fn max_qty(&self) -> Option<u32> {
        self.max_qty
    }

    /// Divisor applied to wholesale cost to yield sell price.
    pub fn margin_denominator(&self) -> Decimal {
        self.margin_denominator
    }

    /// Flat surcharge for orders below the method's minimum quantity.
    pub fn ltm_fee(&self) -> Decimal {
        self.ltm_fee
    }

    /// The stated margin, `1 - margin_denominator`.
    pub fn margin(&self) -> Percentage {
        Percentage::from(Decimal::ONE - self.margin_denominator)
    }

    /// Whether the tier's quantity range contains `quantity`.
    pub fn contains(&self, quantity: u32) -> bool {
        quantity >= self.min_qty && self.max_qty.is_none_or(|max| quantity <= max)
    }
}

/// A validated, ordered set of tiers.
///
/// Tiers partition the covered quantities into contiguous, non-overlapping
/// ranges sorted by minimum quantity, so exactly one tier matches any
/// quantity in the schedule's span.
#[derive(Debug, Clone, PartialEq)]
pub struct TierSchedule {
    // Split storage keeps the schedule non-empty by construction.
    first: Tier,
    rest: Vec<Tier>,
}

impl TierSchedule {
    /// Build a schedule from tier records, sorting by minimum quantity.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::MalformedUpstreamResponse`] when the set is
    /// empty, ranges overlap or leave gaps, or an open-ended tier is not
    /// last.
    pub fn new(mut tiers: Vec<Tier>) -> Result<Self, PricingError> {
        tiers.sort_by_key(Tier::min_qty);

        for pair in tiers.windows(2) {
            let [prev, next] = pair else { continue };
            let Some(prev_max) = prev.max_qty() else {
                return Err(PricingError::MalformedUpstreamResponse(format!(
                    "open-ended tier {} is not last",
                    prev.label()
                )));
            };
            if next.min_qty() != prev_max + 1 {
                return Err(PricingError::MalformedUpstreamResponse(format!(
                    "tiers {} and {} are not contiguous",
                    prev.label(),
                    next.label()
                )));
            }
        }

        let mut tiers = tiers.into_iter();
        let Some(first) = tiers.next() else {
            return Err(PricingError::MalformedUpstreamResponse(
                "tier schedule is empty".into(),
            ));
        };
        Ok(Self {
            first,
            rest: tiers.collect(),
        })
    }

    /// The tier with the lowest minimum quantity.
    pub fn lowest(&self) -> &Tier {
        &self.first
    }

    /// The inclusive quantity span the schedule covers.
    pub fn span(&self) -> (u32, u32) {
        let min = self.first.min_qty();
        let max = self
            .rest
            .last()
            .unwrap_or(&self.first)
            .max_qty()
            .unwrap_or(u32::MAX);
        (min, max)
    }

    /// Iterate tiers in ascending quantity order.
    pub fn iter(&self) -> impl Iterator<Item = &Tier> {
        std::iter::once(&self.first).chain(self.rest.iter())
    }

    /// Look up a tier by label.
    pub fn get(&self, label: &str) -> Option<&Tier> {
        self.iter().find(|tier| tier.label() == label)
    }

    /// The tier whose range contains `quantity`, if any.
    pub fn containing(&self, quantity: u32) -> Option<&Tier> {
        self.iter().find(|tier| tier.contains(quantity))
    }
}

impl<'a> IntoIterator for &'a TierSchedule {
    type Item = &'a Tier;
    type IntoIter = std::iter::Chain<std::iter::Once<&'a Tier>, std::slice::Iter<'a, Tier>>;

    fn into_iter(self) -> Self::IntoIter {
        std::iter::once(&self.first).chain(self.rest.iter())
    }
}

/// Per-size wholesale cost for a specific style/color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GarmentSize {
    /// Size label, e.g. `S` or `2XL`.
    pub size: String,
    /// Wholesale cost of the garment in this size. A zero cost marks the
    /// size as unavailable (discontinued), never as free.
    pub wholesale_cost: Decimal,
    /// Display/sort position within the size run.
    pub sort_order: i32,
}

impl GarmentSize {
    /// Create a size record.
    pub fn new(size: impl Into<String>, wholesale_cost: Decimal, sort_order: i32) -> Self {
        Self {
            size: size.into(),
            wholesale_cost,
            sort_order,
        }
    }

    /// Whether the size carries a usable wholesale cost.
    pub fn is_available(&self) -> bool {
        self.wholesale_cost > Decimal::ZERO
    }
}

/// Sort a size run into catalog order (by `sort_order` ascending).
pub fn sorted_sizes(sizes: &[GarmentSize]) -> Vec<&GarmentSize> {
    let mut sorted: Vec<&GarmentSize> = sizes.iter().collect();
    sorted.sort_by_key(|record| record.sort_order);
    sorted
}

/// Pick the standard garment used to derive per-tier base pricing: the size
/// literal `S`, or the first available size in sort order when `S` is absent.
///
/// # Errors
///
/// Returns [`PricingError::MissingCatalogData`] if no size has a usable
/// wholesale cost.
pub fn standard_garment(sizes: &[GarmentSize]) -> Result<&GarmentSize, PricingError> {
    let sorted = sorted_sizes(sizes);
    sorted
        .iter()
        .find(|record| record.size.eq_ignore_ascii_case("S") && record.is_available())
        .or_else(|| sorted.iter().find(|record| record.is_available()))
        .copied()
        .ok_or_else(|| {
            PricingError::MissingCatalogData("no size has a usable wholesale cost".into())
        })
}

/// The lowest usable wholesale cost across the size run.
///
/// # Errors
///
/// Returns [`PricingError::MissingCatalogData`] if no size has a usable
/// wholesale cost.
pub fn lowest_wholesale_cost(sizes: &[GarmentSize]) -> Result<Decimal, PricingError> {
    sizes
        .iter()
        .filter(|record| record.is_available())
        .map(|record| record.wholesale_cost)
        .min()
        .ok_or_else(|| {
            PricingError::MissingCatalogData("no size has a usable wholesale cost".into())
        })
}

/// The upcharge for a size, zero when the map has no entry.
pub fn upcharge_for(upcharges: &UpchargeMap, size: &str) -> Decimal {
    upcharges.get(size).copied().unwrap_or_default()
}

/// A print/embroidery placement offered by a decoration method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Short placement code, e.g. `LC` or the combined `LC_FB`.
    pub code: String,
    /// Human-readable placement name.
    pub name: String,
}

impl Location {
    /// Create a location record.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap_or_default()
    }

    fn schedule() -> Result<TierSchedule, PricingError> {
        TierSchedule::new(vec![
            Tier::new("24-47", 24, Some(47), dec("0.6"), dec("50"))?,
            Tier::new("48-71", 48, Some(71), dec("0.6"), Decimal::ZERO)?,
            Tier::new("72+", 72, None, dec("0.6"), Decimal::ZERO)?,
        ])
    }

    #[test]
    fn schedule_sorts_and_validates_contiguity() -> TestResult {
        let schedule = TierSchedule::new(vec![
            Tier::new("72+", 72, None, dec("0.6"), Decimal::ZERO)?,
            Tier::new("24-47", 24, Some(47), dec("0.6"), dec("50"))?,
            Tier::new("48-71", 48, Some(71), dec("0.6"), Decimal::ZERO)?,
        ])?;

        assert_eq!(schedule.lowest().label(), "24-47");
        assert_eq!(schedule.span(), (24, u32::MAX));
        Ok(())
    }

    #[test]
    fn schedule_rejects_gaps() -> TestResult {
        let result = TierSchedule::new(vec![
            Tier::new("24-47", 24, Some(47), dec("0.6"), dec("50"))?,
            Tier::new("50-71", 50, Some(71), dec("0.6"), Decimal::ZERO)?,
        ]);

        assert!(matches!(
            result,
            Err(PricingError::MalformedUpstreamResponse(_))
        ));
        Ok(())
    }

    #[test]
    fn every_covered_quantity_matches_exactly_one_tier() -> TestResult {
        let schedule = schedule()?;
        for quantity in 24..200u32 {
            let matches = schedule
                .iter()
                .filter(|tier| tier.contains(quantity))
                .count();
            assert_eq!(matches, 1, "quantity {quantity} matched {matches} tiers");
        }
        Ok(())
    }

    #[test]
    fn tier_rejects_bad_margin_denominator() {
        assert!(Tier::new("24-47", 24, Some(47), Decimal::ZERO, Decimal::ZERO).is_err());
        assert!(Tier::new("24-47", 24, Some(47), dec("1.2"), Decimal::ZERO).is_err());
    }

    #[test]
    fn tier_margin_is_one_minus_denominator() -> TestResult {
        let tier = Tier::new("24-47", 24, Some(47), dec("0.6"), Decimal::ZERO)?;
        assert_eq!(tier.margin(), Percentage::from(dec("0.4")));
        Ok(())
    }

    #[test]
    fn standard_garment_prefers_small() -> TestResult {
        let sizes = vec![
            GarmentSize::new("M", dec("3.60"), 2),
            GarmentSize::new("S", dec("3.53"), 1),
            GarmentSize::new("2XL", dec("5.20"), 5),
        ];
        assert_eq!(standard_garment(&sizes)?.size, "S");
        Ok(())
    }

    #[test]
    fn standard_garment_falls_back_to_first_available() -> TestResult {
        let sizes = vec![
            GarmentSize::new("LT", Decimal::ZERO, 1),
            GarmentSize::new("XLT", dec("7.10"), 2),
            GarmentSize::new("2XLT", dec("8.25"), 3),
        ];
        assert_eq!(standard_garment(&sizes)?.size, "XLT");
        Ok(())
    }

    #[test]
    fn standard_garment_errors_with_no_usable_cost() {
        let sizes = vec![GarmentSize::new("S", Decimal::ZERO, 1)];
        assert!(matches!(
            standard_garment(&sizes),
            Err(PricingError::MissingCatalogData(_))
        ));
    }

    #[test]
    fn unknown_method_string_is_rejected() {
        assert!(matches!(
            DecorationMethod::parse("laser-etch"),
            Err(PricingError::InvalidDecorationParameter(_))
        ));
        assert_eq!(
            DecorationMethod::parse("screen-print").ok(),
            Some(DecorationMethod::ScreenPrint)
        );
    }
}
