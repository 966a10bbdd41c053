//! Upstream payload ingestion.
//!
//! The pricing API ships one JSON bundle per product and method, with
//! `PascalCase` record fields and a handful of quirks this module absorbs:
//! open-ended tiers arrive with a `99999` sentinel maximum, garment costs
//! live in either `price` or `maxCasePrice`, and the rounding rule is a
//! string name. Everything is validated into the typed catalog records here,
//! so the pricing modules never see raw JSON.

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{
    catalog::{GarmentSize, Location, Tier, TierSchedule, UpchargeMap},
    error::PricingError,
    matrix::LocationCost,
    methods::screenprint::{CostScope, ScreenPrintCost},
    rounding::RoundingMethod,
};

/// Maximum-quantity sentinel the API uses for open-ended tiers.
const OPEN_ENDED_SENTINEL: u32 = 99_999;

#[derive(Debug, Clone, Deserialize)]
struct TierDoc {
    #[serde(rename = "TierLabel")]
    label: String,
    #[serde(rename = "MinQuantity")]
    min_qty: u32,
    #[serde(rename = "MaxQuantity")]
    max_qty: Option<u32>,
    #[serde(rename = "MarginDenominator")]
    margin_denominator: Decimal,
    #[serde(rename = "LTM_Fee", default)]
    ltm_fee: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
struct EmbroideryCostDoc {
    #[serde(rename = "TierLabel")]
    tier_label: String,
    #[serde(rename = "EmbroideryCost")]
    cost: Decimal,
    #[serde(rename = "ItemType", default)]
    item_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ScreenPrintCostDoc {
    #[serde(rename = "CostType")]
    cost_type: String,
    #[serde(rename = "TierLabel")]
    tier_label: String,
    #[serde(rename = "ColorCount")]
    color_count: u8,
    #[serde(rename = "BasePrintCost")]
    base_cost: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
struct DtgCostDoc {
    #[serde(rename = "PrintLocationCode")]
    location_code: String,
    #[serde(rename = "TierLabel")]
    tier_label: String,
    #[serde(rename = "PrintCost")]
    cost: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
struct SizeDoc {
    size: String,
    #[serde(default)]
    price: Option<Decimal>,
    #[serde(rename = "maxCasePrice", default)]
    max_case_price: Option<Decimal>,
    #[serde(rename = "sortOrder", default)]
    sort_order: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
struct LocationDoc {
    code: String,
    name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RulesDoc {
    #[serde(rename = "RoundingMethod", default)]
    rounding_method: Option<String>,
}

/// One fetched pricing bundle, still close to the wire shape.
#[derive(Debug, Clone, Deserialize)]
pub struct PricingBundle {
    #[serde(rename = "tiersR")]
    tiers: Vec<TierDoc>,
    #[serde(rename = "rulesR", default)]
    rules: RulesDoc,
    #[serde(rename = "allEmbroideryCostsR", default)]
    embroidery_costs: Vec<EmbroideryCostDoc>,
    #[serde(rename = "allScreenprintCostsR", default)]
    screenprint_costs: Vec<ScreenPrintCostDoc>,
    #[serde(rename = "allDtgCostsR", default)]
    dtg_costs: Vec<DtgCostDoc>,
    #[serde(default)]
    sizes: Vec<SizeDoc>,
    #[serde(rename = "sellingPriceDisplayAddOns", default)]
    upcharges: FxHashMap<String, Decimal>,
    #[serde(default)]
    locations: Vec<LocationDoc>,
}

impl PricingBundle {
    /// Parse a bundle from raw JSON.
    ///
    /// # Errors
    ///
    /// Any deserialization failure is a
    /// [`PricingError::MalformedUpstreamResponse`] carrying the serde
    /// message.
    pub fn from_json(payload: &str) -> Result<Self, PricingError> {
        serde_json::from_str(payload)
            .map_err(|err| PricingError::MalformedUpstreamResponse(err.to_string()))
    }

    /// The bundle's tier schedule, validated.
    ///
    /// # Errors
    ///
    /// Tier validation errors from [`Tier::new`] and [`TierSchedule::new`].
    pub fn tier_schedule(&self) -> Result<TierSchedule, PricingError> {
        let tiers = self
            .tiers
            .iter()
            .map(|doc| {
                let max_qty = doc
                    .max_qty
                    .filter(|max| *max < OPEN_ENDED_SENTINEL);
                Tier::new(
                    doc.label.clone(),
                    doc.min_qty,
                    max_qty,
                    doc.margin_denominator,
                    doc.ltm_fee,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        TierSchedule::new(tiers)
    }

    /// Rounding method from the bundle's rules, defaulting to
    /// [`RoundingMethod::CeilHalfDollar`] when the rules carry none.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::MalformedUpstreamResponse`] for an unknown
    /// rule name.
    pub fn rounding(&self) -> Result<RoundingMethod, PricingError> {
        self.rules
            .rounding_method
            .as_deref()
            .map_or(Ok(RoundingMethod::CeilHalfDollar), RoundingMethod::from_rule_name)
    }

    /// Per-tier embroidery costs, restricted to rows matching `item_type`
    /// (`None` accepts rows without an item type).
    pub fn embroidery_costs(&self, item_type: Option<&str>) -> FxHashMap<String, Decimal> {
        self.embroidery_costs
            .iter()
            .filter(|doc| doc.item_type.as_deref() == item_type)
            .map(|doc| (doc.tier_label.clone(), doc.cost))
            .collect()
    }

    /// Screen print cost rows, scope-tagged.
    ///
    /// # Errors
    ///
    /// An unrecognized `CostType` is a
    /// [`PricingError::MalformedUpstreamResponse`].
    pub fn screenprint_costs(&self) -> Result<Vec<ScreenPrintCost>, PricingError> {
        self.screenprint_costs
            .iter()
            .map(|doc| {
                let scope = match doc.cost_type.as_str() {
                    "PrimaryLocation" => CostScope::Primary,
                    "AdditionalLocation" => CostScope::Additional,
                    other => {
                        return Err(PricingError::MalformedUpstreamResponse(format!(
                            "unknown screen print cost type: {other}"
                        )));
                    }
                };
                Ok(ScreenPrintCost {
                    scope,
                    tier_label: doc.tier_label.clone(),
                    color_count: doc.color_count,
                    base_cost: doc.base_cost,
                })
            })
            .collect()
    }

    /// DTG per-location print costs.
    pub fn dtg_costs(&self) -> Vec<LocationCost> {
        self.dtg_costs
            .iter()
            .map(|doc| LocationCost {
                location_code: doc.location_code.clone(),
                tier_label: doc.tier_label.clone(),
                cost: doc.cost,
            })
            .collect()
    }

    /// The garment size run. Cost comes from `price` when set, else
    /// `maxCasePrice`; rows with neither are unavailable sizes.
    pub fn sizes(&self) -> Vec<GarmentSize> {
        self.sizes
            .iter()
            .map(|doc| {
                let cost = doc
                    .price
                    .or(doc.max_case_price)
                    .unwrap_or(Decimal::ZERO);
                GarmentSize::new(doc.size.clone(), cost, doc.sort_order.unwrap_or(i32::MAX))
            })
            .collect()
    }

    /// Per-size upcharge amounts.
    pub fn upcharges(&self) -> UpchargeMap {
        self.upcharges.clone()
    }

    /// Offered print locations.
    pub fn locations(&self) -> Vec<Location> {
        self.locations
            .iter()
            .map(|doc| Location::new(doc.code.clone(), doc.name.clone()))
            .collect()
    }
}

/// The standard S through 4XL size run priced at a single manual cost, for
/// quoting products that are not in the garment catalog.
#[must_use]
pub fn manual_cost_sizes(manual_cost: Decimal) -> Vec<GarmentSize> {
    ["S", "M", "L", "XL", "2XL", "3XL", "4XL"]
        .into_iter()
        .zip(1..)
        .map(|(size, sort_order)| GarmentSize::new(size, manual_cost, sort_order))
        .collect()
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap_or_default()
    }

    fn bundle_json() -> &'static str {
        r#"{
            "tiersR": [
                {"TierLabel": "24-47", "MinQuantity": 24, "MaxQuantity": 47, "MarginDenominator": 0.6, "LTM_Fee": 50.00},
                {"TierLabel": "48-71", "MinQuantity": 48, "MaxQuantity": 71, "MarginDenominator": 0.6},
                {"TierLabel": "72+", "MinQuantity": 72, "MaxQuantity": 99999, "MarginDenominator": 0.6}
            ],
            "rulesR": {"RoundingMethod": "HalfDollarCeil_Final"},
            "allEmbroideryCostsR": [
                {"TierLabel": "24-47", "EmbroideryCost": 6.00},
                {"TierLabel": "48-71", "EmbroideryCost": 5.50},
                {"TierLabel": "72+", "EmbroideryCost": 5.00},
                {"TierLabel": "24-47", "EmbroideryCost": 7.00, "ItemType": "AL"}
            ],
            "allScreenprintCostsR": [
                {"CostType": "PrimaryLocation", "TierLabel": "24-47", "ColorCount": 1, "BasePrintCost": 1.90},
                {"CostType": "AdditionalLocation", "TierLabel": "24-47", "ColorCount": 1, "BasePrintCost": 3.75}
            ],
            "allDtgCostsR": [
                {"PrintLocationCode": "LC", "TierLabel": "24-47", "PrintCost": 6.00}
            ],
            "sizes": [
                {"size": "S", "price": 3.53, "sortOrder": 1},
                {"size": "M", "maxCasePrice": 3.53, "sortOrder": 2},
                {"size": "3XL", "sortOrder": 6}
            ],
            "sellingPriceDisplayAddOns": {"2XL": 2.00, "3XL": 3.00},
            "locations": [
                {"code": "LC", "name": "Left Chest"},
                {"code": "LC_FB", "name": "LC & FB"}
            ]
        }"#
    }

    #[test]
    fn parses_a_full_bundle() -> TestResult {
        let bundle = PricingBundle::from_json(bundle_json())?;

        let schedule = bundle.tier_schedule()?;
        assert_eq!(schedule.span(), (24, u32::MAX));
        // The 99999 sentinel becomes an open-ended tier.
        assert_eq!(schedule.get("72+").and_then(Tier::max_qty), None);
        assert_eq!(
            schedule.get("24-47").map(Tier::ltm_fee),
            Some(dec("50.00"))
        );

        assert_eq!(bundle.rounding()?, RoundingMethod::CeilHalfDollar);
        assert_eq!(bundle.locations().len(), 2);
        Ok(())
    }

    #[test]
    fn embroidery_costs_split_by_item_type() -> TestResult {
        let bundle = PricingBundle::from_json(bundle_json())?;

        let garment = bundle.embroidery_costs(None);
        assert_eq!(garment.len(), 3);
        assert_eq!(garment.get("24-47"), Some(&dec("6.00")));

        let al = bundle.embroidery_costs(Some("AL"));
        assert_eq!(al.get("24-47"), Some(&dec("7.00")));
        Ok(())
    }

    #[test]
    fn screenprint_rows_are_scope_tagged() -> TestResult {
        let bundle = PricingBundle::from_json(bundle_json())?;
        let rows = bundle.screenprint_costs()?;

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().any(|row| row.scope == CostScope::Primary));
        assert!(rows.iter().any(|row| row.scope == CostScope::Additional));
        Ok(())
    }

    #[test]
    fn unknown_cost_type_is_malformed() -> TestResult {
        let payload = r#"{
            "tiersR": [{"TierLabel": "1+", "MinQuantity": 1, "MarginDenominator": 0.6}],
            "allScreenprintCostsR": [
                {"CostType": "Mystery", "TierLabel": "1+", "ColorCount": 1, "BasePrintCost": 1.90}
            ]
        }"#;
        let bundle = PricingBundle::from_json(payload)?;
        assert!(matches!(
            bundle.screenprint_costs(),
            Err(PricingError::MalformedUpstreamResponse(_))
        ));
        Ok(())
    }

    #[test]
    fn sizes_fall_back_to_case_price_and_mark_missing_costs() -> TestResult {
        let bundle = PricingBundle::from_json(bundle_json())?;
        let sizes = bundle.sizes();

        let medium = sizes.iter().find(|record| record.size == "M");
        assert_eq!(medium.map(|record| record.wholesale_cost), Some(dec("3.53")));

        let tripled = sizes.iter().find(|record| record.size == "3XL");
        assert_eq!(tripled.map(GarmentSize::is_available), Some(false));
        Ok(())
    }

    #[test]
    fn garbage_payload_is_malformed_not_a_panic() {
        assert!(matches!(
            PricingBundle::from_json("{not json"),
            Err(PricingError::MalformedUpstreamResponse(_))
        ));
    }

    #[test]
    fn manual_cost_run_covers_s_through_4xl() {
        let sizes = manual_cost_sizes(dec("10.00"));
        assert_eq!(sizes.len(), 7);
        assert_eq!(sizes.first().map(|record| record.size.as_str()), Some("S"));
        assert_eq!(sizes.last().map(|record| record.size.as_str()), Some("4XL"));
        assert!(sizes.iter().all(GarmentSize::is_available));
    }
}
