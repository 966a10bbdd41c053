//! Fixtures
//!
//! YAML catalog sets for tests and demos, loaded from `./fixtures` by
//! default. One file describes one product's pricing world: tiers, rounding,
//! the size run, upcharges, and per-method cost sections. Amounts are quoted
//! strings so they parse to exact decimals.

use std::{fs, path::PathBuf};

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    catalog::{GarmentSize, Location, Tier, TierSchedule, UpchargeMap},
    error::PricingError,
    matrix::{LocationCost, PriceMatrix, build_matrix},
    methods::{
        cap::CapEmbroideryCatalog,
        embroidery::{AdditionalLogoPricing, EmbroideryCatalog, StitchParams},
        screenprint::{CostScope, ScreenPrintCatalog, ScreenPrintCost, ScreenPrintParams},
    },
    rounding::RoundingMethod,
};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// The fixture file lacks a section a builder needs
    #[error("Fixture has no {0} section")]
    MissingSection(&'static str),

    /// Catalog validation error
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

#[derive(Debug, Clone, Deserialize)]
struct TierDoc {
    label: String,
    min_qty: u32,
    #[serde(default)]
    max_qty: Option<u32>,
    margin_denominator: Decimal,
    #[serde(default)]
    ltm_fee: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
struct AdditionalLogoDoc {
    tier: String,
    position: String,
    price: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
struct EmbroiderySection {
    costs: FxHashMap<String, Decimal>,
    digitizing_fee: Decimal,
    #[serde(default)]
    additional_logos: Vec<AdditionalLogoDoc>,
    #[serde(default)]
    positions: Vec<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ScopeDoc {
    Primary,
    Additional,
}

#[derive(Debug, Clone, Deserialize)]
struct ScreenPrintCostDoc {
    scope: ScopeDoc,
    tier: String,
    colors: u8,
    cost: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
struct ScreenPrintSection {
    #[serde(default)]
    params: Option<ScreenPrintParamsDoc>,
    costs: Vec<ScreenPrintCostDoc>,
}

#[derive(Debug, Clone, Deserialize)]
struct ScreenPrintParamsDoc {
    flash_charge: Decimal,
    setup_fee_per_screen: Decimal,
    safety_stripe_fee: Decimal,
    max_color_count: u8,
}

#[derive(Debug, Clone, Deserialize)]
struct DtgCostDoc {
    location: String,
    tier: String,
    cost: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
struct DtgSection {
    locations: Vec<Location>,
    costs: Vec<DtgCostDoc>,
}

#[derive(Debug, Clone, Deserialize)]
struct FixtureDoc {
    tiers: Vec<TierDoc>,
    #[serde(default)]
    rounding: RoundingMethod,
    sizes: Vec<GarmentSize>,
    #[serde(default)]
    upcharges: FxHashMap<String, Decimal>,
    #[serde(default)]
    embroidery: Option<EmbroiderySection>,
    #[serde(default)]
    screenprint: Option<ScreenPrintSection>,
    #[serde(default)]
    dtg: Option<DtgSection>,
}

/// One loaded fixture set.
#[derive(Debug, Clone)]
pub struct Fixture {
    doc: FixtureDoc,
}

impl Fixture {
    /// Load a named fixture from the default `./fixtures` base path.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if the file cannot be read or parsed.
    pub fn load(name: &str) -> Result<Self, FixtureError> {
        Self::load_from("./fixtures", name)
    }

    /// Load a named fixture from a custom base path.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if the file cannot be read or parsed.
    pub fn load_from(base_path: impl Into<PathBuf>, name: &str) -> Result<Self, FixtureError> {
        let file_path = base_path.into().join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let doc: FixtureDoc = serde_norway::from_str(&contents)?;
        Ok(Self { doc })
    }

    /// The fixture's tier schedule, validated.
    ///
    /// # Errors
    ///
    /// Tier validation errors from [`Tier::new`] and [`TierSchedule::new`].
    pub fn tier_schedule(&self) -> Result<TierSchedule, FixtureError> {
        let tiers = self
            .doc
            .tiers
            .iter()
            .map(|doc| {
                Tier::new(
                    doc.label.clone(),
                    doc.min_qty,
                    doc.max_qty,
                    doc.margin_denominator,
                    doc.ltm_fee,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TierSchedule::new(tiers)?)
    }

    /// The fixture's rounding method.
    #[must_use]
    pub fn rounding(&self) -> RoundingMethod {
        self.doc.rounding
    }

    /// The garment size run.
    #[must_use]
    pub fn sizes(&self) -> &[GarmentSize] {
        &self.doc.sizes
    }

    /// Per-size upcharges.
    #[must_use]
    pub fn upcharges(&self) -> UpchargeMap {
        self.doc.upcharges.clone()
    }

    fn embroidery_section(&self) -> Result<&EmbroiderySection, FixtureError> {
        self.doc
            .embroidery
            .as_ref()
            .ok_or(FixtureError::MissingSection("embroidery"))
    }

    fn additional_logo_pricing(section: &EmbroiderySection) -> AdditionalLogoPricing {
        AdditionalLogoPricing::from_entries(
            section
                .additional_logos
                .iter()
                .map(|doc| (doc.tier.clone(), doc.position.clone(), doc.price)),
        )
    }

    /// Build the embroidery catalog from the fixture's embroidery section.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::MissingSection`] without an `embroidery`
    /// section, plus schedule validation errors.
    pub fn embroidery_catalog(&self) -> Result<EmbroideryCatalog, FixtureError> {
        let section = self.embroidery_section()?;
        Ok(EmbroideryCatalog::new(
            self.tier_schedule()?,
            section.costs.clone(),
            StitchParams::shirt(),
            section.digitizing_fee,
            self.rounding(),
            Self::additional_logo_pricing(section),
        ))
    }

    /// Build the cap embroidery catalog from the fixture's embroidery
    /// section, with the section's `positions` as the optional placements.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::MissingSection`] without an `embroidery`
    /// section, plus schedule validation errors.
    pub fn cap_embroidery_catalog(&self) -> Result<CapEmbroideryCatalog, FixtureError> {
        let section = self.embroidery_section()?;
        Ok(CapEmbroideryCatalog::new(
            self.tier_schedule()?,
            section.costs.clone(),
            section.digitizing_fee,
            self.rounding(),
            Self::additional_logo_pricing(section),
            section.positions.iter().cloned(),
        ))
    }

    /// Build the screen print catalog from the fixture's screenprint
    /// section.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::MissingSection`] without a `screenprint`
    /// section, plus schedule validation errors.
    pub fn screenprint_catalog(&self) -> Result<ScreenPrintCatalog, FixtureError> {
        let section = self
            .doc
            .screenprint
            .as_ref()
            .ok_or(FixtureError::MissingSection("screenprint"))?;

        let params = section.params.as_ref().map_or_else(
            || ScreenPrintParams {
                rounding: self.rounding(),
                ..ScreenPrintParams::default()
            },
            |doc| ScreenPrintParams {
                flash_charge: doc.flash_charge,
                setup_fee_per_screen: doc.setup_fee_per_screen,
                safety_stripe_fee: doc.safety_stripe_fee,
                max_color_count: doc.max_color_count,
                rounding: self.rounding(),
            },
        );

        let costs = section.costs.iter().map(|doc| ScreenPrintCost {
            scope: match doc.scope {
                ScopeDoc::Primary => CostScope::Primary,
                ScopeDoc::Additional => CostScope::Additional,
            },
            tier_label: doc.tier.clone(),
            color_count: doc.colors,
            base_cost: doc.cost,
        });

        Ok(ScreenPrintCatalog::new(
            self.tier_schedule()?,
            costs,
            params,
        ))
    }

    /// Assemble the DTG price matrix from the fixture's dtg section.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::MissingSection`] without a `dtg` section, plus
    /// matrix assembly errors.
    pub fn price_matrix(&self) -> Result<PriceMatrix, FixtureError> {
        let section = self
            .doc
            .dtg
            .as_ref()
            .ok_or(FixtureError::MissingSection("dtg"))?;

        let costs: Vec<LocationCost> = section
            .costs
            .iter()
            .map(|doc| LocationCost {
                location_code: doc.location.clone(),
                tier_label: doc.tier.clone(),
                cost: doc.cost,
            })
            .collect();

        Ok(build_matrix(
            &costs,
            self.tier_schedule()?,
            self.sizes(),
            &self.upcharges(),
            &section.locations,
            self.rounding(),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use testresult::TestResult;

    use super::*;

    const MINIMAL: &str = r#"
tiers:
  - label: "24-47"
    min_qty: 24
    max_qty: 47
    margin_denominator: "0.6"
    ltm_fee: "50"
  - label: "48+"
    min_qty: 48
    margin_denominator: "0.6"
rounding: ceil-dollar
sizes:
  - size: S
    wholesale_cost: "3.53"
    sort_order: 1
  - size: "2XL"
    wholesale_cost: "5.10"
    sort_order: 5
upcharges:
  "2XL": "2.00"
embroidery:
  costs:
    "24-47": "6.00"
    "48+": "5.50"
  digitizing_fee: "100"
  additional_logos:
    - tier: "24-47"
      position: Left Chest
      price: "6.50"
"#;

    fn write_fixture(dir: &tempfile::TempDir, name: &str, body: &str) -> TestResult {
        let mut file = std::fs::File::create(dir.path().join(format!("{name}.yml")))?;
        file.write_all(body.as_bytes())?;
        Ok(())
    }

    #[test]
    fn loads_and_builds_an_embroidery_catalog() -> TestResult {
        let dir = tempfile::tempdir()?;
        write_fixture(&dir, "basic", MINIMAL)?;

        let fixture = Fixture::load_from(dir.path(), "basic")?;
        assert_eq!(fixture.rounding(), RoundingMethod::CeilDollar);
        assert_eq!(fixture.sizes().len(), 2);

        let catalog = fixture.embroidery_catalog()?;
        assert_eq!(catalog.tiers().span(), (24, u32::MAX));
        assert_eq!(catalog.tier_cost("24-47")?, "6.00".parse()?);
        Ok(())
    }

    #[test]
    fn missing_section_is_reported_by_name() -> TestResult {
        let dir = tempfile::tempdir()?;
        write_fixture(&dir, "basic", MINIMAL)?;

        let fixture = Fixture::load_from(dir.path(), "basic")?;
        assert!(matches!(
            fixture.screenprint_catalog(),
            Err(FixtureError::MissingSection("screenprint"))
        ));
        Ok(())
    }

    #[test]
    fn missing_file_is_an_io_error() -> TestResult {
        let dir = tempfile::tempdir()?;
        assert!(matches!(
            Fixture::load_from(dir.path(), "absent"),
            Err(FixtureError::Io(_))
        ));
        Ok(())
    }

    #[test]
    fn invalid_yaml_is_a_yaml_error() -> TestResult {
        let dir = tempfile::tempdir()?;
        write_fixture(&dir, "broken", "tiers: [not a tier")?;

        assert!(matches!(
            Fixture::load_from(dir.path(), "broken"),
            Err(FixtureError::Yaml(_))
        ));
        Ok(())
    }
}
