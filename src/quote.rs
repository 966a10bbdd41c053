//! Order quoting.
//!
//! A quote flattens one priced order into display lines: quantity-scaled
//! garment and decoration lines, plus one-time fees (digitizing, screen
//! setup). The less-than-minimum fee is never its own line; it is spread
//! across the order and folded into each unit price, so the per-piece figure
//! a customer sees is the figure they pay.

use std::io;

use rust_decimal::Decimal;
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::{Columns, Rows}},
};

use crate::{
    catalog::{GarmentSize, UpchargeMap},
    error::PricingError,
    garment::display_price,
    methods::{
        embroidery::{EmbroideryCatalog, Logo},
        screenprint::{PrintLocation, ScreenPrintCatalog},
    },
};

/// One line of a quote.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteLine {
    description: String,
    quantity: u32,
    unit_price: Decimal,
}

impl QuoteLine {
    fn new(description: impl Into<String>, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
        }
    }

    /// What the line charges for.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Units the line covers.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Per-unit price.
    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// `quantity` times `unit_price`.
    pub fn amount(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

/// A priced order, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    tier_label: String,
    below_minimum: bool,
    total_quantity: u32,
    unit_lines: SmallVec<[QuoteLine; 8]>,
    fee_lines: SmallVec<[QuoteLine; 4]>,
}

impl Quote {
    /// The tier label the order priced at.
    pub fn tier_label(&self) -> &str {
        &self.tier_label
    }

    /// Whether the order fell below the schedule minimum and carries the
    /// distributed LTM fee inside its unit prices.
    pub fn below_minimum(&self) -> bool {
        self.below_minimum
    }

    /// Total pieces across the order.
    pub fn total_quantity(&self) -> u32 {
        self.total_quantity
    }

    /// Quantity-scaled lines.
    pub fn unit_lines(&self) -> &[QuoteLine] {
        &self.unit_lines
    }

    /// One-time fee lines.
    pub fn fee_lines(&self) -> &[QuoteLine] {
        &self.fee_lines
    }

    /// Sum of the quantity-scaled lines.
    pub fn subtotal(&self) -> Decimal {
        self.unit_lines.iter().map(QuoteLine::amount).sum()
    }

    /// Sum of the one-time fees.
    pub fn fees_total(&self) -> Decimal {
        self.fee_lines.iter().map(QuoteLine::amount).sum()
    }

    /// Grand total.
    pub fn total(&self) -> Decimal {
        self.subtotal() + self.fees_total()
    }

    /// Render the quote as a table followed by a totals block.
    ///
    /// # Errors
    ///
    /// Propagates write errors from `out`.
    pub fn write_to(&self, mut out: impl io::Write) -> io::Result<()> {
        let mut builder = Builder::default();
        builder.push_record(["Line", "Qty", "Unit", "Amount"]);

        for line in self.unit_lines.iter().chain(self.fee_lines.iter()) {
            builder.push_record([
                line.description().to_string(),
                line.quantity().to_string(),
                display_price(line.unit_price()).to_string(),
                display_price(line.amount()).to_string(),
            ]);
        }

        let mut table = builder.build();
        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Alignment::center());
        table.modify(Columns::new(1..4), Alignment::right());

        writeln!(out, "{table}")?;
        writeln!(
            out,
            " Tier: {}{}",
            self.tier_label,
            if self.below_minimum {
                " (below minimum, LTM fee distributed)"
            } else {
                ""
            }
        )?;
        writeln!(out, " Subtotal: {}", display_price(self.subtotal()))?;
        writeln!(out, " Fees:     {}", display_price(self.fees_total()))?;
        writeln!(out, " Total:    {}", display_price(self.total()))
    }
}

fn total_quantity(size_breakdown: &[(String, u32)]) -> Result<u32, PricingError> {
    let total: u32 = size_breakdown.iter().map(|(_, qty)| qty).sum();
    if total == 0 {
        return Err(PricingError::InvalidDecorationParameter(
            "order has no pieces".into(),
        ));
    }
    Ok(total)
}

/// An embroidery order: pieces per size plus the order's logos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbroideryOrder {
    size_breakdown: Vec<(String, u32)>,
    primary: Logo,
    additional: Vec<Logo>,
}

impl EmbroideryOrder {
    /// Split the order's logos into the primary and the rest.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidDecorationParameter`] unless exactly
    /// one logo is primary, or when the size breakdown is empty.
    pub fn new(
        size_breakdown: Vec<(String, u32)>,
        logos: Vec<Logo>,
    ) -> Result<Self, PricingError> {
        total_quantity(&size_breakdown)?;

        let (mut primaries, additional): (Vec<_>, Vec<_>) =
            logos.into_iter().partition(Logo::is_primary);
        let Some(primary) = primaries.pop() else {
            return Err(PricingError::InvalidDecorationParameter(
                "order needs a primary logo".into(),
            ));
        };
        if !primaries.is_empty() {
            return Err(PricingError::InvalidDecorationParameter(
                "order has more than one primary logo".into(),
            ));
        }

        Ok(Self {
            size_breakdown,
            primary,
            additional,
        })
    }

    /// The order's primary logo.
    pub fn primary(&self) -> &Logo {
        &self.primary
    }

    /// Non-primary logos.
    pub fn additional(&self) -> &[Logo] {
        &self.additional
    }
}

/// Price an embroidery order into a quote.
///
/// # Errors
///
/// Propagates pricing errors from the catalog: tier resolution, missing
/// costs, unknown sizes.
pub fn embroidery_quote(
    catalog: &EmbroideryCatalog,
    sizes: &[GarmentSize],
    upcharges: &UpchargeMap,
    order: &EmbroideryOrder,
) -> Result<Quote, PricingError> {
    let quantity = total_quantity(&order.size_breakdown)?;
    let resolved = catalog.resolve(quantity)?;
    let tier_label = resolved.tier().label().to_string();
    let below_minimum = resolved.below_minimum();
    let ltm_per_unit = resolved.ltm_fee_per_unit(quantity)?;

    let mut unit_lines = SmallVec::new();
    for (size, pieces) in &order.size_breakdown {
        let unit =
            catalog.decorated_unit_price(sizes, upcharges, size, quantity, order.primary())?;
        unit_lines.push(QuoteLine::new(
            format!("{size} / {}", order.primary().position()),
            *pieces,
            unit + ltm_per_unit,
        ));
    }

    for logo in order.additional() {
        let unit = catalog.additional_logo_price(quantity, logo)?;
        unit_lines.push(QuoteLine::new(
            format!("Additional logo: {}", logo.position()),
            quantity,
            unit,
        ));
    }

    let mut fee_lines = SmallVec::new();
    let digitizing = std::iter::once(order.primary())
        .chain(order.additional())
        .filter(|logo| logo.needs_digitizing())
        .count();
    if digitizing > 0 {
        fee_lines.push(QuoteLine::new(
            "Digitizing",
            u32::try_from(digitizing).unwrap_or(u32::MAX),
            catalog.digitizing_fee(),
        ));
    }

    Ok(Quote {
        tier_label,
        below_minimum,
        total_quantity: quantity,
        unit_lines,
        fee_lines,
    })
}

/// A screen print order: pieces per size, locations in print order (the
/// first is the primary), and the garment shade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenPrintOrder {
    size_breakdown: Vec<(String, u32)>,
    primary: PrintLocation,
    additional: Vec<PrintLocation>,
    dark_garment: bool,
}

impl ScreenPrintOrder {
    /// Create an order. The first location is the primary.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidDecorationParameter`] when the size
    /// breakdown is empty or no location is given.
    pub fn new(
        size_breakdown: Vec<(String, u32)>,
        locations: Vec<PrintLocation>,
        dark_garment: bool,
    ) -> Result<Self, PricingError> {
        total_quantity(&size_breakdown)?;
        let mut locations = locations.into_iter();
        let Some(primary) = locations.next() else {
            return Err(PricingError::InvalidDecorationParameter(
                "order needs at least one print location".into(),
            ));
        };
        Ok(Self {
            size_breakdown,
            primary,
            additional: locations.collect(),
            dark_garment,
        })
    }

    /// The primary print location.
    pub fn primary_location(&self) -> &PrintLocation {
        &self.primary
    }

    /// Locations after the primary.
    pub fn additional_locations(&self) -> &[PrintLocation] {
        &self.additional
    }

    /// All locations in print order.
    pub fn locations(&self) -> impl Iterator<Item = &PrintLocation> {
        std::iter::once(&self.primary).chain(self.additional.iter())
    }

    /// Whether the garment needs a white underbase.
    pub fn dark_garment(&self) -> bool {
        self.dark_garment
    }
}

/// Price a screen print order into a quote.
///
/// # Errors
///
/// Propagates pricing errors from the catalog: tier resolution, missing
/// cost rows, over-maximum color counts.
pub fn screenprint_quote(
    catalog: &ScreenPrintCatalog,
    sizes: &[GarmentSize],
    upcharges: &UpchargeMap,
    order: &ScreenPrintOrder,
) -> Result<Quote, PricingError> {
    let quantity = total_quantity(&order.size_breakdown)?;
    let resolved = catalog.resolve(quantity)?;
    let tier_label = resolved.tier().label().to_string();
    let below_minimum = resolved.below_minimum();
    let ltm_per_unit = resolved.ltm_fee_per_unit(quantity)?;

    let primary = order.primary_location();
    let locations: Vec<PrintLocation> = order.locations().cloned().collect();
    let stripes_per_unit = catalog.safety_stripe_surcharge(&locations);

    let mut unit_lines = SmallVec::new();
    for (size, pieces) in &order.size_breakdown {
        let unit = catalog.primary_unit_price(
            sizes,
            upcharges,
            size,
            quantity,
            primary.color_count,
            order.dark_garment(),
        )?;
        unit_lines.push(QuoteLine::new(
            format!("{size} / {} ({} color)", primary.code, primary.color_count),
            *pieces,
            unit + stripes_per_unit + ltm_per_unit,
        ));
    }

    for location in order.additional_locations() {
        let unit = catalog.additional_location_price(
            quantity,
            location.color_count,
            order.dark_garment(),
        )?;
        unit_lines.push(QuoteLine::new(
            format!("Additional location: {}", location.code),
            quantity,
            unit,
        ));
    }

    let mut fee_lines = SmallVec::new();
    for setup in catalog.setup_fees(&locations, order.dark_garment()) {
        fee_lines.push(QuoteLine::new(
            format!("Setup: {} ({} screens)", setup.code, setup.screen_count),
            1,
            setup.fee,
        ));
    }

    Ok(Quote {
        tier_label,
        below_minimum,
        total_quantity: quantity,
        unit_lines,
        fee_lines,
    })
}
