//! Tierloom prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    catalog::{
        DecorationMethod, GarmentSize, Location, Tier, TierSchedule, UpchargeMap,
        lowest_wholesale_cost, sorted_sizes, standard_garment, upcharge_for,
    },
    degraded::DegradedPricing,
    error::PricingError,
    fixtures::{Fixture, FixtureError},
    garment::{add_print_cost, base_sell_price, display_price},
    ingest::{PricingBundle, manual_cost_sizes},
    matrix::{LocationCost, PriceMatrix, SIZE_ORDER, build_matrix},
    methods::{
        cap::{CapDecoration, CapEmbroideryCatalog},
        embroidery::{AdditionalLogoPricing, EmbroideryCatalog, Logo, StitchParams},
        screenprint::{
            CostScope, LocationSetup, PrintLocation, ScreenPrintCatalog, ScreenPrintCost,
            ScreenPrintParams,
        },
    },
    quote::{
        EmbroideryOrder, Quote, QuoteLine, ScreenPrintOrder, embroidery_quote, screenprint_quote,
    },
    rounding::RoundingMethod,
    tiers::{ResolvedTier, resolve_tier},
};
