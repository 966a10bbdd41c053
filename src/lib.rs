//! Tierloom
//!
//! Tierloom is a tiered pricing engine for decorated apparel: quantity-tier
//! resolution, margin-based garment pricing, per-method surcharge
//! composition, and price matrix assembly for embroidery, cap embroidery,
//! screen printing, and direct-to-garment printing.

pub mod catalog;
pub mod degraded;
pub mod error;
pub mod fixtures;
pub mod garment;
pub mod ingest;
pub mod matrix;
pub mod methods;
pub mod prelude;
pub mod quote;
pub mod rounding;
pub mod tiers;
