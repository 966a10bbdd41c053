//! Per-method surcharge composition.
//!
//! Each decoration method layers its own surcharges on top of the shared
//! tier/margin/rounding core: extra-stitch and additional-logo charges for
//! embroidery, color-count setup fees and dark-garment underbase for screen
//! print, and cap-specific production parameters for cap embroidery. DTG is
//! the location-grid method and lives with the matrix assembler.

pub mod cap;
pub mod embroidery;
pub mod screenprint;
