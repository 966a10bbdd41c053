//! Pricing errors.

use thiserror::Error;

/// Errors surfaced by the pricing engine.
///
/// The engine never catches-and-suppresses these; they are returned for the
/// caller to render a fallback message and log. Missing catalog data is never
/// replaced with a zero or placeholder price.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// A required tier/cost/size/upcharge entry is absent for the requested
    /// combination.
    #[error("missing catalog data: {0}")]
    MissingCatalogData(String),

    /// The quantity falls outside every defined tier and the below-minimum
    /// rule does not apply (zero quantity, or beyond the catalog's span).
    #[error("no pricing tier covers quantity {quantity} (schedule spans {span_min}..={span_max})")]
    TierNotFound {
        /// The requested order quantity.
        quantity: u32,
        /// Lowest quantity any tier covers.
        span_min: u32,
        /// Highest quantity any tier covers.
        span_max: u32,
    },

    /// A decoration parameter is out of range or unrecognised, for example a
    /// zero stitch count, a color count above the catalog maximum, or an
    /// unknown embellishment-method string.
    #[error("invalid decoration parameter: {0}")]
    InvalidDecorationParameter(String),

    /// A fetched catalog payload failed shape validation.
    #[error("malformed upstream response: {0}")]
    MalformedUpstreamResponse(String),
}
