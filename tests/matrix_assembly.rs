//! Price matrix assembly and lookup over the `heavyweight-tee` fixture set.
//!
//! DTG walkthrough (left chest, tier 24-47):
//!
//! 1. Base garment is the cheapest usable size: $3.53 / 0.6 = $5.8833
//! 2. LC print cost $6.00 -> $11.8833 -> CeilHalfDollar $12.00
//! 3. 2XL adds its $2.00 upcharge after rounding -> $14.00
//! 4. The combined LC_FB location sums its constituents:
//!    $5.8833 + $6.00 + $9.00 = $20.8833 -> $21.00

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use testresult::TestResult;

use tierloom::prelude::*;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap_or_default()
}

#[test]
fn matrix_covers_every_location_size_and_tier() -> TestResult {
    let fixture = Fixture::load("heavyweight-tee")?;
    let matrix = fixture.price_matrix()?;

    assert_eq!(matrix.price("LC", "S", "24-47"), Some(dec("12.00")));
    assert_eq!(matrix.price("LC", "2XL", "24-47"), Some(dec("14.00")));
    assert_eq!(matrix.price("LC_FB", "S", "24-47"), Some(dec("21.00")));
    assert_eq!(matrix.price("LC", "S", "72+"), Some(dec("11.00")));

    for location in ["LC", "FB", "LC_FB"] {
        for size in ["S", "M", "L", "XL", "2XL", "3XL"] {
            for tier in ["24-47", "48-71", "72+"] {
                assert!(
                    matrix.price(location, size, tier).is_some(),
                    "no price for {location}/{size}/{tier}"
                );
            }
        }
    }
    Ok(())
}

#[test]
fn lookup_price_resolves_quantities() -> TestResult {
    let fixture = Fixture::load("heavyweight-tee")?;
    let matrix = fixture.price_matrix()?;

    assert_eq!(matrix.lookup_price("LC", "S", 30)?, dec("12.00"));
    assert_eq!(matrix.lookup_price("LC", "S", 60)?, dec("11.50"));
    assert_eq!(matrix.lookup_price("LC", "S", 500)?, dec("11.00"));

    // Below the minimum, the lowest tier's rates apply.
    let resolved = matrix.resolve(10)?;
    assert!(resolved.below_minimum());
    assert_eq!(matrix.lookup_price("LC", "S", 10)?, dec("12.00"));

    assert!(matches!(
        matrix.lookup_price("LC", "S", 0),
        Err(PricingError::TierNotFound { quantity: 0, .. })
    ));
    Ok(())
}

#[test]
fn range_keyed_grids_match_sizes_by_canonical_order() -> TestResult {
    let fixture = Fixture::load("heavyweight-tee")?;
    let schedule = fixture.tier_schedule()?;

    let mut row = FxHashMap::default();
    row.insert("24-47".to_string(), dec("24.00"));
    let mut grid: FxHashMap<String, FxHashMap<String, Decimal>> = FxHashMap::default();
    grid.insert("S-XL".to_string(), row);
    let mut oversize_row = FxHashMap::default();
    oversize_row.insert("24-47".to_string(), dec("27.00"));
    grid.insert("2XL-4XL".to_string(), oversize_row);
    let mut cells = FxHashMap::default();
    cells.insert("FF".to_string(), grid);

    let matrix = PriceMatrix::from_cells(cells, schedule);

    assert_eq!(matrix.lookup_price("FF", "S", 30)?, dec("24.00"));
    assert_eq!(matrix.lookup_price("FF", "L", 30)?, dec("24.00"));
    assert_eq!(matrix.lookup_price("FF", "3XL", 30)?, dec("27.00"));
    assert!(matches!(
        matrix.lookup_price("FF", "5XL", 30),
        Err(PricingError::MissingCatalogData(_))
    ));
    Ok(())
}

#[test]
fn degraded_pricing_is_a_deliberate_opt_in() {
    // Nothing reaches this table implicitly; a caller asks for it when the
    // catalog is down and labels the result an estimate.
    let table = DegradedPricing::standard();

    assert_eq!(
        table.unit_price(DecorationMethod::Dtg, "M", 24),
        dec("22.00")
    );
    assert_eq!(
        table.unit_price(DecorationMethod::Dtg, "2XL", 72),
        dec("24.00")
    );
    assert_eq!(
        table.unit_price(DecorationMethod::ScreenPrint, "M", 48),
        dec("19.50")
    );
}
