use crate::config::{QuantileBand, TrimConfig};

use super::model::{CompsTable, Metric};
use super::stats::{quantile_bounds, Bounds};

// ---------------------------------------------------------------------------
// Reference bands computed over the full loaded set
// ---------------------------------------------------------------------------

/// Quantile bounds taken from the untrimmed table.
///
/// `dm` is applied by [`trim_outliers`]; `ytm` and `ask` only seed the default
/// slider positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceBands {
    pub dm: Bounds,
    pub ytm: Bounds,
    pub ask: Bounds,
}

impl ReferenceBands {
    /// `None` on an empty table.
    pub fn compute(table: &CompsTable, config: &TrimConfig) -> Option<Self> {
        let band = |metric: Metric, q: QuantileBand| {
            quantile_bounds(&table.column(metric), q.lower, q.upper)
        };
        Some(Self {
            dm: band(Metric::Dm, config.dm)?,
            ytm: band(Metric::Ytm, config.ytm_default)?,
            ask: band(Metric::Ask, config.ask_default)?,
        })
    }
}

/// Keep only rows whose DM lies strictly inside `dm`.
pub fn trim_outliers(table: &CompsTable, dm: Bounds) -> CompsTable {
    let trimmed = table.retain(|i| dm.contains_strictly(i.dm));
    log::info!(
        "Trimmed DM outliers outside ({:.2}, {:.2}): kept {} of {} rows",
        dm.lo,
        dm.hi,
        trimmed.len(),
        table.len()
    );
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::{inst, table};

    fn ladder(n: usize) -> CompsTable {
        table(
            (0..n)
                .map(|i| {
                    let x = i as f64;
                    inst(&format!("I{i}"), "B2", 5.0 + x * 0.1, 85.0 + x * 0.15, 150.0 + x * 5.0)
                })
                .collect(),
        )
    }

    #[test]
    fn bands_use_configured_quantiles() {
        let t = ladder(101);
        let bands = ReferenceBands::compute(&t, &TrimConfig::default()).unwrap();
        // Evenly spaced data: quantile q sits at index q * 100.
        assert!((bands.dm.lo - 200.0).abs() < 1e-9);
        assert!((bands.dm.hi - 625.0).abs() < 1e-9);
        assert!((bands.ytm.lo - 6.0).abs() < 1e-9);
        assert!((bands.ask.lo - (85.0 + 13.5 * 0.15)).abs() < 1e-9);
        assert!((bands.ask.hi - (85.0 + 99.0 * 0.15)).abs() < 1e-9);
    }

    #[test]
    fn empty_table_has_no_bands() {
        assert!(ReferenceBands::compute(&CompsTable::default(), &TrimConfig::default()).is_none());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::data::model::tests::{inst, table};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn trimming_keeps_only_rows_strictly_inside_band(
            dms in proptest::collection::vec(0.0..2000.0_f64, 1..60),
        ) {
            let t = table(dms.iter().map(|&dm| inst("X", "B1", 7.0, 95.0, dm)).collect());
            let bands = ReferenceBands::compute(&t, &TrimConfig::default()).unwrap();
            let trimmed = trim_outliers(&t, bands.dm);

            for i in &trimmed.instruments {
                prop_assert!(i.dm > bands.dm.lo && i.dm < bands.dm.hi, "{} outside {:?}", i.dm, bands.dm);
                prop_assert_eq!(&t.instruments[i.row_id], i);
            }
            let inside = dms.iter().filter(|&&d| bands.dm.contains_strictly(d)).count();
            prop_assert_eq!(trimmed.len(), inside);
            prop_assert!(trimmed.instruments.windows(2).all(|w| w[0].row_id < w[1].row_id));
        }
    }
}
