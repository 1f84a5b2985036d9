use std::collections::BTreeSet;

use super::model::{Category, CompsTable, Instrument, Metric};
use super::stats::{min_max, Bounds};
use super::trim::ReferenceBands;

// ---------------------------------------------------------------------------
// Filter predicate: selected values per category, inclusive range per metric
// ---------------------------------------------------------------------------

/// The six sidebar predicates. A row passes when every category value is
/// selected and every metric lies inside its range. An empty selection
/// matches nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub industries: BTreeSet<String>,
    pub segments: BTreeSet<String>,
    pub ratings: BTreeSet<String>,
    pub ytm: Bounds,
    pub ask: Bounds,
    pub dm: Bounds,
}

impl FilterState {
    pub fn selection(&self, category: Category) -> &BTreeSet<String> {
        match category {
            Category::Industry => &self.industries,
            Category::Segment => &self.segments,
            Category::Moodys => &self.ratings,
        }
    }

    pub fn selection_mut(&mut self, category: Category) -> &mut BTreeSet<String> {
        match category {
            Category::Industry => &mut self.industries,
            Category::Segment => &mut self.segments,
            Category::Moodys => &mut self.ratings,
        }
    }

    pub fn range(&self, metric: Metric) -> Bounds {
        match metric {
            Metric::Ytm => self.ytm,
            Metric::Ask => self.ask,
            Metric::Dm => self.dm,
        }
    }

    /// Sets a range, normalising reversed endpoints.
    pub fn set_range(&mut self, metric: Metric, lo: f64, hi: f64) {
        let bounds = Bounds::new(lo, hi);
        match metric {
            Metric::Ytm => self.ytm = bounds,
            Metric::Ask => self.ask = bounds,
            Metric::Dm => self.dm = bounds,
        }
    }

    pub fn matches(&self, inst: &Instrument) -> bool {
        Category::ALL
            .iter()
            .all(|&c| self.selection(c).contains(c.of(inst)))
            && Metric::ALL.iter().all(|&m| self.range(m).contains(m.of(inst)))
    }
}

// ---------------------------------------------------------------------------
// Slider limits
// ---------------------------------------------------------------------------

/// Min/max of each metric over the table the sliders operate on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeLimits {
    pub ytm: Bounds,
    pub ask: Bounds,
    pub dm: Bounds,
}

impl RangeLimits {
    /// `None` on an empty table.
    pub fn of(table: &CompsTable) -> Option<Self> {
        Some(Self {
            ytm: min_max(&table.column(Metric::Ytm))?,
            ask: min_max(&table.column(Metric::Ask))?,
            dm: min_max(&table.column(Metric::Dm))?,
        })
    }

    pub fn get(&self, metric: Metric) -> Bounds {
        match metric {
            Metric::Ytm => self.ytm,
            Metric::Ask => self.ask,
            Metric::Dm => self.dm,
        }
    }
}

/// Everything selected; ranges at the reference bands, squeezed into the
/// slider limits. Clamping never changes which rows of `table` pass, since
/// every row already lies inside the limits.
pub fn init_filter_state(
    table: &CompsTable,
    bands: &ReferenceBands,
    limits: &RangeLimits,
) -> FilterState {
    FilterState {
        industries: table.industries.clone(),
        segments: table.segments.clone(),
        ratings: table.ratings.clone(),
        ytm: bands.ytm.clamp_to(limits.ytm),
        ask: bands.ask.clamp_to(limits.ask),
        dm: bands.dm.clamp_to(limits.dm),
    }
}

/// Indices into `table.instruments` of the rows passing `filters`, in table
/// order.
pub fn filtered_indices(table: &CompsTable, filters: &FilterState) -> Vec<usize> {
    table
        .instruments
        .iter()
        .enumerate()
        .filter(|(_, inst)| filters.matches(inst))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::{inst, table};

    fn sample() -> CompsTable {
        let mut rows = vec![
            inst("A", "Baa2", 5.0, 95.0, 200.0),
            inst("B", "Ba1", 6.0, 90.0, 250.0),
            inst("C", "B2", 8.5, 92.0, 410.0),
            inst("D", "Caa1", 12.0, 81.0, 720.0),
            inst("E", "B2", 7.25, 98.5, 330.0),
        ];
        rows[2].industry = "Software".into();
        rows[3].segment = "Hospitals".into();
        rows[4].segment = "Hospitals".into();
        table(rows)
    }

    fn everything(t: &CompsTable) -> FilterState {
        let limits = RangeLimits::of(t).unwrap();
        FilterState {
            industries: t.industries.clone(),
            segments: t.segments.clone(),
            ratings: t.ratings.clone(),
            ytm: limits.ytm,
            ask: limits.ask,
            dm: limits.dm,
        }
    }

    #[test]
    fn full_selection_passes_every_row() {
        let t = sample();
        assert_eq!(filtered_indices(&t, &everything(&t)), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn empty_selection_matches_nothing() {
        let t = sample();
        for category in Category::ALL {
            let mut f = everything(&t);
            f.selection_mut(category).clear();
            assert!(filtered_indices(&t, &f).is_empty(), "{category:?}");
        }
    }

    #[test]
    fn ranges_are_inclusive_and_normalised() {
        let t = sample();
        let mut f = everything(&t);
        f.set_range(Metric::Dm, 250.0, 200.0);
        assert_eq!(f.dm, Bounds { lo: 200.0, hi: 250.0 });
        assert_eq!(filtered_indices(&t, &f), vec![0, 1]);
    }

    #[test]
    fn defaults_select_everything_and_clamp_bands() {
        let t = sample();
        let limits = RangeLimits::of(&t).unwrap();
        let bands = ReferenceBands {
            dm: Bounds::new(150.0, 900.0),
            ytm: Bounds::new(5.5, 11.0),
            ask: Bounds::new(80.0, 99.0),
        };
        let f = init_filter_state(&t, &bands, &limits);
        assert_eq!(f.ratings, t.ratings);
        assert_eq!(f.dm, Bounds::new(200.0, 720.0));
        assert_eq!(f.ytm, Bounds::new(5.5, 11.0));
        assert_eq!(f.ask, Bounds::new(81.0, 98.5));
    }
}
