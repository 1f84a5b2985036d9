use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Column identifiers
// ---------------------------------------------------------------------------

/// Sheet header names, in the order the data table shows them.
pub const REQUIRED_COLUMNS: [&str; 7] = ["Issuer", "Industry", "Segment", "Moodys", "YTM", "Ask", "DM"];

/// Categorical columns the sidebar filters by membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Industry,
    Segment,
    Moodys,
}

impl Category {
    pub const ALL: [Category; 3] = [Self::Industry, Self::Segment, Self::Moodys];

    pub fn header(self) -> &'static str {
        match self {
            Self::Industry => "Industry",
            Self::Segment => "Segment",
            Self::Moodys => "Moodys",
        }
    }

    /// Sidebar caption.
    pub fn label(self) -> &'static str {
        match self {
            Self::Industry => "Sector",
            Self::Segment => "Subsector",
            Self::Moodys => "Rating",
        }
    }

    pub fn of(self, instrument: &Instrument) -> &str {
        match self {
            Self::Industry => &instrument.industry,
            Self::Segment => &instrument.segment,
            Self::Moodys => &instrument.moodys,
        }
    }
}

/// Numeric columns the sidebar filters by range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    Ytm,
    Ask,
    Dm,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Self::Ytm, Self::Ask, Self::Dm];

    pub fn label(self) -> &'static str {
        match self {
            Self::Ytm => "Yield",
            Self::Ask => "Ask Price",
            Self::Dm => "Discount Margin",
        }
    }

    /// Slider granularity.
    pub fn step(self) -> f64 {
        match self {
            Self::Ask => 0.1,
            Self::Ytm | Self::Dm => 0.01,
        }
    }

    pub fn of(self, instrument: &Instrument) -> f64 {
        match self {
            Self::Ytm => instrument.ytm,
            Self::Ask => instrument.ask,
            Self::Dm => instrument.dm,
        }
    }
}

// ---------------------------------------------------------------------------
// Instrument – one row of the comps sheet
// ---------------------------------------------------------------------------

/// A single debt comparable.
///
/// Serialises with the sheet's header names so CSV/JSON snapshots and exports
/// line up with the workbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    /// Position in the source data region. Survives every filtering stage,
    /// so any derived view can be joined back to the loaded table.
    #[serde(skip)]
    pub row_id: usize,
    #[serde(rename = "Issuer")]
    pub issuer: String,
    #[serde(rename = "Industry")]
    pub industry: String,
    #[serde(rename = "Segment")]
    pub segment: String,
    #[serde(rename = "Moodys")]
    pub moodys: String,
    #[serde(rename = "YTM")]
    pub ytm: f64,
    #[serde(rename = "Ask")]
    pub ask: f64,
    #[serde(rename = "DM")]
    pub dm: f64,
}

impl Instrument {
    /// Cell text for the column at `idx` in [`REQUIRED_COLUMNS`] order.
    pub fn cell(&self, idx: usize) -> String {
        match idx {
            0 => self.issuer.clone(),
            1 => self.industry.clone(),
            2 => self.segment.clone(),
            3 => self.moodys.clone(),
            4 => format!("{:.2}", self.ytm),
            5 => format!("{:.2}", self.ask),
            6 => format!("{:.2}", self.dm),
            _ => String::new(),
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, YTM {:.2}, Ask {:.2}, DM {:.1})",
            self.issuer, self.moodys, self.ytm, self.ask, self.dm
        )
    }
}

// ---------------------------------------------------------------------------
// CompsTable – an immutable set of instruments
// ---------------------------------------------------------------------------

/// Loaded (or trimmed) instruments with pre-computed distinct values.
#[derive(Debug, Clone, Default)]
pub struct CompsTable {
    pub instruments: Vec<Instrument>,
    pub industries: BTreeSet<String>,
    pub segments: BTreeSet<String>,
    pub ratings: BTreeSet<String>,
}

impl CompsTable {
    pub fn from_instruments(instruments: Vec<Instrument>) -> Self {
        let mut table = CompsTable {
            instruments,
            ..Default::default()
        };
        for inst in &table.instruments {
            table.industries.insert(inst.industry.clone());
            table.segments.insert(inst.segment.clone());
            table.ratings.insert(inst.moodys.clone());
        }
        table
    }

    /// A new table holding the rows `keep` accepts, order and row ids intact.
    pub fn retain(&self, keep: impl Fn(&Instrument) -> bool) -> Self {
        Self::from_instruments(self.instruments.iter().filter(|i| keep(i)).cloned().collect())
    }

    /// Distinct observed values of a categorical column.
    pub fn values(&self, category: Category) -> &BTreeSet<String> {
        match category {
            Category::Industry => &self.industries,
            Category::Segment => &self.segments,
            Category::Moodys => &self.ratings,
        }
    }

    /// Every value of a numeric column, in row order.
    pub fn column(&self, metric: Metric) -> Vec<f64> {
        self.instruments.iter().map(|i| metric.of(i)).collect()
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn inst(issuer: &str, moodys: &str, ytm: f64, ask: f64, dm: f64) -> Instrument {
        Instrument {
            row_id: 0,
            issuer: issuer.to_string(),
            industry: "Healthcare".to_string(),
            segment: "Services".to_string(),
            moodys: moodys.to_string(),
            ytm,
            ask,
            dm,
        }
    }

    /// Row ids assigned by position.
    pub(crate) fn table(rows: Vec<Instrument>) -> CompsTable {
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(row_id, inst)| Instrument { row_id, ..inst })
            .collect();
        CompsTable::from_instruments(rows)
    }

    #[test]
    fn distinct_values_are_collected() {
        let mut a = inst("A", "B2", 8.0, 97.0, 400.0);
        a.segment = "Pharma".into();
        let t = table(vec![a, inst("B", "B2", 9.0, 95.0, 450.0), inst("C", "Caa1", 11.0, 88.0, 600.0)]);
        assert_eq!(t.len(), 3);
        assert_eq!(t.values(Category::Moodys).len(), 2);
        assert_eq!(t.values(Category::Segment).iter().collect::<Vec<_>>(), ["Pharma", "Services"]);
        assert_eq!(t.values(Category::Industry).len(), 1);
        assert_eq!(t.column(Metric::Dm), vec![400.0, 450.0, 600.0]);
    }

    #[test]
    fn retain_keeps_row_ids() {
        let t = table(vec![
            inst("A", "B2", 8.0, 97.0, 400.0),
            inst("B", "B3", 9.0, 95.0, 450.0),
            inst("C", "Caa1", 11.0, 88.0, 600.0),
        ]);
        let kept = t.retain(|i| i.dm > 420.0);
        let ids: Vec<usize> = kept.instruments.iter().map(|i| i.row_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(!kept.ratings.contains("B2"));
    }

    #[test]
    fn cells_follow_header_order() {
        let i = inst("Acme", "Ba1", 6.457, 90.0, 250.0);
        let cells: Vec<String> = (0..REQUIRED_COLUMNS.len()).map(|c| i.cell(c)).collect();
        assert_eq!(cells, ["Acme", "Healthcare", "Services", "Ba1", "6.46", "90.00", "250.00"]);
    }
}
