use std::fmt;

use super::model::Instrument;
use super::stats::{argmax_first, mean};

/// A maximum together with the row that attains it.
#[derive(Debug, Clone, PartialEq)]
pub struct Extreme {
    pub value: f64,
    pub issuer: String,
    pub row_id: usize,
}

/// Headline numbers over the current selection. Each is `None` when the
/// selection is empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KpiSummary {
    pub max_ytm: Option<Extreme>,
    pub max_dm: Option<Extreme>,
    pub avg_dm: Option<f64>,
}

fn extreme(rows: &[&Instrument], value: impl Fn(&Instrument) -> f64) -> Option<Extreme> {
    let values: Vec<f64> = rows.iter().map(|i| value(i)).collect();
    let best = rows[argmax_first(&values)?];
    Some(Extreme {
        value: value(best),
        issuer: best.issuer.clone(),
        row_id: best.row_id,
    })
}

/// Max YTM, max DM (each with its issuer) and mean DM. Ties on a maximum go
/// to the first row in selection order.
pub fn summarize(rows: &[&Instrument]) -> KpiSummary {
    let dms: Vec<f64> = rows.iter().map(|i| i.dm).collect();
    KpiSummary {
        max_ytm: extreme(rows, |i| i.ytm),
        max_dm: extreme(rows, |i| i.dm),
        avg_dm: mean(&dms),
    }
}

/// One-decimal KPI text, or "no data".
pub struct KpiValue(pub Option<f64>);

impl fmt::Display for KpiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{v:.1}"),
            None => f.write_str("no data"),
        }
    }
}
