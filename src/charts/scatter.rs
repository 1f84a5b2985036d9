use std::collections::BTreeMap;

use eframe::egui::Color32;

use crate::color::ColorMap;
use crate::config::ChartConfig;
use crate::data::model::{CompsTable, Instrument, Metric};
use crate::data::rating::sort_by_rating;
use crate::data::stats::{mean, min_max, quantile, Bounds};
use crate::data::trim::ReferenceBands;

use super::{GuideLine, ScatterChart, ScatterPoint, ScatterSeries};

// ---------------------------------------------------------------------------
// Chart bands
// ---------------------------------------------------------------------------

/// Cut-offs that shape the chart views and the guide segments. Computed once
/// per load.
///
/// The DM chart band pairs the lower DM quantile of the *loaded* set with an
/// upper quantile of the *trimmed* set, so it is narrower than the trimming
/// band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideBands {
    pub dm_lower: f64,
    pub dm_chart_upper: f64,
    pub ytm_lower: f64,
    pub ytm_upper: f64,
    /// Where the Price x YTM horizontal guide ends.
    pub ytm_guide_upper: f64,
    /// Top of both vertical guides.
    pub ask_max: f64,
    /// Bottom of both vertical guides.
    pub price_floor: f64,
}

impl GuideBands {
    /// `None` when `trimmed` is empty.
    pub fn compute(trimmed: &CompsTable, bands: &ReferenceBands, config: &ChartConfig) -> Option<Self> {
        Some(Self {
            dm_lower: bands.dm.lo,
            dm_chart_upper: quantile(&trimmed.column(Metric::Dm), config.dm_chart_upper)?,
            ytm_lower: bands.ytm.lo,
            ytm_upper: bands.ytm.hi,
            ytm_guide_upper: quantile(&trimmed.column(Metric::Ytm), config.ytm_guide_upper)?,
            ask_max: min_max(&trimmed.column(Metric::Ask))?.hi,
            price_floor: config.price_floor,
        })
    }

    /// Rows feeding the DM charts must have DM strictly inside this.
    pub fn dm_view(&self) -> Bounds {
        Bounds {
            lo: self.dm_lower,
            hi: self.dm_chart_upper,
        }
    }

    /// Rows feeding the Price x YTM chart must have YTM strictly inside this.
    pub fn ytm_view(&self) -> Bounds {
        Bounds {
            lo: self.ytm_lower,
            hi: self.ytm_upper,
        }
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Group rows into one series per category value.
fn series_by<'a>(
    rows: &[&'a Instrument],
    key: impl Fn(&'a Instrument) -> &'a str,
    x: Metric,
    y: Metric,
    colors: &ColorMap,
) -> Vec<ScatterSeries> {
    let mut groups: BTreeMap<&str, Vec<ScatterPoint>> = BTreeMap::new();
    for &inst in rows {
        groups.entry(key(inst)).or_default().push(ScatterPoint {
            x: x.of(inst),
            y: y.of(inst),
            issuer: inst.issuer.clone(),
        });
    }
    groups
        .into_iter()
        .map(|(name, points)| ScatterSeries {
            name: name.to_string(),
            color: colors.color_for(name),
            points,
        })
        .collect()
}

/// Vertical guide at `x_mid` from the price floor to the max ask, horizontal
/// guide at `y_mid` across `[x_from, x_to]`.
fn cross_hairs(x_mid: f64, y_mid: f64, x_from: f64, x_to: f64, bands: &GuideBands, color: Color32) -> Vec<GuideLine> {
    vec![
        GuideLine {
            start: [x_mid, bands.price_floor],
            end: [x_mid, bands.ask_max],
            color,
        },
        GuideLine {
            start: [x_from, y_mid],
            end: [x_to, y_mid],
            color,
        },
    ]
}

fn means(rows: &[&Instrument], x: Metric, y: Metric) -> Option<(f64, f64)> {
    let xs: Vec<f64> = rows.iter().map(|i| x.of(i)).collect();
    let ys: Vec<f64> = rows.iter().map(|i| y.of(i)).collect();
    Some((mean(&xs)?, mean(&ys)?))
}

/// Ask against DM, one colour per rating, series in ladder order. `rows` is
/// the DM chart view.
pub fn price_vs_dm(rows: &[&Instrument], colors: &ColorMap, bands: &GuideBands, guide_color: Color32) -> ScatterChart {
    let mut series = series_by(rows, |i| i.moodys.as_str(), Metric::Dm, Metric::Ask, colors);
    sort_by_rating(&mut series, |s| s.name.as_str());

    let guides = means(rows, Metric::Dm, Metric::Ask)
        .map(|(mid_dm, mid_ask)| {
            cross_hairs(mid_dm, mid_ask, bands.dm_lower, bands.dm_chart_upper, bands, guide_color)
        })
        .unwrap_or_default();

    ScatterChart {
        title: "Price x DM".to_string(),
        x_label: "DM".to_string(),
        y_label: "Ask".to_string(),
        series,
        guides,
    }
}

/// Ask against YTM, one colour per segment. `rows` is the YTM chart view.
pub fn price_vs_ytm(rows: &[&Instrument], colors: &ColorMap, bands: &GuideBands, guide_color: Color32) -> ScatterChart {
    let series = series_by(rows, |i| i.segment.as_str(), Metric::Ytm, Metric::Ask, colors);

    let guides = means(rows, Metric::Ytm, Metric::Ask)
        .map(|(mid_ytm, mid_ask)| {
            cross_hairs(mid_ytm, mid_ask, bands.ytm_lower, bands.ytm_guide_upper, bands, guide_color)
        })
        .unwrap_or_default();

    ScatterChart {
        title: "Price x YTM".to_string(),
        x_label: "YTM".to_string(),
        y_label: "Ask".to_string(),
        series,
        guides,
    }
}
