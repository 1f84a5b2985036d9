//! Chart builders.
//!
//! Each builder is a pure function from a slice of instruments (plus a colour
//! map where points are coloured by category) to a plain description the UI
//! layer draws with `egui_plot`. Nothing here touches egui state, so the
//! shapes can be checked in unit tests.

use eframe::egui::Color32;

pub mod bars;
pub mod boxplot;
pub mod scatter;

pub use bars::{dm_by_rating, dm_by_segment};
pub use boxplot::dm_box_by_rating;
pub use scatter::{price_vs_dm, price_vs_ytm, GuideBands};

use crate::data::stats::BoxSummary;

/// One bar per category.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub color: Color32,
    pub bars: Vec<CategoryBar>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBar {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub issuer: String,
}

/// Points sharing one category value, hence one colour and legend entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    pub name: String,
    pub color: Color32,
    pub points: Vec<ScatterPoint>,
}

/// A dashed reference segment from `start` to `end` in data coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct GuideLine {
    pub start: [f64; 2],
    pub end: [f64; 2],
    pub color: Color32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<ScatterSeries>,
    pub guides: Vec<GuideLine>,
}

impl ScatterChart {
    /// Issuer of the point closest to `(x, y)`, distances scaled by the
    /// chart's data span so both axes weigh equally.
    pub fn nearest_issuer(&self, x: f64, y: f64) -> Option<&str> {
        let points = self.series.iter().flat_map(|s| s.points.iter());
        let (x_span, y_span) = spans(points.clone().map(|p| (p.x, p.y)));
        points
            .map(|p| {
                let dx = (p.x - x) / x_span;
                let dy = (p.y - y) / y_span;
                (dx * dx + dy * dy, p.issuer.as_str())
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, issuer)| issuer)
    }

    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }
}

/// One box per rating, centred on x = position in `groups`.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxGroup {
    pub label: String,
    pub summary: BoxSummary,
    pub points: Vec<ScatterPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub color: Color32,
    pub groups: Vec<BoxGroup>,
}

/// Width and height of the bounding box of `points`, never zero.
fn spans(points: impl Iterator<Item = (f64, f64)>) -> (f64, f64) {
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for (x, y) in points {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    let span = |lo: f64, hi: f64| if hi > lo { hi - lo } else { 1.0 };
    (span(x_min, x_max), span(y_min, y_max))
}

/// Every chart on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSet {
    pub dm_by_segment: BarChart,
    pub dm_by_rating: BarChart,
    pub price_vs_dm: ScatterChart,
    pub price_vs_ytm: ScatterChart,
    pub dm_box_by_rating: BoxChart,
}
