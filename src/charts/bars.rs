use std::collections::BTreeMap;

use eframe::egui::Color32;

use crate::data::model::Instrument;
use crate::data::rating::sort_by_rating;

use super::{BarChart, CategoryBar};

/// Mean DM per distinct `key`, keys ascending.
fn mean_dm_by<'a>(rows: &[&'a Instrument], key: impl Fn(&'a Instrument) -> &'a str) -> Vec<CategoryBar> {
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for &inst in rows {
        let entry = groups.entry(key(inst)).or_insert((0.0, 0));
        entry.0 += inst.dm;
        entry.1 += 1;
    }
    groups
        .into_iter()
        .map(|(label, (sum, n))| CategoryBar {
            label: label.to_string(),
            value: sum / n as f64,
        })
        .collect()
}

pub fn dm_by_segment(rows: &[&Instrument], color: Color32) -> BarChart {
    BarChart {
        title: "DM by Segment".to_string(),
        x_label: "Segment".to_string(),
        y_label: "DM".to_string(),
        color,
        bars: mean_dm_by(rows, |i| i.segment.as_str()),
    }
}

/// Bars in rating-ladder order rather than alphabetical.
pub fn dm_by_rating(rows: &[&Instrument], color: Color32) -> BarChart {
    let mut bars = mean_dm_by(rows, |i| i.moodys.as_str());
    sort_by_rating(&mut bars, |b| b.label.as_str());
    BarChart {
        title: "DM by Rating".to_string(),
        x_label: "Moodys".to_string(),
        y_label: "DM".to_string(),
        color,
        bars,
    }
}
