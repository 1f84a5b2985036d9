use std::collections::BTreeMap;

use eframe::egui::Color32;

use crate::data::model::Instrument;
use crate::data::rating::sort_by_rating;
use crate::data::stats::BoxSummary;

use super::{BoxChart, BoxGroup, ScatterPoint};

/// DM distribution per rating, boxes in ladder order, every row kept as a
/// point so outliers stay visible. Point `x` is the box position.
pub fn dm_box_by_rating(rows: &[&Instrument], color: Color32) -> BoxChart {
    let mut by_rating: BTreeMap<&str, Vec<&Instrument>> = BTreeMap::new();
    for &inst in rows {
        by_rating.entry(inst.moodys.as_str()).or_default().push(inst);
    }
    let mut ratings: Vec<(&str, Vec<&Instrument>)> = by_rating.into_iter().collect();
    sort_by_rating(&mut ratings, |entry| entry.0);

    let groups = ratings
        .into_iter()
        .enumerate()
        .filter_map(|(pos, (code, members))| {
            let dms: Vec<f64> = members.iter().map(|i| i.dm).collect();
            let summary = BoxSummary::from_values(&dms)?;
            let points = members
                .iter()
                .map(|i| ScatterPoint {
                    x: pos as f64,
                    y: i.dm,
                    issuer: i.issuer.clone(),
                })
                .collect();
            Some(BoxGroup {
                label: code.to_string(),
                summary,
                points,
            })
        })
        .collect();

    BoxChart {
        title: "DM Outliers by Rating".to_string(),
        x_label: "Moodys".to_string(),
        y_label: "DM".to_string(),
        color,
        groups,
    }
}

impl BoxChart {
    /// Issuer of the point in the box under `x` whose DM is closest to `y`.
    pub fn nearest_issuer(&self, x: f64, y: f64) -> Option<&str> {
        let pos = x.round();
        if pos < 0.0 {
            return None;
        }
        self.groups
            .get(pos as usize)?
            .points
            .iter()
            .min_by(|a, b| (a.y - y).abs().total_cmp(&(b.y - y).abs()))
            .map(|p| p.issuer.as_str())
    }
}
