use eframe::egui::Color32;

use crate::charts::{self, ChartSet, GuideBands};
use crate::color::{parse_hex, ColorMap};
use crate::config::DashboardConfig;
use crate::data::error::LoadError;
use crate::data::filter::{filtered_indices, init_filter_state, FilterState, RangeLimits};
use crate::data::kpi::{summarize, KpiSummary};
use crate::data::model::{Category, CompsTable, Instrument};
use crate::data::trim::{trim_outliers, ReferenceBands};

// ---------------------------------------------------------------------------
// Pipeline: everything derived once per load
// ---------------------------------------------------------------------------

/// Owns a loaded table and every per-load derivation. Built once per fetch or
/// file open; [`CompsPipeline::run`] is re-executed on each filter change.
#[derive(Debug, Clone)]
pub struct CompsPipeline {
    pub loaded: CompsTable,
    /// `loaded` minus DM outliers; what the sidebar filters.
    pub trimmed: CompsTable,
    pub bands: ReferenceBands,
    pub guides: GuideBands,
    pub limits: RangeLimits,
    pub rating_colors: ColorMap,
    pub segment_colors: ColorMap,
    bar_color: Color32,
    guide_color: Color32,
}

/// What the page shows for one filter state.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    /// Indices into `CompsPipeline::trimmed.instruments`.
    pub selection: Vec<usize>,
    pub kpis: KpiSummary,
    pub charts: ChartSet,
}

impl CompsPipeline {
    pub fn new(loaded: CompsTable, config: &DashboardConfig) -> Result<Self, LoadError> {
        let bands = ReferenceBands::compute(&loaded, &config.trim).ok_or(LoadError::NoRows)?;
        let trimmed = trim_outliers(&loaded, bands.dm);
        if trimmed.is_empty() {
            log::warn!("All {} rows fall outside the DM band {:?}", loaded.len(), bands.dm);
            return Err(LoadError::NoRows);
        }
        let guides = GuideBands::compute(&trimmed, &bands, &config.charts).ok_or(LoadError::NoRows)?;
        let limits = RangeLimits::of(&trimmed).ok_or(LoadError::NoRows)?;

        let mut ratings: Vec<&String> = trimmed.ratings.iter().collect();
        crate::data::rating::sort_by_rating(&mut ratings, |r| r.as_str());
        let rating_colors = ColorMap::new(Category::Moodys.header(), ratings);
        let segment_colors = ColorMap::new(Category::Segment.header(), &trimmed.segments);

        let bar_color = parse_hex(&config.charts.bar_color)
            .map_err(|e| crate::config::ConfigError::Invalid(format!("charts.bar_color: {e}")))?;
        let guide_color = parse_hex(&config.charts.guide_color)
            .map_err(|e| crate::config::ConfigError::Invalid(format!("charts.guide_color: {e}")))?;

        Ok(Self {
            loaded,
            trimmed,
            bands,
            guides,
            limits,
            rating_colors,
            segment_colors,
            bar_color,
            guide_color,
        })
    }

    pub fn default_filters(&self) -> FilterState {
        init_filter_state(&self.trimmed, &self.bands, &self.limits)
    }

    /// The colour map keyed on `category`, if points are coloured by it.
    pub fn colors_for(&self, category: Category) -> Option<&ColorMap> {
        [&self.rating_colors, &self.segment_colors]
            .into_iter()
            .find(|cm| cm.column == category.header())
    }

    pub fn rows<'a>(&'a self, selection: &[usize]) -> Vec<&'a Instrument> {
        selection.iter().map(|&i| &self.trimmed.instruments[i]).collect()
    }

    /// filter → KPIs → charts.
    pub fn run(&self, filters: &FilterState) -> DashboardView {
        let selection = filtered_indices(&self.trimmed, filters);
        let rows = self.rows(&selection);
        let kpis = summarize(&rows);

        let dm_view = self.guides.dm_view();
        let dm_rows: Vec<&Instrument> = rows.iter().copied().filter(|i| dm_view.contains_strictly(i.dm)).collect();
        let ytm_view = self.guides.ytm_view();
        let ytm_rows: Vec<&Instrument> = rows.iter().copied().filter(|i| ytm_view.contains_strictly(i.ytm)).collect();

        let charts = ChartSet {
            dm_by_segment: charts::dm_by_segment(&dm_rows, self.bar_color),
            dm_by_rating: charts::dm_by_rating(&dm_rows, self.bar_color),
            price_vs_dm: charts::price_vs_dm(&dm_rows, &self.rating_colors, &self.guides, self.guide_color),
            price_vs_ytm: charts::price_vs_ytm(&ytm_rows, &self.segment_colors, &self.guides, self.guide_color),
            dm_box_by_rating: charts::dm_box_by_rating(&rows, self.bar_color),
        };

        log::debug!(
            "Selection: {} rows ({} in DM view, {} in YTM view)",
            selection.len(),
            dm_rows.len(),
            ytm_rows.len()
        );

        DashboardView {
            selection,
            kpis,
            charts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QuantileBand;
    use crate::data::model::tests::{inst, table};
    use crate::data::model::Metric;
    use crate::data::stats::Bounds;

    /// Trimming and chart bands wide open so small fixtures survive intact.
    fn open_config() -> DashboardConfig {
        let mut config = DashboardConfig::default();
        config.trim.dm = QuantileBand::new(0.0, 1.0);
        config.charts.dm_chart_upper = 1.0;
        config
    }

    #[test]
    fn two_row_scenario() {
        let loaded = table(vec![
            inst("A", "Baa2", 5.0, 95.0, 200.0),
            inst("B", "Ba1", 6.0, 90.0, 250.0),
        ]);
        // A (0, 1) quantile band is the strict (min, max) interval, which
        // would drop both rows; pad it out.
        let pipeline = CompsPipeline::new(
            table(vec![
                inst("low", "B1", 5.5, 92.0, 100.0),
                loaded.instruments[0].clone(),
                loaded.instruments[1].clone(),
                inst("high", "B1", 5.5, 92.0, 300.0),
            ]),
            &open_config(),
        )
        .unwrap();

        let mut filters = pipeline.default_filters();
        filters.industries = ["Healthcare".to_string()].into();
        filters.segments = ["Services".to_string()].into();
        filters.ratings = ["Baa2".to_string(), "Ba1".to_string()].into();
        filters.set_range(Metric::Ytm, 4.0, 7.0);
        filters.set_range(Metric::Ask, 85.0, 100.0);
        filters.set_range(Metric::Dm, 150.0, 260.0);

        let view = pipeline.run(&filters);
        let issuers: Vec<&str> = pipeline.rows(&view.selection).iter().map(|i| i.issuer.as_str()).collect();
        assert_eq!(issuers, ["A", "B"]);

        let max_dm = view.kpis.max_dm.unwrap();
        assert_eq!(max_dm.value, 250.0);
        assert_eq!(max_dm.issuer, "B");
        assert_eq!(view.kpis.avg_dm, Some(225.0));
    }

    fn spread_table() -> CompsTable {
        let ratings = ["Ba1", "Ba3", "B1", "B2", "B3", "Caa1"];
        let segments = ["Services", "Pharma", "Devices"];
        table(
            (0..30)
                .map(|i| {
                    let x = i as f64;
                    let mut row = inst(&format!("I{i:02}"), ratings[i % 6], 5.0 + 0.3 * x, 80.0 + 0.6 * x, 120.0 + 20.0 * x);
                    row.segment = segments[i % 3].to_string();
                    row
                })
                .collect(),
        )
    }

    #[test]
    fn default_filters_start_from_reference_bands() {
        let pipeline = CompsPipeline::new(spread_table(), &DashboardConfig::default()).unwrap();
        // DM 120..=700 in steps of 20; (p10, p95) = (178, 671) keeps 180..=660.
        assert_eq!(pipeline.trimmed.len(), 25);
        for inst in &pipeline.trimmed.instruments {
            assert!(pipeline.bands.dm.contains_strictly(inst.dm));
        }

        let filters = pipeline.default_filters();
        assert_eq!(filters.dm, pipeline.limits.dm);
        let view = pipeline.run(&filters);
        // The cheapest trimmed row (ask 81.8) sits under the p13.5 ask default.
        assert_eq!(view.selection.len(), 24);
        assert!(pipeline.rows(&view.selection).iter().all(|i| i.ask > 82.0));
    }

    #[test]
    fn chart_views_use_their_own_bands() {
        let pipeline = CompsPipeline::new(spread_table(), &DashboardConfig::default()).unwrap();
        let view = pipeline.run(&pipeline.default_filters());
        let dm_view = pipeline.guides.dm_view();

        let scatter_dms: Vec<f64> = view
            .charts
            .price_vs_dm
            .series
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.x))
            .collect();
        assert!(scatter_dms.iter().all(|&dm| dm_view.contains_strictly(dm)));
        assert!(view.charts.price_vs_dm.point_count() < view.selection.len());

        // The box plot keeps the whole selection.
        let box_points: usize = view.charts.dm_box_by_rating.groups.iter().map(|g| g.points.len()).sum();
        assert_eq!(box_points, view.selection.len());

        let ytm_view = pipeline.guides.ytm_view();
        for s in &view.charts.price_vs_ytm.series {
            assert!(s.points.iter().all(|p| ytm_view.contains_strictly(p.x)));
        }
    }

    #[test]
    fn empty_selection_yields_no_data() {
        let pipeline = CompsPipeline::new(spread_table(), &DashboardConfig::default()).unwrap();
        let mut filters = pipeline.default_filters();
        filters.ratings.clear();
        let view = pipeline.run(&filters);
        assert!(view.selection.is_empty());
        assert_eq!(view.kpis, KpiSummary::default());
        assert!(view.charts.dm_by_segment.bars.is_empty());
        assert!(view.charts.price_vs_ytm.guides.is_empty());
        assert!(view.charts.dm_box_by_rating.groups.is_empty());
    }

    #[test]
    fn selection_indices_point_into_trimmed_table() {
        let pipeline = CompsPipeline::new(spread_table(), &DashboardConfig::default()).unwrap();
        let mut filters = pipeline.default_filters();
        filters.dm = Bounds::new(400.0, 500.0);
        let view = pipeline.run(&filters);
        for inst in pipeline.rows(&view.selection) {
            assert!(inst.dm >= 400.0 && inst.dm <= 500.0);
            assert_eq!(&pipeline.loaded.instruments[inst.row_id], inst);
        }
    }

    #[test]
    fn colour_maps_cover_their_categories() {
        let pipeline = CompsPipeline::new(spread_table(), &DashboardConfig::default()).unwrap();
        let ratings = pipeline.colors_for(Category::Moodys).unwrap();
        assert_ne!(ratings.color_for("Ba1"), ratings.color_for("B1"));
        assert!(pipeline.colors_for(Category::Segment).is_some());
        assert!(pipeline.colors_for(Category::Industry).is_none());
    }

    #[test]
    fn everything_trimmed_is_an_error() {
        let loaded = table(vec![inst("A", "B1", 7.0, 95.0, 300.0)]);
        assert!(matches!(
            CompsPipeline::new(loaded, &DashboardConfig::default()),
            Err(LoadError::NoRows)
        ));
    }
}
