use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::DashboardConfig;
use crate::data::error::LoadError;
use crate::data::export::export_csv;
use crate::data::filter::FilterState;
use crate::data::loader::{load_file, load_workbook_bytes};
use crate::data::model::{Category, CompsTable, Instrument};
use crate::data::source::fetch_workbook;
use crate::pipeline::{CompsPipeline, DashboardView};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Where the current table came from, so it can be loaded again.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Url(String),
    File(PathBuf),
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Url(url) => f.write_str(url),
            DataSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A loaded table plus the sidebar state and what it currently shows.
pub struct Session {
    pub pipeline: CompsPipeline,
    pub filters: FilterState,
    pub view: DashboardView,
    pub source: DataSource,
}

impl Session {
    pub fn selected_rows(&self) -> Vec<&Instrument> {
        self.pipeline.rows(&self.view.selection)
    }
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// None until a table has been fetched or opened.
    pub session: Option<Session>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            session: None,
            status_message: None,
        }
    }

    /// Derive everything for a freshly loaded table and show it unfiltered.
    pub fn set_table(&mut self, table: CompsTable, source: DataSource) -> Result<(), LoadError> {
        let pipeline = CompsPipeline::new(table, &self.config)?;
        let filters = pipeline.default_filters();
        let view = pipeline.run(&filters);
        log::info!(
            "{source}: {} rows loaded, {} after trimming",
            pipeline.loaded.len(),
            pipeline.trimmed.len()
        );
        self.session = Some(Session {
            pipeline,
            filters,
            view,
            source,
        });
        self.status_message = None;
        Ok(())
    }

    /// Recompute the view after a filter change.
    pub fn refilter(&mut self) {
        if let Some(session) = &mut self.session {
            session.view = session.pipeline.run(&session.filters);
        }
    }

    /// Select every value of one category.
    pub fn select_all(&mut self, category: Category) {
        if let Some(session) = &mut self.session {
            *session.filters.selection_mut(category) = session.pipeline.trimmed.values(category).clone();
        }
        self.refilter();
    }

    /// Deselect every value of one category.
    pub fn select_none(&mut self, category: Category) {
        if let Some(session) = &mut self.session {
            session.filters.selection_mut(category).clear();
        }
        self.refilter();
    }

    /// Back to the state right after loading.
    pub fn reset_filters(&mut self) {
        if let Some(session) = &mut self.session {
            session.filters = session.pipeline.default_filters();
        }
        self.refilter();
    }

    pub fn load_url(&mut self, url: &str) -> Result<(), LoadError> {
        log::info!("Fetching comps workbook from {url}");
        let bytes = fetch_workbook(url)?;
        let table = load_workbook_bytes(bytes, &self.config.source)?;
        self.set_table(table, DataSource::Url(url.to_string()))
    }

    pub fn load_path(&mut self, path: &Path) -> Result<(), LoadError> {
        let table = load_file(path, &self.config.source)?;
        self.set_table(table, DataSource::File(path.to_path_buf()))
    }

    /// Load the current source again; filters go back to their defaults.
    pub fn reload(&mut self) -> Result<(), LoadError> {
        let Some(source) = self.session.as_ref().map(|s| s.source.clone()) else {
            return Ok(());
        };
        match source {
            DataSource::Url(url) => self.load_url(&url),
            DataSource::File(path) => self.load_path(&path),
        }
    }

    /// Write the current selection as CSV. Returns the number of rows written.
    pub fn export(&self, path: &Path) -> Result<usize, LoadError> {
        let Some(session) = &self.session else {
            return Ok(0);
        };
        let rows = session.selected_rows();
        export_csv(path, &rows)?;
        Ok(rows.len())
    }

    /// Log a failed operation and surface it in the top bar.
    pub fn report(&mut self, what: &str, result: Result<(), LoadError>) {
        if let Err(e) = result {
            let e = anyhow::Error::from(e).context(format!("{what} failed"));
            log::error!("{e:#}");
            self.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::{inst, table};
    use crate::data::model::Metric;

    fn spread() -> CompsTable {
        let ratings = ["Ba2", "B1", "B2", "B3"];
        table(
            (0..20)
                .map(|i| {
                    let x = i as f64;
                    inst(&format!("I{i:02}"), ratings[i % 4], 6.0 + 0.2 * x, 85.0 + 0.5 * x, 200.0 + 15.0 * x)
                })
                .collect(),
        )
    }

    fn loaded() -> AppState {
        let mut state = AppState::new(DashboardConfig::default());
        state.set_table(spread(), DataSource::File("comps.csv".into())).unwrap();
        state
    }


    #[test]
    fn none_then_all_restores_selection() {
        let mut state = loaded();
        let before = state.session.as_ref().unwrap().view.selection.clone();
        assert!(!before.is_empty());

        state.select_none(Category::Moodys);
        assert!(state.session.as_ref().unwrap().view.selection.is_empty());
        assert_eq!(state.session.as_ref().unwrap().view.kpis.avg_dm, None);

        state.select_all(Category::Moodys);
        assert_eq!(state.session.as_ref().unwrap().view.selection, before);
    }

    #[test]
    fn reset_undoes_range_edits() {
        let mut state = loaded();
        let defaults = state.session.as_ref().unwrap().filters.clone();
        state.session.as_mut().unwrap().filters.set_range(Metric::Dm, 300.0, 310.0);
        state.refilter();
        assert!(state.session.as_ref().unwrap().view.selection.len() <= 1);

        state.reset_filters();
        assert_eq!(state.session.as_ref().unwrap().filters, defaults);
    }

    #[test]
    fn failed_load_keeps_previous_session() {
        let mut state = loaded();
        let result = state.load_path(Path::new("comps.docx"));
        assert!(matches!(result, Err(LoadError::UnsupportedFile(_))));
        state.report("Open", result);
        assert!(state.session.is_some());
        assert!(state.status_message.as_deref().unwrap().starts_with("Error"));
    }

    #[test]
    fn export_then_reload_from_file() {
        let state = loaded();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        let written = state.export(&path).unwrap();
        assert_eq!(written, state.session.as_ref().unwrap().view.selection.len());

        let mut reopened = AppState::new(DashboardConfig::default());
        reopened.load_path(&path).unwrap();
        let session = reopened.session.as_ref().unwrap();
        assert_eq!(session.pipeline.loaded.len(), written);
        assert_eq!(session.source, DataSource::File(path.clone()));

        reopened.reload().unwrap();
        assert_eq!(reopened.session.as_ref().unwrap().pipeline.loaded.len(), written);
    }

    #[test]
    fn nothing_loaded_is_a_no_op() {
        let mut state = AppState::new(DashboardConfig::default());
        state.select_all(Category::Segment);
        state.reset_filters();
        assert!(state.reload().is_ok());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        assert_eq!(state.export(&path).unwrap(), 0);
        assert!(!path.exists());
        assert!(state.session.is_none());
    }

    #[test]
    fn successful_report_keeps_status() {
        let mut state = loaded();
        state.status_message = Some("Exported 3 rows".into());
        state.report("Reload", Ok(()));
        assert_eq!(state.status_message.as_deref(), Some("Exported 3 rows"));

        let missing = Path::new("does-not-exist.csv");
        let result = state.load_path(missing);
        state.report("Open", result);
        let msg = state.status_message.as_deref().unwrap();
        assert!(msg.starts_with("Error: Open failed"), "{msg}");
    }
}
