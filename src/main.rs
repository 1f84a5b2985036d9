mod app;
mod charts;
mod color;
mod config;
mod data;
mod pipeline;
mod state;
mod ui;

use anyhow::{anyhow, Context};
use app::DebtCompsApp;
use config::DashboardConfig;
use eframe::egui;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = DashboardConfig::from_env().context("loading dashboard configuration")?;
    let title = config.charts.window_title.clone();
    let mut state = AppState::new(config);

    // A configured source must load; without one the user opens a file.
    let url = state.config.source.url.clone();
    if !url.is_empty() {
        if let Err(e) = state
            .load_url(&url)
            .with_context(|| format!("loading comps workbook from {url}"))
        {
            log::error!("{e:#}");
            return Err(e);
        }
    } else {
        log::info!("No source URL configured; waiting for File → Open");
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0])
            .with_title(&title),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(|_cc| Ok(Box::new(DebtCompsApp::new(state)))),
    )
    .map_err(|e| anyhow!("{e}"))
}
