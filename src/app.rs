use eframe::egui::{self, ScrollArea, Ui};

use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DebtCompsApp {
    pub state: AppState,
}

impl DebtCompsApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for DebtCompsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: table, KPIs, charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            dashboard(ui, &self.state);
        });
    }
}

fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(session) = &state.session else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a comps table to begin  (File → Open…)");
        });
        return;
    };
    let charts = &session.view.charts;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading(&state.config.charts.window_title);
            ui.separator();

            table::comps_table(ui, session);
            ui.separator();

            table::kpi_row(ui, session);
            ui.separator();

            ui.columns(2, |cols| {
                plot::bar_chart(&mut cols[0], "dm_by_segment", &charts.dm_by_segment);
                plot::bar_chart(&mut cols[1], "dm_by_rating", &charts.dm_by_rating);
            });
            ui.separator();

            plot::scatter_chart(ui, "price_vs_dm", &charts.price_vs_dm);
            ui.separator();
            plot::scatter_chart(ui, "price_vs_ytm", &charts.price_vs_ytm);
            ui.separator();
            plot::box_chart(ui, "dm_box_by_rating", &charts.dm_box_by_rating);
        });
}
