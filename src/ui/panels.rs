use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};

use crate::data::model::{Category, Metric};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(session) = &mut state.session else {
        ui.label("No data loaded.");
        return;
    };

    let mut changed = false;
    let mut bulk: Option<(Category, bool)> = None;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Category checklists (collapsible) ----
            for category in Category::ALL {
                let all_values = session.pipeline.trimmed.values(category);
                let colors = session.pipeline.colors_for(category);
                let selected = session.filters.selection_mut(category);

                let header_text = format!("{}  ({}/{})", category.label(), selected.len(), all_values.len());
                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(category.header())
                    .default_open(category == Category::Moodys)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                bulk = Some((category, true));
                            }
                            if ui.small_button("None").clicked() {
                                bulk = Some((category, false));
                            }
                        });

                        for val in all_values {
                            let mut text = RichText::new(val);
                            if let Some(cm) = colors {
                                text = text.color(cm.color_for(val));
                            }
                            let mut checked = selected.contains(val);
                            if ui.checkbox(&mut checked, text).changed() {
                                if checked {
                                    selected.insert(val.clone());
                                } else {
                                    selected.remove(val);
                                }
                                changed = true;
                            }
                        }
                    });
            }
            ui.separator();

            // ---- Range sliders ----
            for metric in Metric::ALL {
                let limits = session.pipeline.limits.get(metric);
                let current = session.filters.range(metric);
                let (mut lo, mut hi) = (current.lo, current.hi);

                ui.strong(metric.label());
                let lo_changed = ui
                    .add(
                        Slider::new(&mut lo, limits.lo..=limits.hi)
                            .step_by(metric.step())
                            .text("min"),
                    )
                    .changed();
                let hi_changed = ui
                    .add(
                        Slider::new(&mut hi, limits.lo..=limits.hi)
                            .step_by(metric.step())
                            .text("max"),
                    )
                    .changed();
                if lo_changed || hi_changed {
                    session.filters.set_range(metric, lo, hi);
                    changed = true;
                }
                ui.add_space(6.0);
            }
        });

    match bulk {
        Some((category, true)) => state.select_all(category),
        Some((category, false)) => state.select_none(category),
        None if changed => state.refilter(),
        None => {}
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let has_data = state.session.is_some();
            if ui.add_enabled(has_data, egui::Button::new("Reload")).clicked() {
                let result = state.reload();
                state.report("Reload", result);
                ui.close_menu();
            }
            if ui.add_enabled(has_data, egui::Button::new("Export selection…")).clicked() {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(session) = &state.session {
            ui.label(format!(
                "{} rows loaded, {} after trimming, {} visible",
                session.pipeline.loaded.len(),
                session.pipeline.trimmed.len(),
                session.view.selection.len()
            ))
            .on_hover_text(session.source.to_string());
        }

        ui.separator();

        if ui.button("Reset filters").clicked() {
            state.reset_filters();
        }

        if let Some(msg) = &state.status_message {
            let color = if msg.starts_with("Error") { Color32::RED } else { ui.visuals().text_color() };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open comps table")
        .add_filter("Supported files", &["xlsx", "xlsm", "xlsb", "xls", "ods", "csv", "json", "parquet", "pq"])
        .add_filter("Workbook", &["xlsx", "xlsm", "xlsb", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        let result = state.load_path(&path);
        state.report("Open", result);
    }
}

pub fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export selection")
        .set_file_name("comps_selection.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match state.export(&path) {
            Ok(n) => state.status_message = Some(format!("Exported {n} rows to {}", path.display())),
            Err(e) => state.report("Export", Err(e)),
        }
    }
}
