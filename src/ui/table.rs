use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::kpi::{Extreme, KpiValue};
use crate::data::model::{Metric, REQUIRED_COLUMNS};
use crate::state::Session;

// ---------------------------------------------------------------------------
// Selection table
// ---------------------------------------------------------------------------

/// The filtered rows, one line per instrument.
pub fn comps_table(ui: &mut Ui, session: &Session) {
    let rows = session.selected_rows();

    TableBuilder::new(ui)
        .id_salt("comps_table")
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::auto().at_least(160.0))
        .columns(Column::auto().at_least(70.0), REQUIRED_COLUMNS.len() - 1)
        .max_scroll_height(280.0)
        .header(22.0, |mut header| {
            for name in REQUIRED_COLUMNS {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, rows.len(), |mut row| {
                let inst = rows[row.index()];
                for idx in 0..REQUIRED_COLUMNS.len() {
                    row.col(|ui| {
                        ui.label(inst.cell(idx));
                    });
                }
            });
        });
}

// ---------------------------------------------------------------------------
// KPI row
// ---------------------------------------------------------------------------

fn kpi_card(ui: &mut Ui, title: &str, value: KpiValue, detail: Option<String>, hover: Option<String>) {
    ui.vertical(|ui| {
        ui.label(RichText::new(title).strong());
        let response = ui.label(RichText::new(value.to_string()).size(26.0));
        if let Some(text) = hover {
            response.on_hover_text(text);
        }
        if let Some(detail) = detail {
            ui.label(detail);
        }
    });
}

/// Max yield and max DM with their issuer, plus average DM.
pub fn kpi_row(ui: &mut Ui, session: &Session) {
    let kpis = &session.view.kpis;
    let describe = |e: &Extreme| session.pipeline.loaded.instruments.get(e.row_id).map(|i| i.to_string());

    ui.columns(3, |cols| {
        kpi_card(
            &mut cols[0],
            &format!("Max {}", Metric::Ytm.label()),
            KpiValue(kpis.max_ytm.as_ref().map(|e| e.value)),
            kpis.max_ytm.as_ref().map(|e| format!("Issuer: {}", e.issuer)),
            kpis.max_ytm.as_ref().and_then(describe),
        );
        kpi_card(
            &mut cols[1],
            &format!("Max {}", Metric::Dm.label()),
            KpiValue(kpis.max_dm.as_ref().map(|e| e.value)),
            kpis.max_dm.as_ref().map(|e| format!("Issuer: {}", e.issuer)),
            kpis.max_dm.as_ref().and_then(describe),
        );
        kpi_card(
            &mut cols[2],
            &format!("Average {}", Metric::Dm.label()),
            KpiValue(kpis.avg_dm),
            None,
            None,
        );
    });
}
