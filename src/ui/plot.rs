use eframe::egui::{Stroke, Ui};
use egui_plot::{
    Bar, BarChart as PlotBarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, LineStyle,
    MarkerShape, Plot, PlotPoints, Points,
};

use crate::charts::{BarChart, BoxChart, ScatterChart};

const CHART_HEIGHT: f32 = 320.0;

// ---------------------------------------------------------------------------
// Category axis
// ---------------------------------------------------------------------------

/// Categories sit at x = 0, 1, 2, …; only label marks that land on one.
fn category_label(labels: &[String], mark: GridMark) -> String {
    let pos = mark.value.round();
    if (mark.value - pos).abs() > 1e-6 || pos < 0.0 {
        return String::new();
    }
    labels.get(pos as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Bar chart
// ---------------------------------------------------------------------------

pub fn bar_chart(ui: &mut Ui, id: &str, chart: &BarChart) {
    ui.strong(&chart.title);
    if chart.bars.is_empty() {
        ui.label("No rows in view.");
        return;
    }

    let bars: Vec<Bar> = chart
        .bars
        .iter()
        .enumerate()
        .map(|(i, b)| Bar::new(i as f64, b.value).name(&b.label).width(0.6))
        .collect();
    let labels: Vec<String> = chart.bars.iter().map(|b| b.label.clone()).collect();
    let y_label = chart.y_label.clone();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label(&chart.x_label)
        .y_axis_label(&chart.y_label)
        .x_axis_formatter(move |mark, _range| category_label(&labels, mark))
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                PlotBarChart::new(bars)
                    .color(chart.color)
                    .name(&chart.y_label)
                    .element_formatter(Box::new(move |bar, _| {
                        format!("{}\n{y_label}: {:.1}", bar.name, bar.value)
                    })),
            );
        });
}

// ---------------------------------------------------------------------------
// Scatter chart with dashed guides
// ---------------------------------------------------------------------------

pub fn scatter_chart(ui: &mut Ui, id: &str, chart: &ScatterChart) {
    ui.strong(format!("{}  ({} issuers)", chart.title, chart.point_count()));

    // The formatter outlives this frame's borrow.
    let hover = chart.clone();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(&chart.x_label)
        .y_axis_label(&chart.y_label)
        .label_formatter(move |name, value| {
            let coords = format!("{}: {:.2}\n{}: {:.2}", hover.x_label, value.x, hover.y_label, value.y);
            match hover.nearest_issuer(value.x, value.y) {
                Some(issuer) if !name.is_empty() => format!("{issuer} ({name})\n{coords}"),
                _ => coords,
            }
        })
        .show(ui, |plot_ui| {
            for series in &chart.series {
                let points: PlotPoints = series.points.iter().map(|p| [p.x, p.y]).collect();
                plot_ui.points(
                    Points::new(points)
                        .name(&series.name)
                        .color(series.color)
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(3.5),
                );
            }
            for guide in &chart.guides {
                plot_ui.line(
                    Line::new(PlotPoints::from(vec![guide.start, guide.end]))
                        .color(guide.color)
                        .style(LineStyle::dashed_loose())
                        .width(1.5),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Box plot with every point overlaid
// ---------------------------------------------------------------------------

pub fn box_chart(ui: &mut Ui, id: &str, chart: &BoxChart) {
    ui.strong(&chart.title);
    if chart.groups.is_empty() {
        ui.label("No rows in view.");
        return;
    }

    let boxes: Vec<BoxElem> = chart
        .groups
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let s = &g.summary;
            BoxElem::new(
                i as f64,
                BoxSpread::new(s.lower_whisker, s.q1, s.median, s.q3, s.upper_whisker),
            )
            .name(&g.label)
            .box_width(0.5)
            .whisker_width(0.3)
            .fill(chart.color.gamma_multiply(0.25))
            .stroke(Stroke::new(1.5, chart.color))
        })
        .collect();
    let points: PlotPoints = chart
        .groups
        .iter()
        .flat_map(|g| g.points.iter().map(|p| [p.x, p.y]))
        .collect();

    let labels: Vec<String> = chart.groups.iter().map(|g| g.label.clone()).collect();
    let hover = chart.clone();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label(&chart.x_label)
        .y_axis_label(&chart.y_label)
        .x_axis_formatter(move |mark, _range| category_label(&labels, mark))
        .label_formatter(move |_name, value| match hover.nearest_issuer(value.x, value.y) {
            Some(issuer) => format!("{issuer}\n{}: {:.1}", hover.y_label, value.y),
            None => format!("{}: {:.1}", hover.y_label, value.y),
        })
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(boxes).name(&chart.y_label));
            plot_ui.points(
                Points::new(points)
                    .color(chart.color)
                    .shape(MarkerShape::Circle)
                    .filled(true)
                    .radius(2.5),
            );
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mark(value: f64) -> GridMark {
        GridMark { value, step_size: 1.0 }
    }

    #[test]
    fn category_axis_labels_integer_marks_only() {
        let labels = vec!["Ba1".to_string(), "B2".to_string()];
        assert_eq!(category_label(&labels, mark(0.0)), "Ba1");
        assert_eq!(category_label(&labels, mark(1.0)), "B2");
        assert_eq!(category_label(&labels, mark(0.5)), "");
        assert_eq!(category_label(&labels, mark(2.0)), "");
        assert_eq!(category_label(&labels, mark(-1.0)), "");
    }
}
