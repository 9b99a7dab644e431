use eframe::egui::Ui;
use egui_plot::{Legend, Line, Plot, PlotPoints};

use crate::data::filter::rolling_mean;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Time-series plot (central panel)
// ---------------------------------------------------------------------------

/// Render the CO₂ time-series plot: one line per (ring, measurement) pair.
/// Absent values split a line into segments — a gap, never an interpolated
/// point.
pub fn series_plot(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a source manifest to view data  (File → Open sources…)");
        });
        return;
    }

    if state.selection().is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No data selected — choose at least one ring and one measurement type");
        });
        return;
    }

    Plot::new("series_plot")
        .legend(Legend::default())
        .x_axis_label("Time")
        .y_axis_label("CO₂ concentration (ppm)")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (key, points) in &state.view.series {
                let label = key.label();
                let color = state.color_map.color_for(&label);

                let points = if state.smoothing {
                    rolling_mean(points, state.smoothing_window)
                } else {
                    points.clone()
                };

                for segment in contiguous_segments(&points) {
                    let plot_points: PlotPoints = segment
                        .iter()
                        .map(|&(ts, v)| [ts.and_utc().timestamp() as f64, v])
                        .collect();
                    plot_ui.line(Line::new(plot_points).name(&label).color(color).width(1.5));
                }
            }
        });
}

/// Split a series at absent values into runs of present points.
fn contiguous_segments(
    points: &[(chrono::NaiveDateTime, Option<f64>)],
) -> Vec<Vec<(chrono::NaiveDateTime, f64)>> {
    let mut segments = Vec::new();
    let mut current: Vec<(chrono::NaiveDateTime, f64)> = Vec::new();

    for &(ts, value) in points {
        match value {
            Some(v) => current.push((ts, v)),
            None => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}
