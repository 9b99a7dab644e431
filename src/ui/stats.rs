use chrono::{NaiveTime, Timelike};
use eframe::egui::{self, DragValue, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Summary statistics table (bottom panel)
// ---------------------------------------------------------------------------

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) => format!("{x:.2}"),
        None => "–".to_string(),
    }
}

/// hh:mm drag widgets for one side of the time-of-day window. Returns the
/// edited time when either field changed; seconds pin the bound to the start
/// or end of the minute so the window stays inclusive.
fn time_input(ui: &mut Ui, id: &str, time: NaiveTime, end_of_minute: bool) -> Option<NaiveTime> {
    let mut hour = time.hour();
    let mut minute = time.minute();
    let mut changed = false;

    ui.push_id(id, |ui: &mut Ui| {
        ui.horizontal(|ui: &mut Ui| {
            changed |= ui.add(DragValue::new(&mut hour).range(0..=23)).changed();
            ui.label(":");
            changed |= ui.add(DragValue::new(&mut minute).range(0..=59)).changed();
        });
    });

    if !changed {
        return None;
    }
    let second = if end_of_minute { 59 } else { 0 };
    NaiveTime::from_hms_opt(hour, minute, second)
}

/// Render the per-(ring, measurement) summary stats for the current
/// selection. The stats query has its own date range and time-of-day window,
/// independent of the plot range.
pub fn stats_panel(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.heading("Statistics");
        ui.label(
            RichText::new("eCO₂ values below 350 ppm are excluded from these aggregates")
                .small()
                .weak(),
        );
    });

    if state.dataset.is_none() || state.selection().is_empty() {
        ui.label("No data selected.");
        return;
    }

    // ---- Stats query controls ----
    let mut query_changed = false;
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Stats range");
        query_changed |= ui
            .add(DatePickerButton::new(&mut state.stats_start).id_salt("stats_start"))
            .changed();
        ui.label("to");
        query_changed |= ui
            .add(DatePickerButton::new(&mut state.stats_end).id_salt("stats_end"))
            .changed();

        ui.separator();

        ui.label("Time of day");
        if let Some(t) = time_input(ui, "stats_time_start", state.stats_time.start, false) {
            state.stats_time.start = t;
            query_changed = true;
        }
        ui.label("to");
        if let Some(t) = time_input(ui, "stats_time_end", state.stats_time.end, true) {
            state.stats_time.end = t;
            query_changed = true;
        }
    });
    if query_changed {
        state.reselect();
    }

    ScrollArea::vertical().auto_shrink([false, true]).show(ui, |ui: &mut Ui| {
        egui::Grid::new("stats_grid")
            .striped(true)
            .num_columns(6)
            .show(ui, |ui: &mut Ui| {
                ui.strong("Ring");
                ui.strong("Measurement");
                ui.strong("Count");
                ui.strong("Min");
                ui.strong("Max");
                ui.strong("Mean");
                ui.end_row();

                for (key, stats) in &state.view.stats {
                    ui.label(&key.ring);
                    ui.label(&key.measurement);
                    ui.label(stats.count.to_string());
                    ui.label(fmt_opt(stats.min));
                    ui.label(fmt_opt(stats.max));
                    ui.label(fmt_opt(stats.mean));
                    ui.end_row();
                }
            });
    });
}
