use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::model::Co2Class;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – selection widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    // Clone what we need so we can mutate state inside the loop.
    let (ring_items, type_names): (Vec<(String, &'static str)>, Vec<String>) =
        match &state.dataset {
            Some(ds) => (
                ds.series
                    .iter()
                    .map(|s| (s.ring.clone(), s.class.label()))
                    .collect(),
                ds.measurement_types.iter().cloned().collect(),
            ),
            None => {
                ui.label("No data loaded.");
                ui.label("File → Open sources… to pick a manifest.");
                return;
            }
        };

    let mut selection_changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Date range ----
            ui.strong("Date range");
            ui.horizontal(|ui: &mut Ui| {
                ui.label("From");
                if ui
                    .add(DatePickerButton::new(&mut state.start).id_salt("start_date"))
                    .changed()
                {
                    selection_changed = true;
                }
            });
            ui.horizontal(|ui: &mut Ui| {
                ui.label("To");
                if ui
                    .add(DatePickerButton::new(&mut state.end).id_salt("end_date"))
                    .changed()
                {
                    selection_changed = true;
                }
            });
            ui.separator();

            // ---- Rings ----
            ui.strong("Rings");
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all_rings();
                }
                if ui.small_button("None").clicked() {
                    state.select_no_rings();
                }
            });
            for (ring, class) in &ring_items {
                let mut checked = state.rings.contains(ring);
                if ui.checkbox(&mut checked, format!("{ring}  ({class})")).changed() {
                    state.toggle_ring(ring);
                }
            }
            ui.separator();

            // ---- Measurement types ----
            ui.strong("Measurement types");
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all_types();
                }
                if ui.small_button("None").clicked() {
                    state.select_no_types();
                }
            });
            for name in &type_names {
                let mut checked = state.types.contains(name);
                if ui.checkbox(&mut checked, name).changed() {
                    state.toggle_type(name);
                }
            }
            ui.separator();

            // ---- CO₂ class ----
            ui.strong("CO₂ class");
            let class_label = match state.class_filter {
                None => "All",
                Some(c) => c.label(),
            };
            egui::ComboBox::from_id_salt("co2_class")
                .selected_text(class_label)
                .show_ui(ui, |ui: &mut Ui| {
                    for (label, value) in [
                        ("All", None),
                        ("aCO2", Some(Co2Class::Ambient)),
                        ("eCO2", Some(Co2Class::Elevated)),
                    ] {
                        if ui
                            .selectable_label(state.class_filter == value, label)
                            .clicked()
                        {
                            state.class_filter = value;
                            selection_changed = true;
                        }
                    }
                });
            ui.separator();

            // ---- Smoothing ----
            ui.strong("Smoothing");
            ui.checkbox(&mut state.smoothing, "Moving average");
            ui.add_enabled(
                state.smoothing,
                egui::Slider::new(&mut state.smoothing_window, 1..=60)
                    .text("window (samples)"),
            );
            ui.separator();

            // ---- Refresh ----
            if ui.button("Refresh Data").clicked() {
                state.refresh(true);
            }
        });

    if selection_changed {
        state.reselect();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open sources…").clicked() {
                open_sources_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} rings, {} readings loaded, {} points shown",
                ds.series.len(),
                ds.total_readings(),
                state.view.point_count()
            ));
        }

        if state.loading {
            ui.spinner();
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_sources_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open source manifest")
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.load_sources(&path);
    }
}
