use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot, stats};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RingwatchApp {
    pub state: AppState,
}

impl RingwatchApp {
    /// Start with a manifest already loaded (auto-discovered at launch).
    pub fn with_sources(path: &std::path::Path) -> Self {
        let mut app = Self::default();
        app.state.load_sources(path);
        app
    }
}

impl eframe::App for RingwatchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: selection ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: summary statistics ----
        egui::TopBottomPanel::bottom("stats_panel")
            .default_height(180.0)
            .resizable(true)
            .show(ctx, |ui| {
                stats::stats_panel(ui, &mut self.state);
            });

        // ---- Central panel: time-series plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::series_plot(ui, &self.state);
        });
    }
}
