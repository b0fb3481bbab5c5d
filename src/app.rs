use eframe::egui;

use crate::state::{AppState, View};
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct EnergyDashApp {
    pub state: AppState,
}

impl EnergyDashApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for EnergyDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar and view tabs ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Bottom panel: load warnings ----
        if !self.state.messages.is_empty() {
            egui::TopBottomPanel::bottom("messages").show(ctx, |ui| {
                panels::messages(ui, &self.state);
            });
        }

        // ---- Left side panel: sessions and controls ----
        egui::SidePanel::left("session_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: active view ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.view {
            View::TimeSeries => plot::time_series(ui, &self.state),
            View::Distribution => plot::distribution(ui, &self.state),
            View::PowerBreakdown => plot::power_breakdown(ui, &self.state),
            View::Statistics => table::statistics(ui, &self.state),
            View::RawData => table::raw_data(ui, &self.state),
        });
    }
}
