use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::loader::SessionSource;
use crate::state::{AppState, TimeAxis, View};

// ---------------------------------------------------------------------------
// Left side panel – sessions and chart controls
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Sessions");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No sessions loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the loop.
    let counts = dataset.counts_by_source();
    let columns = dataset.column_names.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Session visibility ----
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all();
                }
                if ui.small_button("None").clicked() {
                    state.select_none();
                }
            });
            for (source, rows) in &counts {
                let text = RichText::new(format!("{source}  ({rows})"))
                    .color(state.color_map.color_for(source));
                let mut checked = state.is_visible(source);
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_source(source);
                }
            }
            ui.separator();

            // ---- Metric selector ----
            ui.strong("Metric");
            let current = state.metric.clone().unwrap_or_default();
            egui::ComboBox::from_id_salt("metric")
                .selected_text(&current)
                .width(ui.available_width())
                .show_ui(ui, |ui: &mut Ui| {
                    for col in &columns {
                        if ui.selectable_label(current == *col, col.as_str()).clicked() {
                            state.metric = Some(col.clone());
                        }
                    }
                });
            ui.add_space(4.0);

            // ---- Time axis ----
            ui.strong("Time axis");
            ui.radio_value(&mut state.time_axis, TimeAxis::Clock, "Clock time");
            ui.radio_value(&mut state.time_axis, TimeAxis::Elapsed, "Elapsed since session start");
            ui.separator();

            // ---- Statistics scope ----
            ui.strong("Statistics for");
            let scope_text = state.stats_scope.clone().unwrap_or_else(|| "Combined".to_string());
            egui::ComboBox::from_id_salt("stats_scope")
                .selected_text(scope_text)
                .show_ui(ui, |ui: &mut Ui| {
                    ui.selectable_value(&mut state.stats_scope, None, "Combined");
                    for (source, _) in &counts {
                        ui.selectable_value(&mut state.stats_scope, Some(source.clone()), source.as_str());
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Add session…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Clear").clicked() {
                state.clear();
                ui.close_menu();
            }
        });

        ui.separator();

        for view in View::ALL {
            ui.selectable_value(&mut state.view, view, view.label());
        }

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} rows from {} sessions, {} visible",
                ds.len(),
                ds.sources.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Bottom panel – load messages
// ---------------------------------------------------------------------------

/// Warnings and failures from loading, collapsed by default.
pub fn messages(ui: &mut Ui, state: &AppState) {
    egui::CollapsingHeader::new(format!("Messages ({})", state.messages.len()))
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ScrollArea::vertical().max_height(120.0).show(ui, |ui: &mut Ui| {
                for msg in &state.messages {
                    let color = if msg.starts_with("Error") {
                        Color32::RED
                    } else {
                        Color32::YELLOW
                    };
                    ui.label(RichText::new(msg.as_str()).color(color));
                }
            });
        });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let files = rfd::FileDialog::new()
        .set_title("Add sensor log")
        .add_filter("CSV", &["csv", "CSV"])
        .pick_files();

    for path in files.unwrap_or_default() {
        state.add_session(SessionSource::from_path(path));
    }
}
