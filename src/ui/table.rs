use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::stats::{Summary, summary_table};
use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// `describe()`-style table for the summary columns, combined or per session.
pub fn statistics(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        ui.label("No sessions loaded.");
        return;
    };

    let scope = state.stats_scope.as_deref();
    ui.heading(format!("Detailed statistics for {}", scope.unwrap_or("Combined")));
    ui.add_space(4.0);

    let rows = summary_table(dataset, &state.summary_columns, scope);
    if rows.is_empty() {
        ui.label("None of the summary columns are present.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(200.0))
        .columns(Column::auto().at_least(60.0), Summary::LABELS.len())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Metric");
            });
            for label in Summary::LABELS {
                header.col(|ui| {
                    ui.strong(label);
                });
            }
        })
        .body(|mut body| {
            for (column, summary) in &rows {
                body.row(ROW_HEIGHT, |mut row| {
                    row.col(|ui| {
                        ui.label(column.as_str());
                    });
                    for cell in summary.cells() {
                        row.col(|ui| {
                            ui.monospace(cell);
                        });
                    }
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Raw data
// ---------------------------------------------------------------------------

/// Every visible sample, one row each. Rows are virtualised.
pub fn raw_data(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        ui.label("No sessions loaded.");
        return;
    };

    egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto().at_least(170.0))
            .column(Column::auto().at_least(100.0))
            .columns(Column::auto().at_least(70.0), dataset.column_names.len())
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Timestamp");
                });
                header.col(|ui| {
                    ui.strong("Source");
                });
                for name in &dataset.column_names {
                    header.col(|ui| {
                        ui.strong(name.as_str());
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, state.visible_indices.len(), |mut row| {
                    let sample = &dataset.samples[state.visible_indices[row.index()]];
                    row.col(|ui| {
                        ui.monospace(sample.timestamp.format("%Y-%m-%d %H:%M:%S%.3f").to_string());
                    });
                    row.col(|ui| {
                        ui.label(sample.source.as_str());
                    });
                    for name in &dataset.column_names {
                        row.col(|ui| {
                            if let Some(v) = sample.get(name) {
                                ui.monospace(format!("{v}"));
                            }
                        });
                    }
                });
            });
    });
}
