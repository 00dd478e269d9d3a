use eframe::egui::{Align, Layout, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::export;
use crate::data::model::BASE_PAIR_COLUMN;
use crate::state::AppState;

/// Most rows the grid will draw. Exports always carry the full result.
pub const RESULT_ROW_CAP: usize = 1_000;

// ---------------------------------------------------------------------------
// Central panel – search results
// ---------------------------------------------------------------------------

/// Render the central results area.
pub fn results_panel(ui: &mut Ui, state: &mut AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("Open a dataset to begin (File → Open…).");
        });
        return;
    }

    let Some(results) = &state.results else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("Pick a base pair, enter hydrogen bonds, then Search.");
        });
        return;
    };

    if results.is_empty() {
        ui.heading("Results (0 matches)");
        ui.separator();
        ui.label("No matching base pairs found.");
        return;
    }

    // Defer the dialog until the results borrow is released.
    let mut export_clicked = false;

    ui.horizontal(|ui: &mut Ui| {
        ui.heading(format!("Results ({} matches)", results.len()));
        ui.with_layout(Layout::right_to_left(Align::Center), |ui: &mut Ui| {
            if ui.button("Export CSV…").clicked() {
                export_clicked = true;
            }
        });
    });

    if results.len() > RESULT_ROW_CAP {
        ui.label(
            RichText::new(format!(
                "Showing the first {RESULT_ROW_CAP} rows; the CSV export carries all {} rows.",
                results.len()
            ))
            .weak(),
        );
    }
    ui.separator();

    let columns = &results.columns;
    let shown = results.len().min(RESULT_ROW_CAP);

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(Layout::left_to_right(Align::Center))
        .columns(Column::auto().at_least(60.0).clip(true), columns.len())
        .header(20.0, |mut header| {
            for col in columns {
                header.col(|ui: &mut Ui| {
                    ui.strong(col);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, shown, |mut row| {
                let obs = &results.observations[row.index()];
                for col in columns {
                    row.col(|ui: &mut Ui| {
                        if col == BASE_PAIR_COLUMN {
                            // Colour the stored label so swapped orientations
                            // stand out in a mixed result.
                            if let Some(cm) = &state.pair_colors {
                                ui.label(
                                    RichText::new(&obs.base_pair)
                                        .color(cm.color_for(&obs.base_pair)),
                                );
                            } else {
                                ui.label(&obs.base_pair);
                            }
                        } else {
                            ui.label(obs.column_text(col));
                        }
                    });
                }
            });
        });

    if export_clicked {
        save_results_dialog(state);
    }
}

// ---------------------------------------------------------------------------
// Save dialog
// ---------------------------------------------------------------------------

pub fn save_results_dialog(state: &mut AppState) {
    let Some(results) = &state.results else {
        return;
    };

    let file = rfd::FileDialog::new()
        .set_title("Export search results")
        .set_file_name("bp_search_results.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match export::export_csv(results, &path) {
            Ok(()) => {
                log::info!("Exported {} rows to {}", results.len(), path.display());
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to export results: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
