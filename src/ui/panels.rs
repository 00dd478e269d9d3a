use eframe::egui::{self, Color32, RichText, ScrollArea, TextEdit, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – search widgets
// ---------------------------------------------------------------------------

/// Render the left search panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Search");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the widgets.
    let pairs: Vec<String> = dataset.base_pairs.iter().cloned().collect();
    let slot_count = dataset.slots.len();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Base-pair selector ----
            ui.strong("Base pair");
            let current = state.selected_pair.clone().unwrap_or_default();
            egui::ComboBox::from_id_salt("base_pair")
                .selected_text(&current)
                .show_ui(ui, |ui: &mut Ui| {
                    for pair in &pairs {
                        let mut text = RichText::new(pair);
                        if let Some(cm) = &state.pair_colors {
                            text = text.color(cm.color_for(pair));
                        }
                        if ui.selectable_label(current == *pair, text).clicked() {
                            state.selected_pair = Some(pair.clone());
                        }
                    }
                });
            ui.label(
                RichText::new("Either atom order finds the pair.")
                    .small()
                    .weak(),
            );
            ui.separator();

            // ---- Hydrogen-bond query ----
            ui.strong("Hydrogen bonds");
            ui.add(
                TextEdit::singleline(&mut state.hbond_input)
                    .hint_text("e.g. O6-N3, N2-O2"),
            );
            ui.label(
                RichText::new("Comma separated; every bond must be present.")
                    .small()
                    .weak(),
            );
            ui.checkbox(&mut state.legacy_substring, "Legacy substring matching");
            ui.add_space(4.0);

            if ui.button("Search").clicked() {
                state.run_search();
            }

            ui.separator();
            ui.label(format!("{slot_count} hydrogen-bond slot(s) in this table"));
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.dataset {
            ui.label(format!(
                "{} observations, {} distinct base pairs",
                table.len(),
                table.base_pairs.len()
            ));
        }

        ui.separator();

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open base-pair observations")
        .add_filter("Supported files", &["parquet", "pq", "json", "csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.loading = true;
        match crate::data::loader::load_file(&path) {
            Ok(table) => {
                log::info!(
                    "Loaded {} observations, {} distinct base pairs, {} hbond slot(s)",
                    table.len(),
                    table.base_pairs.len(),
                    table.slots.len()
                );
                state.set_dataset(table);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
                state.loading = false;
            }
        }
    }
}
