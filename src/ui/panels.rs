use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use trademe_dashboard::data::charts::format_currency;
use trademe_dashboard::data::model::{CellValue, FilterColumn};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Please Filter Here:");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    // Collect what we need so we can mutate state after drawing.
    let options: Vec<(FilterColumn, Vec<CellValue>)> = FilterColumn::ALL
        .iter()
        .map(|col| (*col, dataset.distinct(*col).cloned().collect()))
        .collect();
    let bounds = dataset.date_bounds;

    let mut toggled: Option<(FilterColumn, CellValue)> = None;
    let mut cleared: Option<FilterColumn> = None;
    let mut dates = (state.date_start, state.date_end);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Per-column multiselects (collapsible) ----
            for (col, values) in &options {
                let n_selected = state.selection.chosen(*col).count();
                let header_text = if n_selected == 0 {
                    format!("{}  (all)", col.label())
                } else {
                    format!("{}  ({n_selected}/{})", col.label(), values.len())
                };

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(col.header())
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            cleared = Some(*col);
                        }
                        let chosen: Vec<&CellValue> = state.selection.chosen(*col).collect();
                        for val in values {
                            let mut checked = chosen.contains(&val);
                            if ui.checkbox(&mut checked, val.to_string()).changed() {
                                toggled = Some((*col, val.clone()));
                            }
                        }
                    });
            }

            ui.separator();

            // ---- Listing date range ----
            ui.strong("Select Listing Date Range:");
            if bounds.is_some() {
                ui.horizontal(|ui: &mut Ui| {
                    ui.add(DatePickerButton::new(&mut dates.0).id_salt("listing_date_start"));
                    ui.label("to");
                    ui.add(DatePickerButton::new(&mut dates.1).id_salt("listing_date_end"));
                });
            } else {
                ui.label("No listing dates.");
            }
        });

    if let Some((col, val)) = toggled {
        state.toggle_filter_value(col, &val);
    }
    if let Some(col) = cleared {
        state.clear_filter(col);
    }
    if dates != (state.date_start, state.date_end) {
        state.set_date_range(dates.0, dates.1);
    }
}

// ---------------------------------------------------------------------------
// KPI cards
// ---------------------------------------------------------------------------

/// The "Number of Properties Scraped" and "Average Rent" cards.
pub fn kpi_cards(ui: &mut Ui, state: &AppState) {
    let (count, rent) = match &state.result {
        Some(r) => (r.property_count.to_string(), format_currency(r.average_rent)),
        None => ("–".to_string(), "–".to_string()),
    };

    ui.columns(2, |cols| {
        card(&mut cols[0], "Number of Properties Scraped", &count);
        card(&mut cols[1], "Average Rent", &rent);
    });
}

fn card(ui: &mut Ui, title: &str, value: &str) {
    egui::Frame::group(ui.style())
        .fill(Color32::from_rgb(0xf0, 0xf2, 0xf6))
        .inner_margin(10.0)
        .show(ui, |ui: &mut Ui| {
            ui.vertical_centered(|ui: &mut Ui| {
                ui.label(RichText::new(title).size(18.0).color(Color32::from_gray(0x33)));
                ui.label(
                    RichText::new(value)
                        .size(24.0)
                        .strong()
                        .color(Color32::from_gray(0x33)),
                );
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
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} listings loaded, {} shown",
                ds.len(),
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
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open listings")
        .add_filter(
            "Supported files",
            &["xlsx", "xlsm", "xlsb", "xls", "ods", "csv", "parquet", "pq", "json"],
        )
        .add_filter("Spreadsheets", &["xlsx", "xlsm", "xlsb", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        match crate::load_dataset(&path, &state.load_options) {
            Ok(dataset) => state.set_dataset(dataset),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
