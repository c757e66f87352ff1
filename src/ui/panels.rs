use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::MetricKind;
use crate::data::lookup::labels_for;
use crate::data::model::Year;
use crate::data::selection::{is_option_enabled, LINE_OPTIONS};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let (years, regions) = match &state.dataset {
        Some(ds) => (
            ds.years.iter().cloned().collect::<Vec<Year>>(),
            ds.regions.iter().cloned().collect::<Vec<String>>(),
        ),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Metric ----
            ui.strong("Metric");
            let mut metric = state.selection.metric;
            egui::ComboBox::from_id_salt("metric")
                .selected_text(metric.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    for m in MetricKind::ALL {
                        ui.selectable_value(&mut metric, m, m.to_string());
                    }
                });
            if metric != state.selection.metric {
                state.set_metric(metric);
            }
            ui.add_space(6.0);

            // ---- Disease ----
            ui.strong("Disease");
            let mut disease = state.selection.disease.clone();
            egui::ComboBox::from_id_salt("disease")
                .selected_text(disease.as_deref().unwrap_or("All diseases"))
                .width(200.0)
                .show_ui(ui, |ui: &mut Ui| {
                    ui.selectable_value(&mut disease, None, "All diseases");
                    for label in labels_for(state.selection.metric) {
                        ui.selectable_value(&mut disease, Some(label.to_string()), label);
                    }
                });
            if disease != state.selection.disease {
                state.set_disease(disease);
            }
            ui.add_space(6.0);

            // ---- Region ----
            ui.strong("Region");
            let mut region = state.selection.region.clone();
            egui::ComboBox::from_id_salt("region")
                .selected_text(region.as_deref().unwrap_or("All regions"))
                .show_ui(ui, |ui: &mut Ui| {
                    ui.selectable_value(&mut region, None, "All regions");
                    for r in &regions {
                        ui.selectable_value(&mut region, Some(r.clone()), r);
                    }
                });
            if region != state.selection.region {
                state.set_region(region);
            }
            ui.add_space(6.0);

            // ---- Treemap year ----
            ui.strong("Treemap year");
            let mut year = state.selection.year.clone();
            let year_text = year.as_ref().map_or("All years".to_string(), Year::to_string);
            egui::ComboBox::from_id_salt("year")
                .selected_text(year_text)
                .show_ui(ui, |ui: &mut Ui| {
                    ui.selectable_value(&mut year, None, "All years");
                    for y in &years {
                        ui.selectable_value(&mut year, Some(y.clone()), y.as_str());
                    }
                });
            if year != state.selection.year {
                state.set_year(year);
            }
            ui.separator();

            // ---- Line chart multi-select ----
            let n_selected = state.selection.lines.len();
            egui::CollapsingHeader::new(
                RichText::new(format!("Demographic lines  ({n_selected})")).strong(),
            )
            .default_open(true)
            .show(ui, |ui: &mut Ui| {
                for option in LINE_OPTIONS {
                    let enabled = is_option_enabled(&state.selection.lines, option);
                    let mut checked = state.selection.lines.iter().any(|s| s == option);
                    let checkbox = egui::Checkbox::new(&mut checked, option);
                    if ui.add_enabled(enabled, checkbox).changed() {
                        state.toggle_line(option);
                    }
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
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.charts.line.as_ref().is_some_and(|t| !t.is_empty());
            if ui
                .add_enabled(can_export, egui::Button::new("Export line data…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            let span = ds
                .year_span()
                .map(|(a, b)| format!(", {a}–{b}"))
                .unwrap_or_default();
            ui.label(format!("{} records loaded{span}", ds.len()));
            ui.separator();
            ui.label(RichText::new(state.selection.title()).strong());
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open indicator data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let Some(table) = &state.charts.line else {
        return;
    };
    let file = rfd::FileDialog::new()
        .set_title("Export line chart data")
        .add_filter("CSV", &["csv"])
        .set_file_name("line_chart.csv")
        .save_file();

    if let Some(path) = file {
        if let Err(e) = crate::data::export::write_table(&path, table) {
            log::error!("Failed to export: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
