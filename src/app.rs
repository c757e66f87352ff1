use eframe::egui::{self, Ui};

use crate::config::Config;
use crate::state::AppState;
use crate::ui::{panels, plot, treemap};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    /// Build the app and load the configured dataset, if any.
    pub fn new(config: &Config) -> Self {
        let mut state = AppState::new(&config.defaults);
        if let Some(path) = &config.data.path {
            state.load_path(path);
        }
        Self { state }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.dataset.is_none() {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.heading("Open an indicator table to begin  (File → Open…)");
                });
                return;
            }
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| charts(ui, &self.state));
        });
    }
}

fn charts(ui: &mut Ui, state: &AppState) {
    let charts = &state.charts;
    let y_label = state.selection.metric.axis_label();

    ui.columns(2, |cols| {
        cols[0].strong(state.selection.title());
        plot::line_chart(&mut cols[0], charts.line.as_ref(), y_label);

        cols[1].strong(format!("All {} indicators", state.selection.metric));
        plot::stacked_area_chart(&mut cols[1], &charts.stacked, &charts.stacked_series, y_label);
    });
    ui.separator();

    ui.columns(2, |cols| {
        cols[0].strong("Share by race");
        plot::share_bar_chart(&mut cols[0], "race_bars", &charts.race);

        cols[1].strong("Share by gender");
        plot::share_bar_chart(&mut cols[1], "gender_bars", &charts.gender);
    });
    ui.separator();

    let year = state
        .selection
        .year
        .as_ref()
        .map_or("all years".to_string(), |y| y.to_string());
    ui.strong(format!("Topics by region, {year}"));
    treemap::treemap(ui, &charts.treemap);

    if let Some(line) = &charts.line {
        ui.separator();
        egui::CollapsingHeader::new("Line chart data")
            .default_open(false)
            .show(ui, |ui: &mut Ui| plot::data_table(ui, line));
    }
}
