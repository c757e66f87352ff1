use eframe::egui::{Stroke, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Polygon};

use crate::color::ColorMap;
use crate::data::aggregate::StackedSeries;
use crate::data::model::{AggregatedTable, Year};

const CHART_HEIGHT: f32 = 260.0;

fn year_x(year: &Year, fallback: usize) -> f64 {
    year.as_f64().unwrap_or(fallback as f64)
}

fn no_data(ui: &mut Ui, message: &str) {
    ui.allocate_ui(eframe::egui::vec2(ui.available_width(), CHART_HEIGHT), |ui: &mut Ui| {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.weak(message);
        });
    });
}

/// Split a series at `NaN` cells so gaps stay gaps.
fn finite_runs(points: impl IntoIterator<Item = [f64; 2]>) -> Vec<Vec<[f64; 2]>> {
    let mut runs = vec![Vec::new()];
    for p in points {
        if p[1].is_finite() {
            if let Some(run) = runs.last_mut() {
                run.push(p);
            }
        } else if runs.last().is_some_and(|r| !r.is_empty()) {
            runs.push(Vec::new());
        }
    }
    runs.retain(|r| !r.is_empty());
    runs
}

// ---------------------------------------------------------------------------
// Line chart
// ---------------------------------------------------------------------------

/// Demographic or regional trend lines, one per group key.
pub fn line_chart(ui: &mut Ui, table: Option<&AggregatedTable>, y_label: &str) {
    let Some(table) = table else {
        no_data(ui, "Select a demographic line");
        return;
    };
    if table.is_empty() {
        no_data(ui, "No data for this selection");
        return;
    }

    let colors = ColorMap::new(&table.keys);

    Plot::new("line_chart")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label("Year")
        .y_axis_label(y_label)
        .include_y(0.0)
        .show(ui, |plot_ui| {
            for key in &table.keys {
                let points = table
                    .series(key)
                    .into_iter()
                    .enumerate()
                    .map(|(i, (year, v))| [year_x(year, i), v]);
                for run in finite_runs(points) {
                    let line = Line::new(PlotPoints::from(run))
                        .name(key)
                        .color(colors.color_for(key))
                        .width(2.5);
                    plot_ui.line(line);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Stacked area chart
// ---------------------------------------------------------------------------

/// Stacked areas of the per-question means.
///
/// Each year interval is its own quad so every polygon stays convex.
pub fn stacked_area_chart(ui: &mut Ui, table: &AggregatedTable, series: &[StackedSeries], y_label: &str) {
    if table.is_empty() {
        no_data(ui, "No data for this selection");
        return;
    }

    let colors = ColorMap::new(&table.keys);

    Plot::new("stacked_area_chart")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label("Year")
        .y_axis_label(y_label)
        .include_y(0.0)
        .show(ui, |plot_ui| {
            for s in series {
                let color = colors.color_for(&s.key);
                for (i, pair) in s.points.windows(2).enumerate() {
                    let (a, b) = (&pair[0], &pair[1]);
                    if a.missing || b.missing {
                        continue;
                    }
                    let (xa, xb) = (year_x(&a.year, i), year_x(&b.year, i + 1));
                    let quad = vec![[xa, a.lower], [xb, b.lower], [xb, b.upper], [xa, a.upper]];
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(quad))
                            .name(&s.key)
                            .fill_color(color.gamma_multiply(0.85))
                            .stroke(Stroke::new(1.0, color)),
                    );
                }
            }
        });
}

// ---------------------------------------------------------------------------
// 100% stacked share bars
// ---------------------------------------------------------------------------

/// Per-year share bars; `id` keeps the race and gender plots apart.
pub fn share_bar_chart(ui: &mut Ui, id: &str, shares: &AggregatedTable) {
    if shares.is_empty() {
        no_data(ui, "No data for this selection");
        return;
    }

    let colors = ColorMap::new(&shares.keys);
    let mut base = vec![0.0_f64; shares.rows.len()];

    let charts: Vec<BarChart> = shares
        .keys
        .iter()
        .map(|key| {
            let bars = shares
                .rows
                .iter()
                .zip(base.iter_mut())
                .enumerate()
                .filter_map(|(i, (row, offset))| {
                    let share = row.get(key).filter(|v| v.is_finite())?;
                    let bar = Bar::new(year_x(&row.year, i), share)
                        .base_offset(*offset)
                        .width(0.7)
                        .name(format!("{key} {}: {:.1}%", row.year, share * 100.0));
                    *offset += share;
                    Some(bar)
                })
                .collect();
            BarChart::new(bars).name(key).color(colors.color_for(key))
        })
        .collect();

    Plot::new(id)
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label("Year")
        .y_axis_label("Share")
        .include_y(0.0)
        .include_y(1.0)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Tabular view
// ---------------------------------------------------------------------------

/// The aggregated rows behind a chart, `NaN` shown as "–".
pub fn data_table(ui: &mut Ui, table: &AggregatedTable) {
    if table.is_empty() {
        ui.weak("No rows");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(50.0))
        .columns(Column::auto().at_least(80.0), table.keys.len())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Year");
            });
            for key in &table.keys {
                header.col(|ui| {
                    ui.strong(key);
                });
            }
        })
        .body(|mut body| {
            for row in &table.rows {
                body.row(18.0, |mut cells| {
                    cells.col(|ui| {
                        ui.label(row.year.as_str());
                    });
                    for key in &table.keys {
                        cells.col(|ui| {
                            match row.get(key).filter(|v| v.is_finite()) {
                                Some(v) => ui.label(format!("{v:.2}")),
                                None => ui.weak("–"),
                            };
                        });
                    }
                });
            }
        });
}
