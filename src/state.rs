use std::path::Path;

use crate::config::DefaultsConfig;
use crate::data::aggregate::{
    aggregate, normalize_shares, stack_series, topic_region_hierarchy, StackedSeries, TopicNode,
};
use crate::data::filter::{
    owned_keys, AggregationFilter, GroupDimension, GroupKeys, MetricKind, GENDERS, RACES,
};
use crate::data::lookup::{labels_for, questions_for, resolve_question};
use crate::data::model::{AggregatedTable, Dataset, Record, Year};
use crate::data::selection::{apply_selection, line_filter, toggle_option, LINE_OPTIONS};
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Filter selection
// ---------------------------------------------------------------------------

/// Every drop-down value the charts depend on.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardSelection {
    pub metric: MetricKind,
    /// Disease label; `None` shows every question of the metric.
    pub disease: Option<String>,
    /// Region for the stacked and bar charts; `None` means all regions.
    pub region: Option<String>,
    /// Treemap year; `None` aggregates all years.
    pub year: Option<Year>,
    /// Line chart multi-select.
    pub lines: Vec<String>,
}

impl DashboardSelection {
    /// Start from the configured defaults. Unknown line options are dropped and
    /// the rest go through the regions/demographics rule.
    pub fn from_defaults(defaults: &DefaultsConfig) -> Self {
        let known: Vec<String> = defaults
            .lines
            .iter()
            .filter(|line| {
                let ok = LINE_OPTIONS.contains(&line.as_str());
                if !ok {
                    log::warn!("Ignoring unknown line option in config: {line:?}");
                }
                ok
            })
            .cloned()
            .collect();

        DashboardSelection {
            metric: defaults.metric,
            disease: defaults.disease.clone(),
            region: defaults.region.clone(),
            year: defaults.year.as_deref().map(Year::new),
            lines: apply_selection(&[], &known),
        }
    }

    /// Switch metric, moving the disease label to the same disease's label
    /// for the new metric when one exists.
    pub fn set_metric(&mut self, metric: MetricKind) {
        if self.metric == metric {
            return;
        }
        self.metric = metric;
        if let Some(label) = &self.disease {
            let disease = label.split(" (").next().unwrap_or(label);
            self.disease = labels_for(metric)
                .find(|l| l.split(" (").next() == Some(disease))
                .map(str::to_string);
        }
    }

    /// Label shown above the line chart.
    pub fn title(&self) -> String {
        match &self.disease {
            Some(label) if resolve_question(label).is_some() => label.clone(),
            _ => format!("All diseases ({})", self.metric),
        }
    }
}

// ---------------------------------------------------------------------------
// Derived chart inputs
// ---------------------------------------------------------------------------

/// The aggregated inputs of all five charts.
#[derive(Debug, Clone, Default)]
pub struct ChartData {
    /// `None` when no line is selected or the selection is invalid.
    pub line: Option<AggregatedTable>,
    /// Why the line chart could not be built; the other charts are unaffected.
    pub line_error: Option<Error>,
    pub stacked: AggregatedTable,
    pub stacked_series: Vec<StackedSeries>,
    /// Race shares per year.
    pub race: AggregatedTable,
    /// Gender shares per year.
    pub gender: AggregatedTable,
    pub treemap: Vec<TopicNode>,
}

impl ChartData {
    /// Recompute every chart from scratch for one selection.
    pub fn compute(records: &[Record], sel: &DashboardSelection) -> Result<Self> {
        let (line, line_error) = match line_filter(&sel.lines, sel.metric, sel.disease.as_deref())
            .map(|filter| aggregate(records, &filter))
            .transpose()
        {
            Ok(line) => (line, None),
            Err(e) => {
                log::warn!("Line chart unavailable: {e}");
                (None, Some(e))
            }
        };

        let mut base = AggregationFilter::new(sel.metric);
        base.region = sel.region.clone();

        let stacked = aggregate(
            records,
            &base.clone().grouped_by(
                GroupDimension::Question,
                GroupKeys::Fixed(questions_for(sel.metric)),
            ),
        )?;
        let stacked_series = stack_series(&stacked);

        base.disease = sel.disease.clone();
        let by_strat = |keys: &[&str]| {
            base.clone()
                .grouped_by(GroupDimension::Stratification, GroupKeys::Fixed(owned_keys(keys)))
        };
        let race = normalize_shares(&aggregate(records, &by_strat(&RACES[..]))?);
        let gender = normalize_shares(&aggregate(records, &by_strat(&GENDERS[..]))?);

        let treemap = topic_region_hierarchy(records, sel.metric, sel.year.as_ref());

        log::debug!(
            "Recomputed charts: line {} rows, stacked {} rows, race {} rows, gender {} rows, treemap {} topics",
            line.as_ref().map_or(0, |t| t.rows.len()),
            stacked.rows.len(),
            race.rows.len(),
            gender.rows.len(),
            treemap.len()
        );

        Ok(ChartData {
            line,
            line_error,
            stacked,
            stacked_series,
            race,
            gender,
            treemap,
        })
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<Dataset>,

    pub selection: DashboardSelection,

    /// Chart inputs for the current selection; replaced on every change.
    pub charts: ChartData,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(defaults: &DefaultsConfig) -> Self {
        AppState {
            selection: DashboardSelection::from_defaults(defaults),
            ..Default::default()
        }
    }

    /// Load a file, keeping the previous dataset if loading fails.
    pub fn load_path(&mut self, path: &Path) {
        match crate::data::loader::load_file(path) {
            Ok(dataset) => self.set_dataset(dataset),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded dataset and recompute the charts.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        let year_known = self
            .selection
            .year
            .as_ref()
            .is_some_and(|y| dataset.years.contains(y));
        if !year_known {
            self.selection.year = dataset.years.first().cloned();
        }
        if let Some(region) = &self.selection.region {
            if !dataset.regions.contains(region) {
                self.selection.region = None;
            }
        }

        self.dataset = Some(dataset);
        self.status_message = None;
        self.recompute();
    }

    /// Rebuild the derived chart data after a selection change.
    pub fn recompute(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        match ChartData::compute(&ds.records, &self.selection) {
            Ok(charts) => {
                self.status_message = charts.line_error.as_ref().map(|e| format!("Error: {e}"));
                self.charts = charts;
            }
            Err(e) => {
                log::error!("Failed to aggregate: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    pub fn set_metric(&mut self, metric: MetricKind) {
        self.selection.set_metric(metric);
        self.recompute();
    }

    pub fn set_disease(&mut self, disease: Option<String>) {
        self.selection.disease = disease;
        self.recompute();
    }

    pub fn set_region(&mut self, region: Option<String>) {
        self.selection.region = region;
        self.recompute();
    }

    pub fn set_year(&mut self, year: Option<Year>) {
        self.selection.year = year;
        self.recompute();
    }

    /// Toggle one line-chart option under the regions/demographics rule.
    pub fn toggle_line(&mut self, option: &str) {
        self.selection.lines = toggle_option(&self.selection.lines, option);
        self.recompute();
    }
}
