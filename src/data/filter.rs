use std::fmt;

use serde::{Deserialize, Serialize};

use super::lookup::resolve_question;
use super::model::{Record, Year};

// ---------------------------------------------------------------------------
// Subgroup families
// ---------------------------------------------------------------------------

pub const GENDERS: [&str; 2] = ["Male", "Female"];

pub const RACES: [&str; 4] = [
    "Black, non-Hispanic",
    "White, non-Hispanic",
    "Hispanic",
    "Other, non-Hispanic",
];

pub const REGIONS: [&str; 4] = ["Midwest", "Northeast", "South", "West"];

pub fn owned_keys(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Metric kind
// ---------------------------------------------------------------------------

/// Which family of indicators a chart shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MetricKind {
    #[default]
    Prevalence,
    #[serde(alias = "Mortality", alias = "Mortality Rate")]
    MortalityRate,
}

impl MetricKind {
    pub const ALL: [MetricKind; 2] = [MetricKind::Prevalence, MetricKind::MortalityRate];

    /// Classify a Question: anything mentioning "mortality" is a mortality rate.
    pub fn of_question(question: &str) -> Self {
        if question.to_lowercase().contains("mortality") {
            MetricKind::MortalityRate
        } else {
            MetricKind::Prevalence
        }
    }

    pub fn matches(self, record: &Record) -> bool {
        record.is_mortality() == (self == MetricKind::MortalityRate)
    }

    /// Axis label for charts of this metric.
    pub fn axis_label(self) -> &'static str {
        match self {
            MetricKind::Prevalence => "Prevalence (%)",
            MetricKind::MortalityRate => "Rate",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::Prevalence => write!(f, "Prevalence"),
            MetricKind::MortalityRate => write!(f, "Mortality Rate"),
        }
    }
}

// ---------------------------------------------------------------------------
// Group dimension and keys
// ---------------------------------------------------------------------------

/// The record field that partitions filtered records into series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupDimension {
    Stratification,
    Region,
    Topic,
    Question,
}

impl GroupDimension {
    pub fn key_of(self, record: &Record) -> &str {
        match self {
            GroupDimension::Stratification => &record.stratification,
            GroupDimension::Region => &record.region,
            GroupDimension::Topic => &record.topic,
            GroupDimension::Question => &record.question,
        }
    }

    /// Only the open-ended dimensions may take their keys from the data.
    pub fn allows_discovery(self) -> bool {
        matches!(self, GroupDimension::Topic | GroupDimension::Question)
    }
}

/// Where the group keys of an aggregation come from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GroupKeys {
    /// Caller-supplied enumeration; records with other keys are dropped.
    Fixed(Vec<String>),
    /// Keys discovered from the filtered records in first-appearance order.
    #[default]
    FromData,
}

// ---------------------------------------------------------------------------
// Aggregation filter
// ---------------------------------------------------------------------------

/// Everything `aggregate` needs to know about one chart's slice of the data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AggregationFilter {
    pub metric: MetricKind,
    /// Drop-down label, resolved through the canonical lookup.
    pub disease: Option<String>,
    pub group_by: Option<GroupDimension>,
    pub keys: GroupKeys,
    pub region: Option<String>,
    pub year: Option<Year>,
}

impl AggregationFilter {
    pub fn new(metric: MetricKind) -> Self {
        AggregationFilter {
            metric,
            ..Default::default()
        }
    }

    pub fn with_disease(mut self, label: impl Into<String>) -> Self {
        self.disease = Some(label.into());
        self
    }

    pub fn grouped_by(mut self, dimension: GroupDimension, keys: GroupKeys) -> Self {
        self.group_by = Some(dimension);
        self.keys = keys;
        self
    }

    pub fn in_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn in_year(mut self, year: impl Into<Year>) -> Self {
        self.year = Some(year.into());
        self
    }

    /// Canonical Question for the disease label, if both exist.
    pub fn resolved_question(&self) -> Option<&'static str> {
        let label = self.disease.as_deref()?;
        let question = resolve_question(label);
        if question.is_none() {
            log::warn!("Unknown disease label {label:?}; not filtering by question");
        }
        question
    }

    /// Whether a record survives the filter step. `question` is the
    /// pre-resolved disease filter so the lookup runs once per call.
    pub fn matches(&self, record: &Record, question: Option<&str>) -> bool {
        if !self.metric.matches(record) {
            return false;
        }
        if let Some(q) = question {
            if record.question != q {
                return false;
            }
        }
        if let Some(region) = &self.region {
            if &record.region != region {
                return false;
            }
        }
        if let Some(year) = &self.year {
            if &record.year != year {
                return false;
            }
        }
        true
    }
}

/// Records that pass every active predicate of `filter`.
pub fn filter_records<'a>(records: &'a [Record], filter: &AggregationFilter) -> Vec<&'a Record> {
    let question = filter.resolved_question();
    records
        .iter()
        .filter(|rec| filter.matches(rec, question))
        .collect()
}
