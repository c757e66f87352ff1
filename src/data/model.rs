use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::filter::MetricKind;

// ---------------------------------------------------------------------------
// Year – ordinal key of every chart x-axis
// ---------------------------------------------------------------------------

/// A reporting year kept in its source string form (`"2014"`).
///
/// Equality is plain string equality; ordering is numeric so that `"9"`
/// sorts before `"10"`. Non-numeric years sort after all numeric ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Year(String);

impl Year {
    pub fn new(s: impl Into<String>) -> Self {
        let s: String = s.into();
        Year(s.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value, if the year parses as an integer.
    pub fn as_i64(&self) -> Option<i64> {
        self.0.parse().ok()
    }

    /// x coordinate for plotting; `None` for non-numeric years.
    pub fn as_f64(&self) -> Option<f64> {
        self.as_i64().map(|y| y as f64)
    }
}

// -- Manual Ord so Year can key a BTreeMap in chart order --

impl PartialOrd for Year {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Year {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        match (self.as_i64(), other.as_i64()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Year {
    fn from(s: &str) -> Self {
        Year::new(s)
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the source table
// ---------------------------------------------------------------------------

/// A single indicator observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub year: Year,
    pub location: String,
    /// One of Midwest / Northeast / South / West in well-formed data.
    pub region: String,
    /// Indicator description; foreign key into the canonical disease table.
    pub question: String,
    /// Demographic subgroup label, e.g. `"Male"` or `"Hispanic"`.
    pub stratification: String,
    /// Rate or percentage. `NaN` when the source cell was empty or non-numeric.
    pub value: f64,
    pub data_type: String,
    /// Disease category used for treemap grouping.
    pub topic: String,
}

impl Record {
    /// Whether the question measures mortality rather than prevalence.
    pub fn is_mortality(&self) -> bool {
        MetricKind::of_question(&self.question) == MetricKind::MortalityRate
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table with pre-computed unique-value indices.
///
/// Built once at load time and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<Record>,
    pub years: BTreeSet<Year>,
    pub regions: BTreeSet<String>,
}

impl Dataset {
    /// Build the drop-down indices from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut years = BTreeSet::new();
        let mut regions = BTreeSet::new();

        for rec in &records {
            years.insert(rec.year.clone());
            if !rec.region.is_empty() {
                regions.insert(rec.region.clone());
            }
        }

        Dataset {
            records,
            years,
            regions,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First and last year, if any records exist.
    pub fn year_span(&self) -> Option<(&Year, &Year)> {
        Some((self.years.first()?, self.years.last()?))
    }
}

// ---------------------------------------------------------------------------
// AggregatedRow / AggregatedTable – chart-ready output
// ---------------------------------------------------------------------------

/// One output row: the mean value per group key for a single year.
#[derive(Debug, Clone)]
pub struct AggregatedRow {
    pub year: Year,
    /// Every key of the owning table is present; missing groups hold `NaN`.
    pub values: BTreeMap<String, f64>,
}

impl AggregatedRow {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }
}

/// Rows sorted by year plus the ordered list of group keys.
///
/// `keys` preserves the caller's order and drives legend and colour assignment.
#[derive(Debug, Clone, Default)]
pub struct AggregatedTable {
    pub keys: Vec<String>,
    pub rows: Vec<AggregatedRow>,
}

impl AggregatedTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn years(&self) -> Vec<&Year> {
        self.rows.iter().map(|r| &r.year).collect()
    }

    /// `(year, value)` pairs for one key, in row order.
    pub fn series(&self, key: &str) -> Vec<(&Year, f64)> {
        self.rows
            .iter()
            .map(|r| (&r.year, r.get(key).unwrap_or(f64::NAN)))
            .collect()
    }
}

// NaN != NaN, so compare cells by bit pattern to keep equality reflexive.
impl PartialEq for AggregatedRow {
    fn eq(&self, other: &Self) -> bool {
        self.year == other.year
            && self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(other.values.iter())
                .all(|((ka, va), (kb, vb))| ka == kb && va.to_bits() == vb.to_bits())
    }
}

impl PartialEq for AggregatedTable {
    fn eq(&self, other: &Self) -> bool {
        self.keys == other.keys && self.rows == other.rows
    }
}
