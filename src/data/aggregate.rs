//! The aggregation engine: filter → partition → per-year means.
//!
//! Every chart in the dashboard is fed by [`aggregate`] with a different
//! [`AggregationFilter`]; the helpers below reshape its output for the
//! stacked and normalised charts and build the treemap hierarchy.

use std::collections::{BTreeMap, HashMap};

use crate::error::{Error, Result};

use super::filter::{
    filter_records, AggregationFilter, GroupDimension, GroupKeys, MetricKind, REGIONS,
};
use super::model::{AggregatedRow, AggregatedTable, Record, Year};

// ---------------------------------------------------------------------------
// Running mean
// ---------------------------------------------------------------------------

/// Sum and count of the finite values seen so far.
#[derive(Debug, Clone, Copy, Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn push(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        self.sum += value;
        self.count += 1;
    }

    /// `NaN` when nothing was pushed; an empty group is missing data, not zero.
    fn value(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.sum / self.count as f64
        }
    }
}

// ---------------------------------------------------------------------------
// aggregate
// ---------------------------------------------------------------------------

/// Group the records selected by `filter` by year and group key and average
/// their values.
///
/// The result has one row per distinct year of the filtered set, ascending,
/// and every row carries every key (`NaN` where no value exists).
pub fn aggregate(records: &[Record], filter: &AggregationFilter) -> Result<AggregatedTable> {
    let dimension = filter
        .group_by
        .ok_or_else(|| Error::InvalidFilter("no group dimension set".into()))?;

    let fixed_keys = match &filter.keys {
        GroupKeys::Fixed(keys) => {
            let keys = dedup(keys);
            check_key_family(dimension, &keys)?;
            Some(keys)
        }
        GroupKeys::FromData if dimension.allows_discovery() => None,
        GroupKeys::FromData => {
            return Err(Error::InvalidFilter(format!(
                "{dimension:?} keys must be supplied by the caller"
            )))
        }
    };

    let selected = filter_records(records, filter);

    let mut keys = fixed_keys.clone().unwrap_or_default();
    let mut key_index: HashMap<&str, usize> = HashMap::new();
    if let Some(fixed) = &fixed_keys {
        for (i, k) in fixed.iter().enumerate() {
            key_index.insert(k.as_str(), i);
        }
    }

    // year → per-key running means, indexed like `keys`
    let mut cells: BTreeMap<Year, Vec<Mean>> = BTreeMap::new();

    for rec in &selected {
        let key = dimension.key_of(rec);
        let idx = match key_index.get(key) {
            Some(&i) => Some(i),
            None if fixed_keys.is_none() => {
                keys.push(key.to_string());
                key_index.insert(key, keys.len() - 1);
                Some(keys.len() - 1)
            }
            None => None,
        };

        let row = cells.entry(rec.year.clone()).or_default();
        if let Some(i) = idx {
            if row.len() <= i {
                row.resize(i + 1, Mean::default());
            }
            row[i].push(rec.value);
        }
    }

    let rows = cells
        .into_iter()
        .map(|(year, means)| {
            let values = keys
                .iter()
                .enumerate()
                .map(|(i, k)| {
                    let v = means.get(i).map(Mean::value).unwrap_or(f64::NAN);
                    (k.clone(), v)
                })
                .collect();
            AggregatedRow { year, values }
        })
        .collect();

    Ok(AggregatedTable { keys, rows })
}

fn dedup(keys: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(keys.len());
    for k in keys {
        if !out.contains(k) {
            out.push(k.clone());
        }
    }
    out
}

/// Region labels and demographic labels never share one grouping.
fn check_key_family(dimension: GroupDimension, keys: &[String]) -> Result<()> {
    if dimension != GroupDimension::Stratification {
        return Ok(());
    }
    let regional = keys.iter().filter(|k| REGIONS.contains(&k.as_str())).count();
    if regional > 0 && regional < keys.len() {
        return Err(Error::InvalidFilter(
            "region and demographic keys cannot be mixed".into(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Share normalisation (stacked 100% bars)
// ---------------------------------------------------------------------------

/// Divide each cell by its row's finite total.
///
/// A row whose total is zero, or which has no finite cells, becomes all `NaN`.
pub fn normalize_shares(table: &AggregatedTable) -> AggregatedTable {
    let rows = table
        .rows
        .iter()
        .map(|row| {
            let total: f64 = row.values.values().filter(|v| v.is_finite()).sum();
            let values = row
                .values
                .iter()
                .map(|(k, v)| {
                    let share = if total == 0.0 { f64::NAN } else { v / total };
                    (k.clone(), share)
                })
                .collect();
            AggregatedRow {
                year: row.year.clone(),
                values,
            }
        })
        .collect();

    AggregatedTable {
        keys: table.keys.clone(),
        rows,
    }
}

// ---------------------------------------------------------------------------
// Stacked series (stacked area)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct StackPoint {
    pub year: Year,
    pub lower: f64,
    pub upper: f64,
    /// The underlying cell was `NaN`; draw a gap here.
    pub missing: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StackedSeries {
    pub key: String,
    pub points: Vec<StackPoint>,
}

/// Stack the table's keys on top of each other in key order.
pub fn stack_series(table: &AggregatedTable) -> Vec<StackedSeries> {
    let mut baseline = vec![0.0_f64; table.rows.len()];

    table
        .keys
        .iter()
        .map(|key| {
            let points = table
                .rows
                .iter()
                .zip(baseline.iter_mut())
                .map(|(row, base)| {
                    let v = row.get(key).unwrap_or(f64::NAN);
                    let lower = *base;
                    if v.is_finite() {
                        *base += v;
                    }
                    StackPoint {
                        year: row.year.clone(),
                        lower,
                        upper: *base,
                        missing: !v.is_finite(),
                    }
                })
                .collect();
            StackedSeries {
                key: key.clone(),
                points,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Topic → Region hierarchy (treemap)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RegionLeaf {
    pub region: String,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopicNode {
    pub topic: String,
    pub regions: Vec<RegionLeaf>,
}

impl TopicNode {
    pub fn total(&self) -> f64 {
        self.regions.iter().map(|r| r.mean).sum()
    }
}

/// Mean value per (topic, region) for one metric and year.
///
/// Leaves without a finite mean are omitted, as are topics left empty.
pub fn topic_region_hierarchy(
    records: &[Record],
    metric: MetricKind,
    year: Option<&Year>,
) -> Vec<TopicNode> {
    let mut filter = AggregationFilter::new(metric);
    filter.year = year.cloned();

    let mut topics: Vec<(String, [Mean; REGIONS.len()])> = Vec::new();
    for rec in filter_records(records, &filter) {
        let Some(r) = REGIONS.iter().position(|r| *r == rec.region) else {
            continue;
        };
        let slot = match topics.iter().position(|(t, _)| *t == rec.topic) {
            Some(i) => i,
            None => {
                topics.push((rec.topic.clone(), Default::default()));
                topics.len() - 1
            }
        };
        topics[slot].1[r].push(rec.value);
    }

    let mut nodes: Vec<TopicNode> = topics
        .into_iter()
        .filter_map(|(topic, means)| {
            let mut regions: Vec<RegionLeaf> = REGIONS
                .iter()
                .zip(means.iter())
                .map(|(region, m)| RegionLeaf {
                    region: region.to_string(),
                    mean: m.value(),
                })
                .filter(|leaf| leaf.mean.is_finite())
                .collect();
            if regions.is_empty() {
                return None;
            }
            regions.sort_by(|a, b| b.mean.total_cmp(&a.mean));
            Some(TopicNode { topic, regions })
        })
        .collect();

    nodes.sort_by(|a, b| b.total().total_cmp(&a.total()));
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{owned_keys, GENDERS, RACES};

    fn rec(year: &str, strat: &str, value: f64) -> Record {
        Record {
            year: Year::from(year),
            location: "Ohio".into(),
            region: "Midwest".into(),
            question: "Current asthma prevalence among adults aged >= 18 years".into(),
            stratification: strat.into(),
            value,
            data_type: "Crude Prevalence".into(),
            topic: "Asthma".into(),
        }
    }

    fn by_gender() -> AggregationFilter {
        AggregationFilter::new(MetricKind::Prevalence)
            .grouped_by(GroupDimension::Stratification, GroupKeys::Fixed(owned_keys(&GENDERS)))
    }

    #[test]
    fn mean_of_matching_records() {
        let records = vec![rec("2015", "Male", 10.0), rec("2015", "Male", 20.0)];
        let table = aggregate(&records, &by_gender()).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].year.as_str(), "2015");
        assert_eq!(table.rows[0].get("Male"), Some(15.0));
    }

    #[test]
    fn missing_group_is_nan_not_zero() {
        let records = vec![rec("2015", "Male", 10.0)];
        let table = aggregate(&records, &by_gender()).unwrap();
        let female = table.rows[0].get("Female").unwrap();
        assert!(female.is_nan());
    }

    #[test]
    fn nan_values_are_excluded_from_means() {
        let records = vec![rec("2015", "Male", 10.0), rec("2015", "Male", f64::NAN)];
        let table = aggregate(&records, &by_gender()).unwrap();
        assert_eq!(table.rows[0].get("Male"), Some(10.0));
    }

    #[test]
    fn infinite_values_are_excluded_from_means_and_shares() {
        let records = vec![
            rec("2015", "Male", 10.0),
            rec("2015", "Male", f64::INFINITY),
            rec("2015", "Female", 30.0),
            rec("2015", "Female", f64::NEG_INFINITY),
        ];
        let table = aggregate(&records, &by_gender()).unwrap();
        assert_eq!(table.rows[0].get("Male"), Some(10.0));
        assert_eq!(table.rows[0].get("Female"), Some(30.0));

        let shares = normalize_shares(&table);
        assert_eq!(shares.rows[0].get("Male"), Some(0.25));
        assert_eq!(shares.rows[0].get("Female"), Some(0.75));
    }

    #[test]
    fn one_row_per_year_ascending_with_uniform_keys() {
        let records = vec![
            rec("2019", "Male", 1.0),
            rec("2011", "Female", 2.0),
            rec("2015", "Hispanic", 3.0),
            rec("2011", "Male", 4.0),
        ];
        let table = aggregate(&records, &by_gender()).unwrap();
        let years: Vec<&str> = table.years().into_iter().map(Year::as_str).collect();
        // 2015 only has an unknown key but is still a year of the filtered set
        assert_eq!(years, vec!["2011", "2015", "2019"]);
        for row in &table.rows {
            let keys: Vec<&String> = row.values.keys().collect();
            assert_eq!(keys, vec!["Female", "Male"]);
        }
        assert!(table.rows[1].get("Male").unwrap().is_nan());
    }

    #[test]
    fn aggregate_is_idempotent() {
        let records = vec![rec("2012", "Male", 3.0), rec("2013", "Female", f64::NAN)];
        let a = aggregate(&records, &by_gender()).unwrap();
        let b = aggregate(&records, &by_gender()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn missing_dimension_is_invalid() {
        let err = aggregate(&[], &AggregationFilter::new(MetricKind::Prevalence)).unwrap_err();
        assert!(matches!(err, Error::InvalidFilter(_)));
    }

    #[test]
    fn stratification_keys_cannot_be_discovered() {
        let filter = AggregationFilter::new(MetricKind::Prevalence)
            .grouped_by(GroupDimension::Stratification, GroupKeys::FromData);
        assert!(matches!(aggregate(&[], &filter), Err(Error::InvalidFilter(_))));
    }

    #[test]
    fn mixing_regions_with_demographics_is_invalid() {
        let filter = AggregationFilter::new(MetricKind::Prevalence).grouped_by(
            GroupDimension::Stratification,
            GroupKeys::Fixed(vec!["Male".into(), "South".into()]),
        );
        assert!(matches!(aggregate(&[], &filter), Err(Error::InvalidFilter(_))));
    }

    #[test]
    fn no_surviving_records_gives_empty_rows() {
        let records = vec![rec("2015", "Male", 10.0)];
        let filter = AggregationFilter::new(MetricKind::MortalityRate)
            .grouped_by(GroupDimension::Stratification, GroupKeys::Fixed(owned_keys(&GENDERS)));
        let table = aggregate(&records, &filter).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.keys, owned_keys(&GENDERS));
    }

    #[test]
    fn question_keys_are_discovered_in_first_appearance_order() {
        let mut a = rec("2015", "Male", 1.0);
        a.question = "Stroke mortality among all people, underlying cause".into();
        let mut b = rec("2015", "Male", 2.0);
        b.question = "Asthma mortality rate".into();
        let filter = AggregationFilter::new(MetricKind::MortalityRate)
            .grouped_by(GroupDimension::Question, GroupKeys::FromData);
        let table = aggregate(&[a, b], &filter).unwrap();
        assert_eq!(
            table.keys,
            vec![
                "Stroke mortality among all people, underlying cause".to_string(),
                "Asthma mortality rate".to_string()
            ]
        );
    }

    #[test]
    fn shares_sum_to_one() {
        let records = vec![
            rec("2015", "Black, non-Hispanic", 30.0),
            rec("2015", "White, non-Hispanic", 10.0),
            rec("2015", "Hispanic", 10.0),
        ];
        let filter = AggregationFilter::new(MetricKind::Prevalence)
            .grouped_by(GroupDimension::Stratification, GroupKeys::Fixed(owned_keys(&RACES)));
        let shares = normalize_shares(&aggregate(&records, &filter).unwrap());
        let row = &shares.rows[0];
        assert_eq!(row.get("Black, non-Hispanic"), Some(0.6));
        assert!(row.get("Other, non-Hispanic").unwrap().is_nan());
        let total: f64 = row.values.values().filter(|v| v.is_finite()).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_total_normalises_to_nan() {
        let records = vec![rec("2015", "Male", 0.0), rec("2015", "Female", 0.0)];
        let shares = normalize_shares(&aggregate(&records, &by_gender()).unwrap());
        assert!(shares.rows[0].values.values().all(|v| v.is_nan()));
    }

    #[test]
    fn stacked_series_accumulate_and_mark_gaps() {
        let records = vec![
            rec("2015", "Male", 2.0),
            rec("2015", "Female", 3.0),
            rec("2016", "Female", 4.0),
        ];
        let series = stack_series(&aggregate(&records, &by_gender()).unwrap());
        assert_eq!(series[0].key, "Male");
        assert_eq!(series[1].points[0].lower, 2.0);
        assert_eq!(series[1].points[0].upper, 5.0);
        assert!(series[0].points[1].missing);
        assert_eq!(series[1].points[1].lower, 0.0);
        assert_eq!(series[1].points[1].upper, 4.0);
    }

    #[test]
    fn treemap_omits_empty_leaves_and_sorts_topics() {
        let mut records = vec![rec("2015", "Male", 2.0), rec("2015", "Male", f64::NAN)];
        records[1].region = "West".into();
        let mut diabetes = rec("2015", "Male", 9.0);
        diabetes.topic = "Diabetes".into();
        diabetes.region = "South".into();
        records.push(diabetes);
        let mut other_year = rec("2016", "Male", 100.0);
        other_year.topic = "Other".into();
        records.push(other_year);

        let nodes = topic_region_hierarchy(&records, MetricKind::Prevalence, Some(&Year::from("2015")));
        let topics: Vec<&str> = nodes.iter().map(|n| n.topic.as_str()).collect();
        assert_eq!(topics, vec!["Diabetes", "Asthma"]);
        assert_eq!(nodes[1].regions.len(), 1);
        assert_eq!(nodes[1].regions[0].region, "Midwest");
    }
}
