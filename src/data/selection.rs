//! Multi-select state for the demographic line chart.
//!
//! The line chart shows either the four U.S. regions or any set of
//! demographic subgroups, never both at once.

use super::filter::{
    owned_keys, AggregationFilter, GroupDimension, GroupKeys, MetricKind, GENDERS, RACES, REGIONS,
};

/// The option standing for "all four regions".
pub const REGIONS_OPTION: &str = "U.S. Regions";

/// Every option of the line chart multi-select, in display order.
pub const LINE_OPTIONS: [&str; 7] = [
    GENDERS[0],
    GENDERS[1],
    RACES[1],
    RACES[0],
    RACES[2],
    RACES[3],
    REGIONS_OPTION,
];

fn has_regions(selection: &[String]) -> bool {
    selection.iter().any(|s| s == REGIONS_OPTION)
}

/// Transition from the `current` selection to what the user `requested`.
///
/// Picking the regions option clears everything else; picking another option
/// while the regions option is active drops the regions option.
pub fn apply_selection(current: &[String], requested: &[String]) -> Vec<String> {
    if has_regions(requested) && !has_regions(current) {
        return vec![REGIONS_OPTION.to_string()];
    }

    let picks_other = requested.iter().any(|s| s != REGIONS_OPTION);
    let keep_regions = !has_regions(current) || !picks_other;
    let mut next: Vec<String> = Vec::with_capacity(requested.len());
    for opt in requested {
        if (keep_regions || opt != REGIONS_OPTION) && !next.contains(opt) {
            next.push(opt.clone());
        }
    }
    next
}

/// Whether `option` can be picked given the `current` selection.
pub fn is_option_enabled(current: &[String], option: &str) -> bool {
    if option == REGIONS_OPTION {
        current.iter().all(|s| s == REGIONS_OPTION)
    } else {
        !has_regions(current)
    }
}

/// Toggle one option and run the result through [`apply_selection`].
pub fn toggle_option(current: &[String], option: &str) -> Vec<String> {
    let requested: Vec<String> = if current.iter().any(|s| s == option) {
        current.iter().filter(|s| *s != option).cloned().collect()
    } else {
        current
            .iter()
            .cloned()
            .chain(std::iter::once(option.to_string()))
            .collect()
    };
    apply_selection(current, &requested)
}

/// The aggregation feeding the line chart, or `None` when nothing is selected.
pub fn line_filter(
    selection: &[String],
    metric: MetricKind,
    disease: Option<&str>,
) -> Option<AggregationFilter> {
    if selection.is_empty() {
        return None;
    }

    let mut filter = AggregationFilter::new(metric);
    filter.disease = disease.map(str::to_string);

    let filter = if has_regions(selection) {
        filter.grouped_by(GroupDimension::Region, GroupKeys::Fixed(owned_keys(&REGIONS)))
    } else {
        filter.grouped_by(
            GroupDimension::Stratification,
            GroupKeys::Fixed(selection.to_vec()),
        )
    };
    Some(filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sel(items: &[&str]) -> Vec<String> {
        owned_keys(items)
    }

    #[test]
    fn regions_option_clears_others() {
        let next = apply_selection(&sel(&["Male", "Female"]), &sel(&["Male", "Female", REGIONS_OPTION]));
        assert_eq!(next, sel(&[REGIONS_OPTION]));
        let next = apply_selection(&sel(&["Male", "Female"]), &sel(&[REGIONS_OPTION]));
        assert_eq!(next, sel(&[REGIONS_OPTION]));
    }

    #[test]
    fn picking_a_demographic_drops_regions_option() {
        let next = apply_selection(&sel(&[REGIONS_OPTION]), &sel(&[REGIONS_OPTION, "Male"]));
        assert_eq!(next, sel(&["Male"]));
    }

    #[test]
    fn reselecting_regions_option_keeps_it() {
        let current = sel(&[REGIONS_OPTION]);
        assert_eq!(apply_selection(&current, &current), current);
        let doubled = sel(&[REGIONS_OPTION, REGIONS_OPTION]);
        assert_eq!(apply_selection(&current, &doubled), current);
    }

    #[test]
    fn ordinary_changes_pass_through() {
        let next = apply_selection(&sel(&["Male"]), &sel(&["Male", "Hispanic", "Male"]));
        assert_eq!(next, sel(&["Male", "Hispanic"]));
        assert!(apply_selection(&sel(&[REGIONS_OPTION]), &[]).is_empty());
    }

    #[test]
    fn disabled_options_follow_current_selection() {
        assert!(!is_option_enabled(&sel(&["Male"]), REGIONS_OPTION));
        assert!(is_option_enabled(&sel(&["Male"]), "Female"));
        assert!(!is_option_enabled(&sel(&[REGIONS_OPTION]), "Female"));
        assert!(is_option_enabled(&[], REGIONS_OPTION));
    }

    #[test]
    fn toggle_round_trip() {
        let s = toggle_option(&[], "Male");
        let s = toggle_option(&s, "Female");
        assert_eq!(s, sel(&["Male", "Female"]));
        let s = toggle_option(&s, REGIONS_OPTION);
        assert_eq!(s, sel(&[REGIONS_OPTION]));
        let s = toggle_option(&s, REGIONS_OPTION);
        assert!(s.is_empty());
    }

    #[test]
    fn line_filter_picks_dimension() {
        assert!(line_filter(&[], MetricKind::Prevalence, None).is_none());

        let f = line_filter(&sel(&[REGIONS_OPTION]), MetricKind::Prevalence, None).unwrap();
        assert_eq!(f.group_by, Some(GroupDimension::Region));
        assert_eq!(f.keys, GroupKeys::Fixed(owned_keys(&REGIONS)));

        let f = line_filter(&sel(&["Hispanic"]), MetricKind::MortalityRate, Some("Asthma (Mortality Rate)")).unwrap();
        assert_eq!(f.group_by, Some(GroupDimension::Stratification));
        assert_eq!(f.disease.as_deref(), Some("Asthma (Mortality Rate)"));
    }
}
