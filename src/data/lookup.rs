//! Canonical disease lookup: drop-down label → source Question string.

use super::filter::MetricKind;

/// One canonical disease/metric pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Disease {
    /// Human-facing label, e.g. `"Stroke (Mortality Rate)"`.
    pub label: &'static str,
    /// Exact Question text used in the source records.
    pub question: &'static str,
    pub topic: &'static str,
    pub metric: MetricKind,
}

const fn prevalence(label: &'static str, question: &'static str, topic: &'static str) -> Disease {
    Disease {
        label,
        question,
        topic,
        metric: MetricKind::Prevalence,
    }
}

const fn mortality(label: &'static str, question: &'static str, topic: &'static str) -> Disease {
    Disease {
        label,
        question,
        topic,
        metric: MetricKind::MortalityRate,
    }
}

/// Six diseases, each with a prevalence and a mortality indicator.
pub static DISEASES: [Disease; 12] = [
    prevalence(
        "Asthma (Prevalence)",
        "Current asthma prevalence among adults aged >= 18 years",
        "Asthma",
    ),
    mortality("Asthma (Mortality Rate)", "Asthma mortality rate", "Asthma"),
    prevalence(
        "Diabetes (Prevalence)",
        "Prevalence of diagnosed diabetes among adults aged >= 18 years",
        "Diabetes",
    ),
    mortality(
        "Diabetes (Mortality Rate)",
        "Diabetes mortality among all people, underlying or contributing cause",
        "Diabetes",
    ),
    prevalence(
        "COPD (Prevalence)",
        "Prevalence of chronic obstructive pulmonary disease among adults aged >= 18 years",
        "Chronic Obstructive Pulmonary Disease",
    ),
    mortality(
        "COPD (Mortality Rate)",
        "Chronic obstructive pulmonary disease mortality among adults aged >= 45 years",
        "Chronic Obstructive Pulmonary Disease",
    ),
    prevalence(
        "Stroke (Prevalence)",
        "Prevalence of stroke among adults aged >= 18 years",
        "Cardiovascular Disease",
    ),
    mortality(
        "Stroke (Mortality Rate)",
        "Stroke mortality among all people, underlying cause",
        "Cardiovascular Disease",
    ),
    prevalence(
        "Heart Disease (Prevalence)",
        "Prevalence of coronary heart disease among adults aged >= 18 years",
        "Cardiovascular Disease",
    ),
    mortality(
        "Heart Disease (Mortality Rate)",
        "Coronary heart disease mortality among all people, underlying cause",
        "Cardiovascular Disease",
    ),
    prevalence(
        "Kidney Disease (Prevalence)",
        "Prevalence of chronic kidney disease among adults aged >= 18 years",
        "Chronic Kidney Disease",
    ),
    mortality(
        "Kidney Disease (Mortality Rate)",
        "Chronic kidney disease mortality among all people, underlying or contributing cause",
        "Chronic Kidney Disease",
    ),
];

/// Resolve a selection label to its canonical Question string.
///
/// Unknown labels yield `None`, which callers treat as "no question filter".
pub fn resolve_question(label: &str) -> Option<&'static str> {
    DISEASES
        .iter()
        .find(|d| d.label == label)
        .map(|d| d.question)
}

/// Labels belonging to one metric, in table order.
pub fn labels_for(metric: MetricKind) -> impl Iterator<Item = &'static str> {
    DISEASES
        .iter()
        .filter(move |d| d.metric == metric)
        .map(|d| d.label)
}

/// Canonical questions belonging to one metric, in table order.
pub fn questions_for(metric: MetricKind) -> Vec<String> {
    DISEASES
        .iter()
        .filter(|d| d.metric == metric)
        .map(|d| d.question.to_string())
        .collect()
}
