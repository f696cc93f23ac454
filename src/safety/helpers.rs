use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::Drug;

static RE_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z0-9]+").unwrap());
static RE_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w\w+\b").unwrap());

/// Lowercase, with `-` and `_` folded to spaces (so "anti-inflammatory" matches "anti inflammatory").
pub fn normalize_category(category: &str) -> String {
    category.to_lowercase().replace(['-', '_'], " ")
}

pub fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Distinct lowercase alphanumeric words.
pub fn word_set(text: &str) -> BTreeSet<String> {
    let lower = text.to_lowercase();
    RE_WORD
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Lowercase tokens of two or more word characters, in order, repeats kept.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    RE_TOKEN
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Lowercase name + generic name + class + category.
pub fn drug_identity_text(drug: &Drug) -> String {
    [
        Some(drug.name.as_str()),
        drug.generic_name.as_deref(),
        drug.therapeutic_class.as_deref(),
        Some(drug.category.as_str()),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase()
}

/// Lowercase class labels of a drug: therapeutic class, category, generic name.
pub fn drug_class_labels(drug: &Drug) -> Vec<String> {
    [
        drug.therapeutic_class.as_deref(),
        Some(drug.category.as_str()),
        drug.generic_name.as_deref(),
    ]
    .into_iter()
    .flatten()
    .map(|s| s.trim().to_lowercase())
    .filter(|s| !s.is_empty())
    .collect()
}

pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
