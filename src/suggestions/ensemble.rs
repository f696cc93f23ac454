//! Merge per-strategy candidates into one ranked list.
//!
//! Order of operations: weighted sum per drug, agreement bonus, jitter,
//! contextual boost from the patient's chronic conditions, then one
//! diversity pass over the score-sorted list followed by a re-sort.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::models::{Drug, Patient};

use super::jitter::JitterSource;
use super::reference::{contextual_boost_factor, CONTEXTUAL_BOOSTS};
use super::weights::MethodWeights;
use super::{ScoredCandidate, ScoringMethod};

pub const AGREEMENT_BONUS_PER_METHOD: f64 = 0.02;
pub const MAX_AGREEMENT_BONUS: f64 = 0.1;
pub const NEW_CLASS_FACTOR: f64 = 1.05;
pub const REPEATED_CLASS_FACTOR: f64 = 0.85;
pub const FALLBACK_SCORE: f64 = 0.1;

/// A merged candidate. `score` is unclamped.
#[derive(Debug, Clone)]
pub struct RankedCandidate {
    pub drug: Drug,
    pub score: f64,
    pub methods: Vec<ScoringMethod>,
    pub reasoning: String,
}

struct Merged {
    drug: Drug,
    weighted: Vec<(ScoringMethod, f64)>,
    reasoning: Vec<String>,
}

/// Merge, adjust and sort. Returns every merged drug; callers truncate.
pub fn rank(
    candidates: Vec<ScoredCandidate>,
    weights: &MethodWeights,
    patient: &Patient,
    jitter: &mut dyn JitterSource,
) -> Vec<RankedCandidate> {
    // First-seen order keeps jitter draws and tie order reproducible
    let mut merged: Vec<Merged> = Vec::new();
    let mut index: HashMap<Uuid, usize> = HashMap::new();
    for candidate in candidates {
        let weighted = candidate.score * weights.weight_for(candidate.method);
        let slot = *index.entry(candidate.drug.id).or_insert_with(|| {
            merged.push(Merged {
                drug: candidate.drug.clone(),
                weighted: Vec::new(),
                reasoning: Vec::new(),
            });
            merged.len() - 1
        });
        let entry = &mut merged[slot];
        match entry.weighted.iter_mut().find(|(m, _)| *m == candidate.method) {
            Some(existing) => existing.1 = weighted,
            None => entry.weighted.push((candidate.method, weighted)),
        }
        if !entry.reasoning.contains(&candidate.reasoning) {
            entry.reasoning.push(candidate.reasoning);
        }
    }

    let mut ranked: Vec<RankedCandidate> = merged
        .into_iter()
        .map(|m| {
            let total: f64 = m.weighted.iter().map(|(_, s)| s).sum();
            let bonus = (m.weighted.len() as f64 * AGREEMENT_BONUS_PER_METHOD).min(MAX_AGREEMENT_BONUS);
            RankedCandidate {
                score: (total + bonus) * jitter.next_factor(),
                methods: m.weighted.iter().map(|(method, _)| *method).collect(),
                reasoning: m.reasoning.join(" | "),
                drug: m.drug,
            }
        })
        .collect();

    apply_contextual_boost(&mut ranked, patient);
    sort_by_score(&mut ranked);
    apply_diversity(&mut ranked);
    ranked
}

/// Boost drugs that treat a chronic condition named in the patient's history.
/// Only the first matching condition counts per drug.
pub fn apply_contextual_boost(ranked: &mut [RankedCandidate], patient: &Patient) {
    let Some(history) = patient
        .medical_history
        .as_deref()
        .map(str::to_lowercase)
        .filter(|h| !h.trim().is_empty())
    else {
        return;
    };

    for candidate in ranked.iter_mut() {
        let drug = &candidate.drug;
        let drug_text = [
            Some(drug.name.as_str()),
            drug.generic_name.as_deref(),
            drug.therapeutic_class.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

        let matched = CONTEXTUAL_BOOSTS.iter().find(|(condition, terms)| {
            history.contains(condition) && terms.iter().any(|t| drug_text.contains(t))
        });
        if let Some((condition, terms)) = matched {
            candidate.score *= contextual_boost_factor(terms.len());
            candidate
                .reasoning
                .push_str(&format!(" | Contextual boost: Perfect match for {condition}"));
        }
    }
}

/// Therapeutic class, else category, else "unknown".
fn diversity_key(drug: &Drug) -> String {
    [drug.therapeutic_class.as_deref(), Some(drug.category.as_str())]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

/// One pass over a score-sorted list: first drug of each class ×1.05, repeats ×0.85; then re-sort.
pub fn apply_diversity(ranked: &mut [RankedCandidate]) {
    if ranked.len() <= 1 {
        return;
    }
    let mut seen: HashSet<String> = HashSet::new();
    for candidate in ranked.iter_mut() {
        let key = diversity_key(&candidate.drug);
        if seen.contains(&key) {
            candidate.score *= REPEATED_CLASS_FACTOR;
            candidate
                .reasoning
                .push_str(&format!(" | Similar to previous suggestion ({key})"));
        } else {
            candidate.score *= NEW_CLASS_FACTOR;
            candidate
                .reasoning
                .push_str(&format!(" | Diverse therapeutic approach ({key})"));
            seen.insert(key);
        }
    }
    sort_by_score(ranked);
}

fn sort_by_score(ranked: &mut [RankedCandidate]) {
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}

/// Flat low-score list of the safe catalog, used when no strategy produced anything.
pub fn fallback(catalog: &[Drug], condition: &str) -> Vec<RankedCandidate> {
    catalog
        .iter()
        .map(|drug| RankedCandidate {
            drug: drug.clone(),
            score: FALLBACK_SCORE,
            methods: vec![ScoringMethod::Fallback],
            reasoning: format!("Basic suggestion for {condition} - safe for patient allergies"),
        })
        .collect()
}
