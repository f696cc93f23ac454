//! Keyword/semantic scorer: related-term expansion with boosted category,
//! name and class matches.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::models::Drug;
use crate::safety::helpers::normalize_category;

use super::reference::expand_semantic;
use super::{CandidateScorer, ScoredCandidate, ScorerError, ScoringContext, ScoringMethod};

const CATEGORY_BOOST: f64 = 3.0;
const NAME_BOOST: f64 = 1.5;
const CLASS_BOOST: f64 = 1.3;

/// Shorter condition words are ignored for the boost checks; they match almost anything.
const MIN_BOOST_WORD_LEN: usize = 3;

pub struct SemanticScorer;

impl CandidateScorer for SemanticScorer {
    fn name(&self) -> &'static str {
        "semantic_keyword"
    }

    fn score(&self, ctx: &ScoringContext<'_>) -> Result<Vec<ScoredCandidate>, ScorerError> {
        if ctx.catalog.is_empty() {
            return Err(ScorerError::EmptyCatalog);
        }
        let expanded = expand_semantic(ctx.condition);
        let condition_words: BTreeSet<&str> = expanded.split_whitespace().collect();
        if condition_words.is_empty() {
            return Ok(Vec::new());
        }

        let mut matches: Vec<ScoredCandidate> = ctx
            .catalog
            .iter()
            .filter_map(|drug| {
                semantic_score(drug, &condition_words).map(|score| ScoredCandidate {
                    drug: drug.clone(),
                    score,
                    method: ScoringMethod::SemanticKeyword,
                    reasoning: format!("Enhanced keyword match for condition: {}", ctx.condition),
                })
            })
            .collect();

        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        matches.truncate(ctx.max_results);
        Ok(matches)
    }
}

/// Overlap share, boosted ×3 / ×1.5 / ×1.3 for category / name / class hits, capped at 1.
fn semantic_score(drug: &Drug, condition_words: &BTreeSet<&str>) -> Option<f64> {
    let category = normalize_category(&drug.category);
    let mut text: Vec<&str> = std::iter::repeat(category.as_str()).take(4).collect();
    text.push(&drug.name);
    text.extend(
        [
            drug.generic_name.as_deref(),
            drug.therapeutic_class.as_deref(),
            drug.dosage_instructions.as_deref(),
        ]
        .into_iter()
        .flatten(),
    );
    let text = text.join(" ").to_lowercase();
    let drug_words: BTreeSet<&str> = text.split_whitespace().collect();

    let overlap = condition_words.intersection(&drug_words).count();
    if overlap == 0 {
        return None;
    }
    let mut score = overlap as f64 / condition_words.len() as f64;

    let boost_words: Vec<&str> = condition_words
        .iter()
        .copied()
        .filter(|w| w.len() >= MIN_BOOST_WORD_LEN)
        .collect();
    let hits = |field: &str| {
        let field = field.to_lowercase();
        boost_words.iter().any(|w| field.contains(w))
    };

    if hits(&drug.category) {
        score *= CATEGORY_BOOST;
    }
    if hits(&drug.name) {
        score *= NAME_BOOST;
    }
    if drug.therapeutic_class.as_deref().is_some_and(hits) {
        score *= CLASS_BOOST;
    }
    Some(score.min(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::models::enums::Gender;
    use crate::models::Patient;
    use crate::safety::SafetyScorer;
    use crate::store::MemoryStore;

    fn drug(name: &str, category: &str, class: &str) -> Drug {
        let mut d = Drug::new(name, category);
        d.therapeutic_class = Some(class.into());
        d
    }

    fn run(catalog: &[Drug], condition: &str) -> Vec<ScoredCandidate> {
        let store = MemoryStore::new();
        let patient = Patient::new("A", "B", Gender::Male);
        let config = EngineConfig::deterministic();
        let safety = SafetyScorer::for_today();
        let ctx = ScoringContext {
            patient: &patient,
            condition,
            catalog,
            rules: &[],
            store: &store,
            config: &config,
            safety: &safety,
            max_results: 5,
        };
        SemanticScorer.score(&ctx).unwrap()
    }

    #[test]
    fn category_match_outranks_incidental_overlap() {
        let catalog = vec![
            drug("Metformin", "antidiabetic", "biguanide"),
            drug("Glucagon", "hormone", "glucose elevating agent"),
        ];
        let results = run(&catalog, "type 2 diabetes");
        assert_eq!(results[0].drug.name, "Metformin");
        assert!(results.iter().all(|r| r.score <= 1.0));
        assert_eq!(
            results[0].reasoning,
            "Enhanced keyword match for condition: type 2 diabetes"
        );
    }

    #[test]
    fn no_overlap_is_skipped() {
        let catalog = vec![drug("Cetirizine", "antihistamine", "antihistamine")];
        assert!(run(&catalog, "diabetes").is_empty());
    }

    #[test]
    fn boosts_compound_and_cap() {
        let words: BTreeSet<&str> = ["analgesic", "ibuprofen"].into_iter().collect();
        let d = drug("Ibuprofen", "analgesic", "analgesic");
        assert_eq!(semantic_score(&d, &words), Some(1.0));
    }
}
