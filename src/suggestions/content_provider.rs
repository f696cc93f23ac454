//! Description-similarity scorer: term-frequency cosine between the
//! expanded condition and each drug's weighted description.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use crate::models::Drug;
use crate::safety::helpers::{normalize_category, tokenize};

use super::reference::{condition_reasoning, expand_condition, STOP_WORDS};
use super::{CandidateScorer, ScoredCandidate, ScorerError, ScoringContext, ScoringMethod};

/// Times the category is repeated in a drug's description.
const CATEGORY_REPEAT: usize = 4;

pub struct ContentScorer;

impl CandidateScorer for ContentScorer {
    fn name(&self) -> &'static str {
        "content_based"
    }

    fn score(&self, ctx: &ScoringContext<'_>) -> Result<Vec<ScoredCandidate>, ScorerError> {
        if ctx.catalog.is_empty() {
            return Err(ScorerError::EmptyCatalog);
        }
        let expanded = expand_condition(ctx.condition);

        let similarities = match TermVectors::fit(ctx.catalog.iter().map(weighted_description)) {
            Ok(vectors) => vectors.similarities(&expanded),
            Err(e) => {
                tracing::debug!("vectorization unavailable, using keyword overlap: {e}");
                Vec::new()
            }
        };

        let mut ranked: Vec<(usize, f64)> = similarities
            .into_iter()
            .enumerate()
            .filter(|(_, s)| *s > ctx.config.content_similarity_threshold)
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        ranked.truncate(ctx.max_results);

        if ranked.is_empty() {
            return Ok(keyword_overlap(&expanded, ctx.catalog, ctx.max_results));
        }

        Ok(ranked
            .into_iter()
            .map(|(i, similarity)| {
                let drug = &ctx.catalog[i];
                ScoredCandidate {
                    drug: drug.clone(),
                    score: similarity,
                    method: ScoringMethod::ContentBased,
                    reasoning: condition_reasoning(ctx.condition, drug),
                }
            })
            .collect())
    }
}

/// Category repeated for weight, then name, generic name, class, instructions, side effects.
pub fn weighted_description(drug: &Drug) -> String {
    let category = normalize_category(&drug.category);
    let mut parts: Vec<&str> = std::iter::repeat(category.as_str())
        .take(CATEGORY_REPEAT)
        .collect();
    parts.push(&drug.name);
    parts.extend(
        [
            drug.generic_name.as_deref(),
            drug.therapeutic_class.as_deref(),
            drug.dosage_instructions.as_deref(),
            drug.side_effects.as_deref(),
        ]
        .into_iter()
        .flatten(),
    );
    parts.join(" ")
}

fn terms(text: &str) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .filter(|t| !STOP_WORDS.contains(&t.as_str()))
        .collect()
}

/// Term-frequency vectors over a vocabulary fitted on the documents.
pub struct TermVectors {
    vocabulary: HashMap<String, usize>,
    documents: Vec<Vec<f64>>,
}

impl TermVectors {
    pub fn fit(documents: impl Iterator<Item = String>) -> Result<Self, ScorerError> {
        let tokenized: Vec<Vec<String>> = documents.map(|d| terms(&d)).collect();
        let vocabulary: HashMap<String, usize> = tokenized
            .iter()
            .flatten()
            .cloned()
            .collect::<BTreeSet<String>>()
            .into_iter()
            .enumerate()
            .map(|(i, t)| (t, i))
            .collect();
        if vocabulary.is_empty() {
            return Err(ScorerError::Vectorization("empty vocabulary".into()));
        }
        let documents = tokenized
            .iter()
            .map(|tokens| frequency_vector(tokens, &vocabulary))
            .collect();
        Ok(Self {
            vocabulary,
            documents,
        })
    }

    /// Cosine similarity of `query` against every fitted document, in document order.
    pub fn similarities(&self, query: &str) -> Vec<f64> {
        let query = frequency_vector(&terms(query), &self.vocabulary);
        self.documents
            .iter()
            .map(|doc| cosine_similarity(&query, doc))
            .collect()
    }
}

fn frequency_vector(tokens: &[String], vocabulary: &HashMap<String, usize>) -> Vec<f64> {
    let mut vector = vec![0.0; vocabulary.len()];
    for token in tokens {
        if let Some(&i) = vocabulary.get(token) {
            vector[i] += 1.0;
        }
    }
    vector
}

fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Overlap of whitespace-split words, as a share of the condition's distinct words.
pub fn keyword_overlap(expanded: &str, catalog: &[Drug], max_results: usize) -> Vec<ScoredCandidate> {
    let condition_words: BTreeSet<String> = expanded
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    if condition_words.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<ScoredCandidate> = catalog
        .iter()
        .filter_map(|drug| {
            let text = [
                Some(drug.name.as_str()),
                drug.generic_name.as_deref(),
                Some(drug.category.as_str()),
                drug.therapeutic_class.as_deref(),
                drug.dosage_instructions.as_deref(),
            ]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
            let drug_words: BTreeSet<&str> = text.split_whitespace().collect();
            let overlap = condition_words
                .iter()
                .filter(|w| drug_words.contains(w.as_str()))
                .count();
            (overlap > 0).then(|| ScoredCandidate {
                drug: drug.clone(),
                score: overlap as f64 / condition_words.len() as f64,
                method: ScoringMethod::KeywordMatching,
                reasoning: format!("Keyword match with {overlap} common terms"),
            })
        })
        .collect();

    matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    matches.truncate(max_results);
    matches
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

    fn run(catalog: &[Drug], condition: &str) -> Result<Vec<ScoredCandidate>, ScorerError> {
        let store = MemoryStore::new();
        let patient = Patient::new("A", "B", Gender::Female);
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
        ContentScorer.score(&ctx)
    }

    #[test]
    fn category_weight_dominates_similarity() {
        let catalog = vec![
            drug("Amoxicillin", "antibiotic", "penicillin antibiotic"),
            drug("Paracetamol", "analgesic", "Analgesic"),
        ];
        let results = run(&catalog, "headache").unwrap();
        assert_eq!(results[0].drug.name, "Paracetamol");
        assert_eq!(results[0].method, ScoringMethod::ContentBased);
        assert_eq!(results[0].reasoning, "Recommended for headache relief - analgesic");
        assert!(results.iter().all(|r| r.drug.name != "Amoxicillin"));
    }

    #[test]
    fn unrelated_condition_yields_nothing() {
        let catalog = vec![drug("Paracetamol", "analgesic", "Analgesic")];
        assert!(run(&catalog, "xyzzy").unwrap().is_empty());
    }

    #[test]
    fn empty_catalog_is_an_error() {
        assert!(matches!(run(&[], "headache"), Err(ScorerError::EmptyCatalog)));
    }

    #[test]
    fn weighted_description_repeats_category() {
        let d = drug("Ibuprofen", "anti-inflammatory", "NSAID");
        let text = weighted_description(&d);
        assert!(text.starts_with("anti inflammatory anti inflammatory"));
        assert!(text.ends_with("Ibuprofen NSAID"));
    }

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = vec![1.0, 2.0, 0.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
        assert_eq!(cosine_similarity(&v, &[0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn keyword_overlap_scores_share_of_terms() {
        let mut d = drug("Loperamide", "antidiarrheal", "antidiarrheal");
        d.dosage_instructions = Some("take after each loose stool".into());
        let matches = keyword_overlap("loose stool", &[d], 5);
        assert_eq!(matches.len(), 1);
        assert!((matches[0].score - 1.0).abs() < 1e-9);
        assert_eq!(matches[0].reasoning, "Keyword match with 2 common terms");
    }
}
