//! Safety-optimized scorer: the multiplicative safety score scaled by how
//! relevant the drug's class is to the condition.

use std::cmp::Ordering;

use super::reference::condition_relevance;
use super::{CandidateScorer, ScoredCandidate, ScorerError, ScoringContext, ScoringMethod};

pub struct SafetyOptimizedScorer;

impl CandidateScorer for SafetyOptimizedScorer {
    fn name(&self) -> &'static str {
        "safety_optimized"
    }

    fn score(&self, ctx: &ScoringContext<'_>) -> Result<Vec<ScoredCandidate>, ScorerError> {
        if ctx.catalog.is_empty() {
            return Err(ScorerError::EmptyCatalog);
        }

        let mut candidates: Vec<ScoredCandidate> = Vec::new();
        for drug in ctx.catalog {
            let assessment = ctx.safety.score(drug, ctx.patient, ctx.condition, ctx.rules);
            let relevance = condition_relevance(drug, ctx.condition);
            let adjusted = assessment.score * relevance;
            if adjusted <= ctx.config.safety_threshold {
                continue;
            }

            let mut reasoning = assessment.reasoning;
            if relevance > 1.0 {
                reasoning.push(format!("Highly relevant for {}", ctx.condition));
            } else if relevance < 0.8 {
                reasoning.push(format!("Less relevant for {}", ctx.condition));
            }
            candidates.push(ScoredCandidate {
                drug: drug.clone(),
                score: adjusted,
                method: ScoringMethod::SafetyOptimized,
                reasoning: reasoning.join("; "),
            });
        }

        candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        candidates.truncate(ctx.max_results);
        Ok(candidates)
    }
}
