//! Population-frequency scorer: how often drugs were prescribed within the
//! subject's cluster of comparable patients.

use std::collections::HashMap;

use uuid::Uuid;

use crate::config::EngineConfig;
use crate::models::Patient;
use crate::store::ClinicalStore;

use super::clustering::{patient_features, same_cluster};
use super::{
    CandidateScorer, ScoredCandidate, ScorerError, ScoringContext, ScoringMethod,
    SuggestionOptions,
};

pub struct PopulationScorer;

impl CandidateScorer for PopulationScorer {
    fn name(&self) -> &'static str {
        "collaborative"
    }

    fn enabled(&self, options: &SuggestionOptions) -> bool {
        options.use_patient_similarity
    }

    fn score(&self, ctx: &ScoringContext<'_>) -> Result<Vec<ScoredCandidate>, ScorerError> {
        let similar = similar_patients(ctx.store, ctx.patient, ctx.config)?;
        let ids: Vec<Uuid> = similar.iter().map(|p| p.id).collect();
        let history = ctx.store.prescription_history(&ids)?;

        // Count in first-seen order so equal frequencies keep a stable order
        let mut order: Vec<Uuid> = Vec::new();
        let mut frequency: HashMap<Uuid, usize> = HashMap::new();
        for drug_id in history {
            let count = frequency.entry(drug_id).or_insert(0);
            if *count == 0 {
                order.push(drug_id);
            }
            *count += 1;
        }
        order.sort_by(|a, b| frequency[b].cmp(&frequency[a]));

        let cluster_size = similar.len() as f64;
        Ok(order
            .into_iter()
            .filter_map(|id| ctx.catalog.iter().find(|d| d.id == id))
            .take(ctx.max_results)
            .map(|drug| {
                let count = frequency[&drug.id];
                ScoredCandidate {
                    drug: drug.clone(),
                    score: (count as f64 / cluster_size).min(1.0),
                    method: ScoringMethod::Collaborative,
                    reasoning: format!("Prescribed to {count} similar patients"),
                }
            })
            .collect())
    }
}

/// Same-gender patients in the subject's k-means cluster, at most
/// `similar_patient_limit` of them.
pub fn similar_patients(
    store: &dyn ClinicalStore,
    patient: &Patient,
    config: &EngineConfig,
) -> Result<Vec<Patient>, ScorerError> {
    let pool = store.find_similar_patients(patient, config.population_pool_limit)?;
    if pool.is_empty() {
        return Err(ScorerError::InsufficientPatients);
    }

    let features: Vec<_> = pool.iter().map(patient_features).collect();
    let members = same_cluster(&patient_features(patient), &features, config.cluster_count);

    let mut pool: Vec<Option<Patient>> = pool.into_iter().map(Some).collect();
    Ok(members
        .into_iter()
        .filter_map(|i| pool[i].take())
        .take(config.similar_patient_limit)
        .collect())
}
