//! Medication suggestion ranking.
//!
//! Each scoring strategy is an independent `CandidateScorer` run over the
//! filtered catalog. A failing scorer is logged and contributes nothing; the
//! ensemble merges whatever the others produced, and a flat catalog scan
//! backs everything up so a request with safe drugs never comes back empty.

pub mod clustering;
pub mod content_provider;
pub mod dosage;
pub mod ensemble;
pub mod jitter;
pub mod population_provider;
pub mod reference;
pub mod safety_provider;
pub mod semantic_provider;
pub mod weights;

use std::collections::HashSet;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::db::DatabaseError;
use crate::models::{Drug, Interaction, Patient};
use crate::safety::{
    analyze_condition, analyze_patient_complexity, has_allergy_conflict, ConditionAnalysis,
    PatientComplexity, SafetyError, SafetyScorer,
};
use crate::store::ClinicalStore;

use dosage::DosageRecommendation;
use ensemble::RankedCandidate;
use weights::MethodWeights;

// ─── Public types ────────────────────────────────────────────────────────────

/// Which strategy produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMethod {
    ContentBased,
    /// Keyword-overlap path of the description scorer.
    KeywordMatching,
    Collaborative,
    SemanticKeyword,
    SafetyOptimized,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionOptions {
    pub use_patient_similarity: bool,
    pub use_dosage_optimization: bool,
}

impl Default for SuggestionOptions {
    fn default() -> Self {
        Self {
            use_patient_similarity: true,
            use_dosage_optimization: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionRequest {
    pub patient_id: Uuid,
    pub condition: String,
    #[serde(default)]
    pub excluded_drug_ids: Vec<Uuid>,
    /// Falls back to `EngineConfig::max_suggestions`.
    #[serde(default)]
    pub max_suggestions: Option<usize>,
    #[serde(default)]
    pub options: SuggestionOptions,
}

/// One ranked suggestion as returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrugSuggestion {
    pub drug_id: Uuid,
    pub name: String,
    pub generic_name: Option<String>,
    pub category: String,
    pub therapeutic_class: Option<String>,
    /// Clamped to [0, 1].
    pub score: f64,
    pub methods: Vec<ScoringMethod>,
    pub reasoning: String,
    pub dosage: Option<DosageRecommendation>,
    pub pregnancy_safe: bool,
    pub breastfeeding_safe: bool,
    pub pediatric_safe: bool,
    pub geriatric_safe: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionResult {
    pub suggestions: Vec<DrugSuggestion>,
    pub total: usize,
    pub excluded_count: usize,
    /// Available, non-excluded drugs dropped for allergy conflicts.
    pub allergy_filtered: usize,
}

/// Weights, condition read-out and complexity alongside the top suggestions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancedAnalysis {
    pub dynamic_weights: MethodWeights,
    pub condition_analysis: ConditionAnalysis,
    pub patient_complexity: PatientComplexity,
    pub suggestions: SuggestionResult,
}

// ─── Internal types ──────────────────────────────────────────────────────────

/// A per-strategy candidate. Scores are normally in [0, 1]; the safety
/// strategy can exceed 1 through its relevance multiplier.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub drug: Drug,
    pub score: f64,
    pub method: ScoringMethod,
    pub reasoning: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ScorerError {
    #[error("no candidate drugs to score")]
    EmptyCatalog,
    #[error("not enough comparable patients")]
    InsufficientPatients,
    #[error("vectorization failed: {0}")]
    Vectorization(String),
    #[error("store error: {0}")]
    Store(#[from] DatabaseError),
}

/// Everything a scorer may read for one request.
pub struct ScoringContext<'a> {
    pub patient: &'a Patient,
    pub condition: &'a str,
    /// Available, not excluded, no allergy conflict.
    pub catalog: &'a [Drug],
    /// Interaction rules sized for the patient's effective medication set.
    pub rules: &'a [Interaction],
    pub store: &'a dyn ClinicalStore,
    pub config: &'a EngineConfig,
    pub safety: &'a SafetyScorer,
    pub max_results: usize,
}

// ─── Trait ────────────────────────────────────────────────────────────────────

/// One per scoring strategy. Self-contained, independently testable.
pub trait CandidateScorer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this strategy runs under the request options.
    fn enabled(&self, _options: &SuggestionOptions) -> bool {
        true
    }

    fn score(&self, ctx: &ScoringContext<'_>) -> Result<Vec<ScoredCandidate>, ScorerError>;
}

// ─── Engine ──────────────────────────────────────────────────────────────────

pub struct SuggestionEngine<'a> {
    store: &'a dyn ClinicalStore,
    config: EngineConfig,
    safety: SafetyScorer,
    scorers: Vec<Box<dyn CandidateScorer>>,
}

impl<'a> SuggestionEngine<'a> {
    pub fn new(store: &'a dyn ClinicalStore, config: EngineConfig) -> Self {
        Self::with_scorer(store, config, SafetyScorer::for_today())
    }

    pub fn with_scorer(store: &'a dyn ClinicalStore, config: EngineConfig, safety: SafetyScorer) -> Self {
        Self {
            store,
            config,
            safety,
            scorers: vec![
                Box::new(content_provider::ContentScorer),
                Box::new(population_provider::PopulationScorer),
                Box::new(semantic_provider::SemanticScorer),
                Box::new(safety_provider::SafetyOptimizedScorer),
            ],
        }
    }

    /// Ranked suggestions for one patient and condition.
    pub fn suggest(&self, request: &SuggestionRequest) -> Result<SuggestionResult, SafetyError> {
        let started = Instant::now();
        let condition = request.condition.trim();
        if condition.is_empty() {
            return Err(SafetyError::InvalidInput("condition is required".into()));
        }
        let max_results = request.max_suggestions.unwrap_or(self.config.max_suggestions);
        if max_results == 0 {
            return Err(SafetyError::InvalidInput(
                "max_suggestions must be at least 1".into(),
            ));
        }

        let patient = self
            .store
            .get_patient(&request.patient_id)?
            .ok_or(SafetyError::PatientNotFound(request.patient_id))?;

        let available = self.store.list_available_drugs(&request.excluded_drug_ids)?;
        let available_count = available.len();
        let catalog: Vec<Drug> = available
            .into_iter()
            .filter(|d| !has_allergy_conflict(&patient, d))
            .collect();
        let allergy_filtered = available_count - catalog.len();
        let rules = self
            .store
            .list_interactions(patient.active_medications.len() + 1)?;

        let ctx = ScoringContext {
            patient: &patient,
            condition,
            catalog: &catalog,
            rules: &rules,
            store: self.store,
            config: &self.config,
            safety: &self.safety,
            max_results,
        };

        // Collect from each scorer (resilient: warn and continue on failure)
        let mut candidates: Vec<ScoredCandidate> = Vec::new();
        for scorer in &self.scorers {
            if !scorer.enabled(&request.options) {
                continue;
            }
            match scorer.score(&ctx) {
                Ok(mut results) => candidates.append(&mut results),
                Err(e) => {
                    tracing::warn!(scorer = scorer.name(), "CandidateScorer failed: {e}");
                }
            }
        }

        let method_weights = self.weights_for(condition, &patient);
        let mut jitter = jitter::from_mode(self.config.jitter);
        let mut ranked = ensemble::rank(candidates, &method_weights, &patient, jitter.as_mut());
        if ranked.is_empty() {
            ranked = ensemble::fallback(&catalog, condition);
        }
        ranked.truncate(max_results);

        let suggestions: Vec<DrugSuggestion> = ranked
            .into_iter()
            .map(|candidate| {
                let dosage = request
                    .options
                    .use_dosage_optimization
                    .then(|| {
                        dosage::recommend(&candidate.drug, &patient, condition, self.safety.today())
                    });
                into_suggestion(candidate, dosage)
            })
            .collect();

        tracing::info!(
            patient_id = %patient.id,
            catalog = catalog.len(),
            allergy_filtered,
            returned = suggestions.len(),
            processing_ms = started.elapsed().as_millis() as u64,
            "Suggestion ranking complete"
        );

        Ok(SuggestionResult {
            total: suggestions.len(),
            suggestions,
            excluded_count: request
                .excluded_drug_ids
                .iter()
                .collect::<HashSet<_>>()
                .len(),
            allergy_filtered,
        })
    }

    /// Dynamic weights, condition analysis, complexity and the top three suggestions.
    pub fn enhanced_analysis(&self, patient_id: &Uuid, condition: &str) -> Result<EnhancedAnalysis, SafetyError> {
        let patient = self
            .store
            .get_patient(patient_id)?
            .ok_or(SafetyError::PatientNotFound(*patient_id))?;

        let suggestions = self.suggest(&SuggestionRequest {
            patient_id: *patient_id,
            condition: condition.to_string(),
            excluded_drug_ids: Vec::new(),
            max_suggestions: Some(3),
            options: SuggestionOptions::default(),
        })?;

        Ok(EnhancedAnalysis {
            dynamic_weights: self.weights_for(condition.trim(), &patient),
            condition_analysis: analyze_condition(condition),
            patient_complexity: analyze_patient_complexity(&patient),
            suggestions,
        })
    }

    fn weights_for(&self, condition: &str, patient: &Patient) -> MethodWeights {
        weights::dynamic_weights(condition, patient, || {
            match population_provider::similar_patients(self.store, patient, &self.config) {
                Ok(similar) => similar.len(),
                Err(e) => {
                    tracing::warn!("similar-patient lookup failed: {e}");
                    0
                }
            }
        })
    }
}

fn into_suggestion(candidate: RankedCandidate, dosage: Option<DosageRecommendation>) -> DrugSuggestion {
    let RankedCandidate {
        drug,
        score,
        methods,
        reasoning,
    } = candidate;
    DrugSuggestion {
        drug_id: drug.id,
        score: crate::safety::helpers::clamp_unit(score),
        methods,
        reasoning,
        dosage,
        pregnancy_safe: drug.pregnancy_safe,
        breastfeeding_safe: drug.breastfeeding_safe,
        pediatric_safe: drug.pediatric_safe,
        geriatric_safe: drug.geriatric_safe,
        name: drug.name,
        generic_name: drug.generic_name,
        category: drug.category,
        therapeutic_class: drug.therapeutic_class,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JitterMode;
    use crate::models::enums::*;
    use crate::models::{Allergy, PatientAllergy, Prescription};
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    fn scorer() -> SafetyScorer {
        SafetyScorer::new(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
    }

    fn drug(name: &str, category: &str, class: &str) -> Drug {
        let mut d = Drug::new(name, category);
        d.therapeutic_class = Some(class.into());
        d
    }

    fn allergic_to(patient: &mut Patient, name: &str) {
        patient.allergies.push(PatientAllergy::new(Allergy::new(name)));
    }

    struct Fixture {
        store: MemoryStore,
        patient_id: Uuid,
        paracetamol: Uuid,
        amoxicillin: Uuid,
    }

    fn fixture() -> Fixture {
        let mut store = MemoryStore::new();
        let paracetamol = store.add_drug(drug("Paracetamol", "analgesic", "Analgesic"));
        store.add_drug(drug("Ibuprofen", "analgesic", "NSAID analgesic"));
        let amoxicillin = store.add_drug(drug("Amoxicillin", "antibiotic", "antibiotic"));
        store.add_drug(drug("Cetirizine", "antihistamine", "antihistamine"));
        let mut discontinued = drug("Oldrug", "analgesic", "Analgesic");
        discontinued.availability = Availability::Discontinued;
        store.add_drug(discontinued);

        let patient_id = store.add_patient(Patient::new("Ada", "Lovelace", Gender::Female));
        Fixture {
            store,
            patient_id,
            paracetamol,
            amoxicillin,
        }
    }

    fn request(patient_id: Uuid, condition: &str) -> SuggestionRequest {
        SuggestionRequest {
            patient_id,
            condition: condition.into(),
            excluded_drug_ids: Vec::new(),
            max_suggestions: None,
            options: SuggestionOptions::default(),
        }
    }

    fn engine(store: &MemoryStore) -> SuggestionEngine<'_> {
        SuggestionEngine::with_scorer(store, EngineConfig::deterministic(), scorer())
    }

    #[test]
    fn headache_ranks_analgesics_first() {
        let f = fixture();
        let result = engine(&f.store).suggest(&request(f.patient_id, "headache")).unwrap();

        assert!(!result.suggestions.is_empty());
        assert_eq!(result.total, result.suggestions.len());
        assert_eq!(result.suggestions[0].category, "analgesic");
        assert!(result.suggestions.iter().all(|s| s.name != "Oldrug"));
        assert!(result
            .suggestions
            .iter()
            .all(|s| (0.0..=1.0).contains(&s.score)));
    }

    #[test]
    fn allergy_conflicts_are_never_suggested() {
        let mut f = fixture();
        let mut patient = Patient::new("Bo", "Penn", Gender::Male);
        allergic_to(&mut patient, "Penicillin");
        let patient_id = f.store.add_patient(patient);

        let result = engine(&f.store)
            .suggest(&request(patient_id, "bacterial infection"))
            .unwrap();
        assert!(result.suggestions.iter().all(|s| s.drug_id != f.amoxicillin));
        assert_eq!(result.allergy_filtered, 1);
    }

    #[test]
    fn excluded_drugs_are_skipped_and_counted() {
        let f = fixture();
        let mut req = request(f.patient_id, "headache");
        req.excluded_drug_ids = vec![f.paracetamol, f.paracetamol];
        let result = engine(&f.store).suggest(&req).unwrap();
        assert_eq!(result.excluded_count, 1);
        assert!(result.suggestions.iter().all(|s| s.drug_id != f.paracetamol));
    }

    #[test]
    fn max_suggestions_truncates() {
        let f = fixture();
        let mut req = request(f.patient_id, "headache");
        req.max_suggestions = Some(1);
        let result = engine(&f.store).suggest(&req).unwrap();
        assert_eq!(result.suggestions.len(), 1);
    }

    #[test]
    fn hypertension_without_antihypertensives_still_returns() {
        let f = fixture();
        let result = engine(&f.store)
            .suggest(&request(f.patient_id, "hypertension"))
            .unwrap();
        assert!(!result.suggestions.is_empty());
        assert!(result
            .suggestions
            .iter()
            .all(|s| !s.methods.contains(&ScoringMethod::SafetyOptimized)));
    }

    #[test]
    fn empty_scorers_fall_back_to_catalog() {
        let mut store = MemoryStore::new();
        let mut zinc = Drug::new("Zinc", "mineral");
        zinc.contraindications = Some("Avoid in pregnancy".into());
        zinc.side_effects = Some("severe nausea".into());
        store.add_drug(zinc);
        let mut patient = Patient::new("A", "B", Gender::Female);
        patient.is_pregnant = true;
        let patient_id = store.add_patient(patient);

        let result = engine(&store).suggest(&request(patient_id, "xyzzy")).unwrap();
        assert_eq!(result.suggestions.len(), 1);
        assert_eq!(result.suggestions[0].methods, vec![ScoringMethod::Fallback]);
        assert!((result.suggestions[0].score - 0.1).abs() < 1e-9);
    }

    #[test]
    fn no_safe_drugs_yields_empty_result() {
        let mut store = MemoryStore::new();
        store.add_drug(Drug::new("Amoxicillin", "antibiotic"));
        let mut patient = Patient::new("A", "B", Gender::Other);
        allergic_to(&mut patient, "Amoxicillin");
        let patient_id = store.add_patient(patient);

        let result = engine(&store).suggest(&request(patient_id, "infection")).unwrap();
        assert!(result.suggestions.is_empty());
        assert_eq!(result.allergy_filtered, 1);
    }

    #[test]
    fn unknown_patient_is_not_found() {
        let f = fixture();
        let err = engine(&f.store)
            .suggest(&request(Uuid::new_v4(), "headache"))
            .unwrap_err();
        assert!(matches!(err, SafetyError::PatientNotFound(_)));
    }

    #[test]
    fn blank_condition_is_invalid() {
        let f = fixture();
        let err = engine(&f.store).suggest(&request(f.patient_id, "  ")).unwrap_err();
        assert!(matches!(err, SafetyError::InvalidInput(_)));

        let mut req = request(f.patient_id, "headache");
        req.max_suggestions = Some(0);
        assert!(matches!(
            engine(&f.store).suggest(&req).unwrap_err(),
            SafetyError::InvalidInput(_)
        ));
    }

    #[test]
    fn seeded_jitter_is_repeatable() {
        let f = fixture();
        let mut config = EngineConfig::default();
        config.jitter = JitterMode::Seeded { seed: 7 };
        let engine = SuggestionEngine::with_scorer(&f.store, config, scorer());

        let first = engine.suggest(&request(f.patient_id, "headache")).unwrap();
        let second = engine.suggest(&request(f.patient_id, "headache")).unwrap();
        let ids = |r: &SuggestionResult| r.suggestions.iter().map(|s| s.drug_id).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn dosage_step_follows_option() {
        let mut store = MemoryStore::new();
        let mut dosed = drug("Paracetamol", "analgesic", "Analgesic");
        dosed.pediatric_dose_mg_kg = Some(15.0);
        store.add_drug(dosed);
        let mut patient = Patient::new("A", "B", Gender::Female);
        patient.date_of_birth = NaiveDate::from_ymd_opt(2016, 2, 1);
        patient.weight_kg = Some(20.0);
        let patient_id = store.add_patient(patient);

        let result = engine(&store).suggest(&request(patient_id, "headache")).unwrap();
        let dosage = result.suggestions[0].dosage.as_ref().unwrap();
        assert_eq!(dosage.recommended_dosage_mg, Some(300.0));

        let mut req = request(patient_id, "headache");
        req.options.use_dosage_optimization = false;
        let result = engine(&store).suggest(&req).unwrap();
        assert!(result.suggestions[0].dosage.is_none());
    }

    #[test]
    fn population_scorer_respects_option() {
        let mut store = MemoryStore::new();
        let vitamin = store.add_drug(drug("Vitamin D", "supplement", "vitamin"));
        let subject = store.add_patient(Patient::new("S", "S", Gender::Male));
        for i in 0..3 {
            let peer = store.add_patient(Patient::new(format!("P{i}"), "P", Gender::Male));
            store.add_prescription(Prescription::new(peer, PrescriptionStatus::Completed, vec![vitamin]));
        }

        let with = engine(&store).suggest(&request(subject, "routine review")).unwrap();
        assert!(with.suggestions[0].methods.contains(&ScoringMethod::Collaborative));

        let mut req = request(subject, "routine review");
        req.options.use_patient_similarity = false;
        let without = engine(&store).suggest(&req).unwrap();
        assert!(!without.suggestions[0].methods.contains(&ScoringMethod::Collaborative));
    }

    #[test]
    fn enhanced_analysis_bundles_weights_and_top_three() {
        let f = fixture();
        let analysis = engine(&f.store)
            .enhanced_analysis(&f.patient_id, "severe headache")
            .unwrap();
        assert!(analysis.dynamic_weights.validate());
        assert!(analysis.suggestions.suggestions.len() <= 3);
        assert_eq!(analysis.condition_analysis.category, "neurological");
        assert_eq!(analysis.patient_complexity.level, crate::safety::ComplexityLevel::Low);
    }
}
