//! Per-request method weights for the ensemble merge.

use serde::{Deserialize, Serialize};

use crate::models::Patient;

use super::reference::WEIGHTING_CHRONIC_CONDITIONS;
use super::ScoringMethod;

/// Weight applied to candidates whose method has no slot.
pub const UNWEIGHTED_METHOD: f64 = 0.1;

/// Inputs longer than this many words boost the text-driven methods.
const DETAILED_INPUT_WORDS: usize = 15;

/// Patients above this complexity boost safety (and maybe population).
const COMPLEX_PATIENT_THRESHOLD: f64 = 0.3;

/// Population weight is only boosted with more similar patients than this.
const MIN_SIMILAR_FOR_POPULATION_BOOST: usize = 3;

const MAX_BOOST: f64 = 0.15;

/// One weight per scoring family. Sums to 1.0 once normalised.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MethodWeights {
    pub content_based: f64,
    pub collaborative: f64,
    pub semantic: f64,
    pub safety_optimized: f64,
}

impl Default for MethodWeights {
    fn default() -> Self {
        Self {
            content_based: 0.35,
            collaborative: 0.10,
            semantic: 0.35,
            safety_optimized: 0.20,
        }
    }
}

impl MethodWeights {
    pub fn sum(&self) -> f64 {
        self.content_based + self.collaborative + self.semantic + self.safety_optimized
    }

    /// Validate that all weights sum to ~1.0
    pub fn validate(&self) -> bool {
        (self.sum() - 1.0).abs() < 1e-9
    }

    /// Renormalise weights so they sum to 1.0. Degenerate inputs reset to the base weights.
    pub fn normalise(&mut self) {
        let sum = self.sum();
        if !sum.is_finite() || sum <= 0.0 {
            *self = Self::default();
            return;
        }
        self.content_based /= sum;
        self.collaborative /= sum;
        self.semantic /= sum;
        self.safety_optimized /= sum;
    }

    pub fn weight_for(&self, method: ScoringMethod) -> f64 {
        match method {
            ScoringMethod::ContentBased | ScoringMethod::KeywordMatching => self.content_based,
            ScoringMethod::Collaborative => self.collaborative,
            ScoringMethod::SemanticKeyword => self.semantic,
            ScoringMethod::SafetyOptimized => self.safety_optimized,
            ScoringMethod::Fallback => UNWEIGHTED_METHOD,
        }
    }
}

/// Complexity used for weighting: 0.1 per chronic condition, 0.05 per
/// active medication (max 0.3), 0.1 per allergy (max 0.2).
pub fn weighting_complexity(patient: &Patient) -> f64 {
    let history = patient
        .medical_history
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();
    let chronic = WEIGHTING_CHRONIC_CONDITIONS
        .iter()
        .filter(|c| history.contains(*c))
        .count();
    chronic as f64 * 0.1
        + (patient.active_medications.len() as f64 * 0.05).min(0.3)
        + (patient.allergy_names().len() as f64 * 0.1).min(0.2)
}

/// Fresh weights for one request.
///
/// `similar_patients` is only consulted for complex patients, so the
/// clustering behind it is skipped otherwise.
pub fn dynamic_weights(
    condition: &str,
    patient: &Patient,
    similar_patients: impl FnOnce() -> usize,
) -> MethodWeights {
    let mut weights = MethodWeights::default();

    let input_words = condition.split_whitespace().count();
    if input_words > DETAILED_INPUT_WORDS {
        let boost = (input_words as f64 / 20.0 * 0.1).min(MAX_BOOST);
        weights.content_based += boost;
        weights.semantic += boost;
        tracing::debug!(input_words, boost, "detailed input, boosting content/semantic");
    }

    let complexity = weighting_complexity(patient);
    if complexity > COMPLEX_PATIENT_THRESHOLD {
        let boost = (complexity * 0.2).min(MAX_BOOST);
        weights.safety_optimized += boost;
        let similar = similar_patients();
        if similar > MIN_SIMILAR_FOR_POPULATION_BOOST {
            weights.collaborative += boost;
        }
        tracing::debug!(complexity, boost, similar, "complex patient, boosting safety");
    }

    weights.normalise();
    weights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::Gender;
    use crate::models::Drug;

    #[test]
    fn default_weights_sum_to_one() {
        assert!(MethodWeights::default().validate());
    }

    #[test]
    fn normalise_restores_sum() {
        let mut w = MethodWeights::default();
        w.safety_optimized += 0.4;
        assert!(!w.validate());
        w.normalise();
        assert!(w.validate());
    }

    #[test]
    fn degenerate_weights_reset() {
        let mut w = MethodWeights {
            content_based: 0.0,
            collaborative: 0.0,
            semantic: 0.0,
            safety_optimized: 0.0,
        };
        w.normalise();
        assert_eq!(w, MethodWeights::default());
    }

    #[test]
    fn simple_request_keeps_base_weights() {
        let patient = Patient::new("A", "B", Gender::Female);
        let w = dynamic_weights("headache", &patient, || -> usize { panic!("clustering not needed") });
        let base = MethodWeights::default();
        assert!((w.content_based - base.content_based).abs() < 1e-9);
        assert!((w.collaborative - base.collaborative).abs() < 1e-9);
        assert!((w.safety_optimized - base.safety_optimized).abs() < 1e-9);
    }

    #[test]
    fn detailed_input_boosts_text_methods() {
        let patient = Patient::new("A", "B", Gender::Female);
        let condition = "persistent throbbing headache on the left side for three days \
                         worse in the morning with light sensitivity and nausea";
        let w = dynamic_weights(condition, &patient, || 0);
        assert!(w.validate());
        assert!(w.content_based > 0.35);
        assert!(w.safety_optimized < 0.20);
    }

    #[test]
    fn complex_patient_boosts_safety_and_population() {
        let mut patient = Patient::new("A", "B", Gender::Male);
        patient.medical_history = Some("diabetes, hypertension, chronic kidney disease".into());
        patient.active_medications = vec![Drug::new("Metformin", "antidiabetic")];

        let without_peers = dynamic_weights("headache", &patient, || 2);
        let with_peers = dynamic_weights("headache", &patient, || 8);
        assert!(without_peers.validate() && with_peers.validate());
        assert!(without_peers.safety_optimized > 0.20);
        assert!(with_peers.collaborative > without_peers.collaborative);
    }

    #[test]
    fn method_weight_lookup() {
        let w = MethodWeights::default();
        assert_eq!(w.weight_for(ScoringMethod::KeywordMatching), w.content_based);
        assert_eq!(w.weight_for(ScoringMethod::SemanticKeyword), w.semantic);
        assert_eq!(w.weight_for(ScoringMethod::Fallback), UNWEIGHTED_METHOD);
    }
}
