use chrono::NaiveDate;

use crate::models::enums::Gender;
use crate::models::{Drug, Interaction, Patient};

use super::allergy::{check_allergy, conflicting_allergens};
use super::helpers::{clamp_unit, contains_any, normalize_category};
use super::interactions::{effective_medication_set, match_interactions, max_interaction_risk};
use super::messages::MessageTemplates;
use super::reference::{
    expected_category, COMORBIDITY_PENALTIES, GERIATRIC_AGE_LIMIT, MODERATE_SIDE_EFFECT_KEYWORDS,
    PEDIATRIC_AGE_LIMIT, SEVERE_SIDE_EFFECT_KEYWORDS,
};
use super::types::SafetyAssessment;

/// Multiplicative safety score for one drug, one patient and one condition.
///
/// Every factor is applied to a running product starting at 1.0 and leaves
/// one reasoning line; the overall label is appended last.
#[derive(Debug, Clone)]
pub struct SafetyScorer {
    today: NaiveDate,
}

impl SafetyScorer {
    /// Scorer evaluating ages on `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Scorer evaluating ages on the local calendar date.
    pub fn for_today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn score(
        &self,
        drug: &Drug,
        patient: &Patient,
        condition: &str,
        rules: &[Interaction],
    ) -> SafetyAssessment {
        let mut score = 1.0_f64;
        let mut reasoning = Vec::new();
        let condition_lower = condition.to_lowercase();
        let contraindications = drug.contraindications_lower();

        // Therapeutic class
        if let Some(expected) = expected_category(&condition_lower) {
            let drug_category = normalize_category(&drug.category);
            if drug_category.contains(&normalize_category(expected)) {
                score *= 1.2;
                reasoning.push(format!("Appropriate drug class for condition ({expected})"));
            } else {
                score *= 0.3;
                reasoning.push(format!(
                    "Drug class mismatch: expected {expected}, drug is {}",
                    drug.category
                ));
            }
        }

        // Age
        if let Some(age) = patient.age_on(self.today) {
            if age < PEDIATRIC_AGE_LIMIT {
                if drug.has_pediatric_dosing() {
                    score *= 1.1;
                    reasoning.push("Pediatric dosing available".to_string());
                } else {
                    score *= 0.7;
                    reasoning.push(format!("No pediatric dosing data for age {age}"));
                }
            } else if age > GERIATRIC_AGE_LIMIT {
                if contains_any(&contraindications, &["geriatric", "elderly"]) {
                    score *= 0.4;
                    reasoning.push(format!("Geriatric contraindication for age {age}"));
                } else {
                    score *= 1.05;
                    reasoning.push("Suitable for geriatric patients".to_string());
                }
            }
        }

        // Pregnancy
        if patient.gender == Gender::Female
            && patient.is_pregnant
            && contraindications.contains("pregnan")
        {
            score *= 0.2;
            reasoning.push("Contraindicated in pregnancy".to_string());
        }

        // Comorbidities
        let history = patient.history_lower();
        for (condition, penalty) in COMORBIDITY_PENALTIES {
            if history.contains(condition) && contraindications.contains(condition) {
                score *= penalty;
                reasoning.push(format!("Contraindicated with {condition} condition"));
            }
        }

        // Drug-drug interactions
        let matches = match_interactions(&effective_medication_set(patient, drug), rules);
        let risk = max_interaction_risk(&matches);
        if risk > 0.8 {
            score *= 0.2;
            reasoning.push("High drug interaction risk".to_string());
        } else if risk > 0.5 {
            score *= 0.5;
            reasoning.push("Moderate drug interaction risk".to_string());
        } else if risk > 0.2 {
            score *= 0.8;
            reasoning.push("Low drug interaction risk".to_string());
        } else {
            score *= 1.1;
            reasoning.push("No significant drug interactions".to_string());
        }

        // Side effects
        let side_effects = drug.side_effects.as_deref().unwrap_or_default().to_lowercase();
        if contains_any(&side_effects, SEVERE_SIDE_EFFECT_KEYWORDS) {
            score *= 0.3;
            reasoning.push("Severe side effects reported".to_string());
        } else if contains_any(&side_effects, MODERATE_SIDE_EFFECT_KEYWORDS) {
            score *= 0.7;
            reasoning.push("Moderate side effects reported".to_string());
        } else {
            score *= 1.05;
            reasoning.push("Mild side effect profile".to_string());
        }

        // Allergies
        let allergy_warnings = check_allergy(patient, drug);
        if !allergy_warnings.is_empty() {
            score *= 0.1;
            reasoning.push(format!(
                "ALLERGY CONFLICT: {}",
                conflicting_allergens(&allergy_warnings).join(", ")
            ));
        } else if !drug.allergy_conflicts.is_empty() {
            score *= 0.9;
            reasoning.push("Has documented allergy conflicts, none apply to this patient".to_string());
        } else {
            score *= 1.05;
            reasoning.push("No allergy conflicts".to_string());
        }

        let score = clamp_unit(score);
        reasoning.push(MessageTemplates::overall(score).to_string());
        SafetyAssessment { score, reasoning }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::InteractionSeverity;
    use crate::models::{Allergy, PatientAllergy};
    use uuid::Uuid;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn scorer() -> SafetyScorer {
        SafetyScorer::new(today())
    }

    fn adult() -> Patient {
        let mut p = Patient::new("Test", "Adult", Gender::Female);
        p.date_of_birth = NaiveDate::from_ymd_opt(1984, 1, 1);
        p
    }

    #[test]
    fn matching_category_scores_safe() {
        let drug = Drug::new("Paracetamol", "Analgesic");
        let result = scorer().score(&drug, &adult(), "headache", &[]);
        // 1.2 * 1.1 * 1.05 * 1.05 clamps to 1.0
        assert_eq!(result.score, 1.0);
        assert!(result.reasoning[0].contains("Appropriate drug class"));
        assert_eq!(result.reasoning.last().unwrap(), "Overall: SAFE for this patient");
    }

    #[test]
    fn category_mismatch_penalized() {
        let drug = Drug::new("Amoxicillin", "antibiotic");
        let result = scorer().score(&drug, &adult(), "hypertension", &[]);
        let expected = 0.3 * 1.1 * 1.05 * 1.05;
        assert!((result.score - expected).abs() < 1e-9);
        assert!(result.reasoning[0].contains("mismatch"));
    }

    #[test]
    fn unknown_condition_leaves_category_alone() {
        let drug = Drug::new("Amoxicillin", "antibiotic");
        let result = scorer().score(&drug, &adult(), "routine review", &[]);
        assert!(!result.reasoning.iter().any(|r| r.contains("class")));
    }

    #[test]
    fn hyphenated_category_matches() {
        let drug = Drug::new("Ibuprofen", "anti_inflammatory");
        let result = scorer().score(&drug, &adult(), "joint inflammation", &[]);
        assert!(result.reasoning[0].contains("Appropriate"));
    }

    #[test]
    fn pediatric_without_dosing_penalized() {
        let mut child = adult();
        child.date_of_birth = NaiveDate::from_ymd_opt(2018, 1, 1);
        let drug = Drug::new("Aspirin", "analgesic");
        let base = scorer().score(&drug, &adult(), "", &[]).score;
        let result = scorer().score(&drug, &child, "", &[]);
        assert!(result.score < base);
        assert!(result.reasoning.iter().any(|r| r.contains("No pediatric dosing")));

        let mut dosed = drug.clone();
        dosed.pediatric_dose_mg_kg = Some(10.0);
        let result = scorer().score(&dosed, &child, "", &[]);
        assert!(result.reasoning.iter().any(|r| r == "Pediatric dosing available"));
    }

    #[test]
    fn geriatric_contraindication_penalized() {
        let mut elder = adult();
        elder.date_of_birth = NaiveDate::from_ymd_opt(1940, 1, 1);
        let mut drug = Drug::new("Diazepam", "anxiolytic");
        drug.contraindications = Some("Avoid in geriatric patients".into());
        let result = scorer().score(&drug, &elder, "", &[]);
        let expected = 0.4 * 1.1 * 1.05 * 1.05;
        assert!((result.score - expected).abs() < 1e-9);
    }

    #[test]
    fn pregnancy_contraindication_penalized() {
        let mut patient = adult();
        patient.is_pregnant = true;
        let mut drug = Drug::new("Warfarin", "anticoagulant");
        drug.contraindications = Some("Pregnancy".into());
        let result = scorer().score(&drug, &patient, "", &[]);
        assert!(result.reasoning.contains(&"Contraindicated in pregnancy".to_string()));
    }

    #[test]
    fn comorbidities_compound() {
        let mut patient = adult();
        patient.medical_history = Some("Chronic kidney disease, liver cirrhosis".into());
        let mut drug = Drug::new("Nephrotox", "analgesic");
        drug.contraindications = Some("kidney impairment; liver failure".into());
        let result = scorer().score(&drug, &patient, "", &[]);
        let expected = 0.3 * 0.4 * 1.1 * 1.05 * 1.05;
        assert!((result.score - expected).abs() < 1e-9);
    }

    #[test]
    fn interaction_risk_buckets() {
        let warfarin = Drug::new("Warfarin", "anticoagulant");
        let aspirin = Drug::new("Aspirin", "analgesic");
        let mut patient = adult();
        patient.active_medications = vec![warfarin.clone()];
        let rule = |severity| Interaction {
            id: Uuid::new_v4(),
            name: "Bleeding".into(),
            description: String::new(),
            severity,
            drugs: vec![warfarin.reference(), aspirin.reference()],
        };

        let contraindicated = scorer().score(&aspirin, &patient, "", &[rule(InteractionSeverity::Contraindicated)]);
        assert!(contraindicated.reasoning.contains(&"High drug interaction risk".to_string()));

        let major = scorer().score(&aspirin, &patient, "", &[rule(InteractionSeverity::Major)]);
        assert!(major.reasoning.contains(&"Moderate drug interaction risk".to_string()));

        let moderate = scorer().score(&aspirin, &patient, "", &[rule(InteractionSeverity::Moderate)]);
        assert!(moderate.reasoning.contains(&"Low drug interaction risk".to_string()));

        assert!(contraindicated.score < major.score && major.score < moderate.score);
    }

    #[test]
    fn severe_side_effects_penalized() {
        let mut drug = Drug::new("Clozapine", "antipsychotic");
        drug.side_effects = Some("Serious blood disorders".into());
        let result = scorer().score(&drug, &adult(), "", &[]);
        assert!((result.score - 0.3 * 1.1 * 1.05).abs() < 1e-9);
    }

    #[test]
    fn allergy_alone_never_zero() {
        let mut patient = adult();
        patient.allergies.push(PatientAllergy::new(Allergy::new("Penicillin")));
        let drug = Drug::new("Amoxicillin", "antibiotic");
        let result = scorer().score(&drug, &patient, "", &[]);
        assert!(result.score > 0.0);
        assert!((result.score - 0.1 * 1.1 * 1.05).abs() < 1e-9);
        assert!(result.reasoning.iter().any(|r| r.starts_with("ALLERGY CONFLICT")));
    }

    #[test]
    fn declared_conflicts_not_applying_slightly_penalized() {
        let mut drug = Drug::new("Amoxicillin", "antibiotic");
        drug.allergy_conflicts = vec![Allergy::new("Penicillin")];
        let result = scorer().score(&drug, &adult(), "", &[]);
        assert!((result.score - 1.1 * 1.05 * 0.9).abs() < 1e-9);
    }

    #[test]
    fn penalties_are_monotonic() {
        let mut patient = adult();
        let mut drug = Drug::new("Testdrug", "antibiotic");
        let mut last = scorer().score(&drug, &patient, "infection", &[]).score;

        drug.side_effects = Some("common nausea".into());
        let next = scorer().score(&drug, &patient, "infection", &[]).score;
        assert!(next <= last);
        last = next;

        patient.medical_history = Some("heart failure".into());
        drug.contraindications = Some("heart disease".into());
        let next = scorer().score(&drug, &patient, "infection", &[]).score;
        assert!(next <= last);
        last = next;

        patient.is_pregnant = true;
        drug.contraindications = Some("heart disease, pregnancy".into());
        let next = scorer().score(&drug, &patient, "infection", &[]).score;
        assert!(next <= last);
        last = next;

        patient.declared_allergies = vec!["Testdrug".into()];
        let next = scorer().score(&drug, &patient, "infection", &[]).score;
        assert!(next <= last);
        assert!(next > 0.0);
    }
}
