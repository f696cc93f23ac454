use crate::models::{Drug, Patient};

use super::allergy::conflicting_allergens;
use super::helpers::contains_any;
use super::reference::{
    expected_category, CHRONIC_CONDITIONS, CONDITION_CATEGORIES, GERIATRIC_AGE_LIMIT,
    MILD_CONDITION_KEYWORDS, PEDIATRIC_AGE_LIMIT, SEVERE_CONDITION_KEYWORDS, SYMPTOM_KEYWORDS,
};
use super::types::{
    ComplexityLevel, ConditionAnalysis, ConditionSeverity, DrugSafetyFlags, PatientComplexity, PatientSafetyInfo,
    RiskLevel, SafetyAnalysis, SafetyAssessment, Warning,
};

/// Scores at or below this are never reported as safe.
const SAFE_SCORE_FLOOR: f64 = 0.5;

pub fn analyze_condition(condition: &str) -> ConditionAnalysis {
    let lower = condition.to_lowercase();
    let symptoms = SYMPTOM_KEYWORDS
        .iter()
        .filter(|(_, keywords)| contains_any(&lower, keywords))
        .map(|(symptom, _)| symptom.to_string())
        .collect();
    let category = CONDITION_CATEGORIES
        .iter()
        .find(|(_, keywords)| contains_any(&lower, keywords))
        .map_or("general", |(category, _)| category)
        .to_string();
    let severity = if contains_any(&lower, SEVERE_CONDITION_KEYWORDS) {
        ConditionSeverity::Severe
    } else if contains_any(&lower, MILD_CONDITION_KEYWORDS) {
        ConditionSeverity::Mild
    } else {
        ConditionSeverity::Moderate
    };

    ConditionAnalysis {
        word_count: condition.split_whitespace().count(),
        symptoms,
        category,
        severity,
        expected_drug_category: expected_category(&lower).map(str::to_string),
    }
}

/// Chronic conditions 0.2 each, medications 0.05 each up to 0.3, allergies 0.1 each up to 0.2.
pub fn analyze_patient_complexity(patient: &Patient) -> PatientComplexity {
    let mut score = 0.0;
    let mut factors = Vec::new();

    let history = patient.medical_history.as_deref().unwrap_or_default().to_lowercase();
    let chronic = CHRONIC_CONDITIONS.iter().filter(|c| history.contains(*c)).count();
    score += chronic as f64 * 0.2;
    if chronic > 0 {
        factors.push(format!("{chronic} chronic conditions"));
    }

    let meds = patient.active_medications.len();
    score += (meds as f64 * 0.05).min(0.3);
    if meds > 0 {
        factors.push(format!("{meds} current medications"));
    }

    let allergies = patient.allergy_names().len();
    score += (allergies as f64 * 0.1).min(0.2);
    if allergies > 0 {
        factors.push(format!("{allergies} known allergies"));
    }

    let level = if score >= 0.7 {
        ComplexityLevel::High
    } else if score >= 0.4 {
        ComplexityLevel::Moderate
    } else {
        ComplexityLevel::Low
    };

    PatientComplexity {
        score,
        level,
        factors,
    }
}

/// Assemble the per-drug safety review from a computed score and the allergy warnings.
pub fn build_safety_analysis(
    drug: &Drug,
    patient: &Patient,
    age: Option<u32>,
    assessment: SafetyAssessment,
    allergy_warnings: &[Warning],
) -> SafetyAnalysis {
    let allergy_conflicts = conflicting_allergens(allergy_warnings);
    let mut warnings = Vec::new();
    let mut recommendations = Vec::new();

    for allergen in &allergy_conflicts {
        warnings.push(format!("ALLERGY CONFLICT: Patient is allergic to {allergen}"));
    }
    if !allergy_conflicts.is_empty() {
        recommendations.push(format!(
            "DO NOT PRESCRIBE {} - choose an alternative without allergy cross-reactivity",
            drug.name
        ));
    }
    if patient.is_pregnant && !drug.pregnancy_safe {
        warnings.push(format!("{} is not marked safe during pregnancy", drug.name));
        recommendations.push("Consider a pregnancy-safe alternative".to_string());
    }
    if patient.is_breastfeeding && !drug.breastfeeding_safe {
        warnings.push(format!("{} is not marked safe while breastfeeding", drug.name));
        recommendations.push("Consider a breastfeeding-safe alternative".to_string());
    }
    if let Some(age) = age {
        if age < PEDIATRIC_AGE_LIMIT && !drug.pediatric_safe {
            warnings.push(format!("{} is not marked safe for pediatric patients", drug.name));
            recommendations.push("Verify pediatric dosing with a specialist".to_string());
        }
        if age > GERIATRIC_AGE_LIMIT && !drug.geriatric_safe {
            warnings.push(format!("{} is not marked safe for geriatric patients", drug.name));
            recommendations.push("Start low and monitor closely in elderly patients".to_string());
        }
    }
    if assessment.score < SAFE_SCORE_FLOOR {
        warnings.push(format!("Low safety score ({:.2})", assessment.score));
        recommendations.push("Review alternatives before prescribing".to_string());
    }
    if recommendations.is_empty() {
        recommendations.push("Monitor patient response".to_string());
    }

    SafetyAnalysis {
        safety_score: assessment.score,
        risk_level: RiskLevel::from_score(assessment.score),
        is_safe: assessment.score > SAFE_SCORE_FLOOR && allergy_conflicts.is_empty(),
        allergy_conflicts,
        warnings,
        recommendations,
        reasoning: assessment.reasoning,
        drug_info: DrugSafetyFlags {
            id: drug.id,
            name: drug.name.clone(),
            category: drug.category.clone(),
            pregnancy_safe: drug.pregnancy_safe,
            breastfeeding_safe: drug.breastfeeding_safe,
            pediatric_safe: drug.pediatric_safe,
            geriatric_safe: drug.geriatric_safe,
        },
        patient_info: PatientSafetyInfo {
            id: patient.id,
            name: patient.full_name(),
            age,
            allergies: patient.allergy_names(),
            is_pregnant: patient.is_pregnant,
            is_breastfeeding: patient.is_breastfeeding,
        },
    }
}
