use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::{CheckStatus, InteractionSeverity, WarningSeverity, WarningType};
use crate::models::DrugRef;

// ─── Warnings ───

/// One reportable hazard of a candidate prescription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warning {
    #[serde(rename = "type")]
    pub warning_type: WarningType,
    pub severity: WarningSeverity,
    pub message: String,
    /// Allergen that triggered an allergy warning.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allergen: Option<String>,
    /// Drugs named by an interaction warning, in rule order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub drugs_involved: Vec<DrugRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interaction_severity: Option<InteractionSeverity>,
}

impl Warning {
    pub fn allergy(allergen: &str, message: String) -> Self {
        Self {
            warning_type: WarningType::Allergy,
            severity: WarningSeverity::High,
            message,
            allergen: Some(allergen.to_string()),
            drugs_involved: Vec::new(),
            interaction_severity: None,
        }
    }

    pub fn is_allergy(&self) -> bool {
        self.warning_type == WarningType::Allergy
    }
}

/// Result of checking one candidate drug against a patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictReport {
    pub status: CheckStatus,
    pub warnings: Vec<Warning>,
}

impl ConflictReport {
    pub fn from_warnings(warnings: Vec<Warning>) -> Self {
        Self {
            status: CheckStatus::from_warning_count(warnings.len()),
            warnings,
        }
    }
}

/// An accepted interaction rule for an effective medication set.
#[derive(Debug, Clone)]
pub struct InteractionMatch {
    pub interaction_id: Uuid,
    pub name: String,
    pub description: String,
    pub severity: InteractionSeverity,
    pub drugs: Vec<DrugRef>,
}

// ─── Prescription list ───

/// A two-drug interaction found inside a prescription list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairInteraction {
    pub medication1_id: Uuid,
    pub medication1_name: String,
    pub medication2_id: Uuid,
    pub medication2_name: String,
    pub interaction_name: String,
    pub severity: InteractionSeverity,
    pub description: String,
}

/// Two or more listed drugs sharing a therapeutic class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateTherapy {
    pub therapeutic_class: String,
    pub medications: Vec<DrugRef>,
    pub severity: WarningSeverity,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionCheck {
    pub status: CheckStatus,
    pub interactions: Vec<PairInteraction>,
    pub duplicate_therapy: Vec<DuplicateTherapy>,
}

impl PrescriptionCheck {
    pub fn empty() -> Self {
        Self {
            status: CheckStatus::Ok,
            interactions: Vec::new(),
            duplicate_therapy: Vec::new(),
        }
    }
}

// ─── Scoring ───

/// Safety score in [0, 1] with one reasoning line per adjustment, overall label last.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyAssessment {
    pub score: f64,
    pub reasoning: Vec<String>,
}

/// Risk bucket for a safety score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Safe,
    Moderate,
    High,
    Contraindicated,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            Self::Safe
        } else if score >= 0.5 {
            Self::Moderate
        } else if score >= 0.2 {
            Self::High
        } else {
            Self::Contraindicated
        }
    }
}

// ─── Analysis ───

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrugSafetyFlags {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub pregnancy_safe: bool,
    pub breastfeeding_safe: bool,
    pub pediatric_safe: bool,
    pub geriatric_safe: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientSafetyInfo {
    pub id: Uuid,
    pub name: String,
    pub age: Option<u32>,
    pub allergies: Vec<String>,
    pub is_pregnant: bool,
    pub is_breastfeeding: bool,
}

/// Combined per-drug safety review for one patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyAnalysis {
    pub safety_score: f64,
    pub risk_level: RiskLevel,
    pub is_safe: bool,
    pub allergy_conflicts: Vec<String>,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
    pub reasoning: Vec<String>,
    pub drug_info: DrugSafetyFlags,
    pub patient_info: PatientSafetyInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityLevel {
    Low,
    Moderate,
    High,
}

/// How many interacting factors a patient brings to a prescribing decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientComplexity {
    pub score: f64,
    pub level: ComplexityLevel,
    pub factors: Vec<String>,
}

/// Keyword read-out of a free-text condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionAnalysis {
    pub word_count: usize,
    pub symptoms: Vec<String>,
    /// Body-system category, "general" when nothing matched.
    pub category: String,
    pub severity: ConditionSeverity,
    pub expected_drug_category: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionSeverity {
    Mild,
    Moderate,
    Severe,
}

// ─── Errors ───

#[derive(Debug, thiserror::Error)]
pub enum SafetyError {
    #[error("Patient not found: {0}")]
    PatientNotFound(Uuid),

    #[error("Drug not found: {0}")]
    DrugNotFound(Uuid),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}
