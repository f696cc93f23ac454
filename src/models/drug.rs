use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::safety::reference::PEDIATRIC_AGE_LIMIT;

use super::allergy::Allergy;
use super::enums::Availability;
use super::patient::Patient;

/// A catalog drug. Free-text clinical fields are matched case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drug {
    pub id: Uuid,
    pub name: String,
    pub generic_name: Option<String>,
    pub strength: Option<String>,
    pub form: Option<String>,
    pub manufacturer: Option<String>,
    pub category: String,
    pub therapeutic_class: Option<String>,
    pub dosage_instructions: Option<String>,
    pub side_effects: Option<String>,
    pub contraindications: Option<String>,
    /// Weight-based pediatric dose. Its presence is what "has pediatric dosing data" means.
    pub pediatric_dose_mg_kg: Option<f64>,
    pub pregnancy_safe: bool,
    pub breastfeeding_safe: bool,
    pub pediatric_safe: bool,
    pub geriatric_safe: bool,
    pub availability: Availability,
    pub price: Option<f64>,
    /// Allergens this drug is declared to conflict with.
    pub allergy_conflicts: Vec<Allergy>,
}

impl Drug {
    /// Minimal available drug; remaining fields default to empty/true.
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            generic_name: None,
            strength: None,
            form: None,
            manufacturer: None,
            category: category.into(),
            therapeutic_class: None,
            dosage_instructions: None,
            side_effects: None,
            contraindications: None,
            pediatric_dose_mg_kg: None,
            pregnancy_safe: true,
            breastfeeding_safe: true,
            pediatric_safe: true,
            geriatric_safe: true,
            availability: Availability::Available,
            price: None,
            allergy_conflicts: Vec::new(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.availability == Availability::Available
    }

    pub fn has_pediatric_dosing(&self) -> bool {
        self.pediatric_dose_mg_kg.is_some()
    }

    /// Lowercased therapeutic class, empty when absent.
    pub fn class_lower(&self) -> String {
        self.therapeutic_class
            .as_deref()
            .unwrap_or_default()
            .to_lowercase()
    }

    /// Lowercased contraindications, empty when absent.
    pub fn contraindications_lower(&self) -> String {
        self.contraindications
            .as_deref()
            .unwrap_or_default()
            .to_lowercase()
    }

    /// Per-patient dosage capability, present only when dosing data exists.
    pub fn dosage_calculation(&self) -> Option<&dyn HasDosageCalculation> {
        if self.pediatric_dose_mg_kg.is_some() {
            Some(self)
        } else {
            None
        }
    }

    pub fn reference(&self) -> DrugRef {
        DrugRef {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// Lightweight (id, name) pair carried on warnings and interaction rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DosageError {
    #[error("patient weight is not recorded")]
    MissingWeight,
    #[error("drug has no per-kilogram dose")]
    NoDosingData,
    #[error("patient date of birth is not recorded")]
    MissingAge,
    #[error("per-kilogram dosing is pediatric only; patient is {0}")]
    NotPediatric(u32),
    #[error("computed dose is not a positive number: {0}")]
    InvalidDose(f64),
}

/// Optional per-patient dosage computation.
pub trait HasDosageCalculation {
    /// Recommended dose in milligrams for this patient and condition, with
    /// the patient's age taken on `today`.
    fn calculate_dosage_for_patient(
        &self,
        patient: &Patient,
        condition: &str,
        today: NaiveDate,
    ) -> Result<f64, DosageError>;
}

impl HasDosageCalculation for Drug {
    fn calculate_dosage_for_patient(
        &self,
        patient: &Patient,
        _condition: &str,
        today: NaiveDate,
    ) -> Result<f64, DosageError> {
        let per_kg = self.pediatric_dose_mg_kg.ok_or(DosageError::NoDosingData)?;
        let age = patient.age_on(today).ok_or(DosageError::MissingAge)?;
        if age >= PEDIATRIC_AGE_LIMIT {
            return Err(DosageError::NotPediatric(age));
        }
        let weight = patient.weight_kg.ok_or(DosageError::MissingWeight)?;
        let dose = per_kg * weight;
        if dose.is_finite() && dose > 0.0 {
            Ok((dose * 10.0).round() / 10.0)
        } else {
            Err(DosageError::InvalidDose(dose))
        }
    }
}
