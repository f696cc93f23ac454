use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::allergy::PatientAllergy;
use super::drug::Drug;
use super::enums::Gender;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Gender,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub is_pregnant: bool,
    pub is_breastfeeding: bool,
    pub medical_history: Option<String>,
    pub organ_function_notes: Option<String>,
    /// Explicit allergy records.
    pub allergies: Vec<PatientAllergy>,
    /// Allergies declared directly on the patient (intake form, verbal report).
    pub declared_allergies: Vec<String>,
    /// Drugs on the patient's active prescriptions. Populated by the store.
    pub active_medications: Vec<Drug>,
}

impl Patient {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, gender: Gender) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            date_of_birth: None,
            gender,
            weight_kg: None,
            height_cm: None,
            is_pregnant: false,
            is_breastfeeding: false,
            medical_history: None,
            organ_function_notes: None,
            allergies: Vec::new(),
            declared_allergies: Vec::new(),
            active_medications: Vec::new(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Age in whole years on `today`, `None` without a date of birth.
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        let dob = self.date_of_birth?;
        let mut years = today.year() - dob.year();
        if (today.month(), today.day()) < (dob.month(), dob.day()) {
            years -= 1;
        }
        u32::try_from(years).ok()
    }

    /// Union of explicit and declared allergy names, first spelling kept, blanks dropped.
    pub fn allergy_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let explicit = self.allergies.iter().map(|a| a.allergy.name.as_str());
        let declared = self.declared_allergies.iter().map(String::as_str);
        for name in explicit.chain(declared) {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                continue;
            }
            if !names.iter().any(|n| n.eq_ignore_ascii_case(trimmed)) {
                names.push(trimmed.to_string());
            }
        }
        names
    }

    pub fn has_allergies(&self) -> bool {
        !self.allergy_names().is_empty()
    }

    /// Lowercased medical history and organ-function notes, space-joined.
    pub fn history_lower(&self) -> String {
        [self.medical_history.as_deref(), self.organ_function_notes.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    pub fn has_history(&self) -> bool {
        self.medical_history
            .as_deref()
            .is_some_and(|h| !h.trim().is_empty())
    }
}
