use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::AllergySeverity;

/// A named allergen in the catalog (e.g. "Penicillin").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allergy {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

impl Allergy {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
        }
    }
}

/// An explicit patient–allergy record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientAllergy {
    pub allergy: Allergy,
    pub severity: Option<AllergySeverity>,
    pub reaction: Option<String>,
    pub date_noted: Option<NaiveDate>,
}

impl PatientAllergy {
    pub fn new(allergy: Allergy) -> Self {
        Self {
            allergy,
            severity: None,
            reaction: None,
            date_noted: None,
        }
    }
}
