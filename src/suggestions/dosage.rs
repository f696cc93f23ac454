use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Drug, Patient};

pub const OPTIMIZED_REASONING: &str = "Optimized for patient weight and condition";
pub const STANDARD_REASONING: &str = "Standard dosing recommended";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DosageRecommendation {
    pub recommended_dosage_mg: Option<f64>,
    pub reasoning: String,
}

impl DosageRecommendation {
    pub fn standard() -> Self {
        Self {
            recommended_dosage_mg: None,
            reasoning: STANDARD_REASONING.to_string(),
        }
    }
}

/// Per-patient dose when the drug supports it; any failure degrades to standard dosing.
pub fn recommend(
    drug: &Drug,
    patient: &Patient,
    condition: &str,
    today: NaiveDate,
) -> DosageRecommendation {
    let Some(calculation) = drug.dosage_calculation() else {
        return DosageRecommendation::standard();
    };
    match calculation.calculate_dosage_for_patient(patient, condition, today) {
        Ok(mg) => DosageRecommendation {
            recommended_dosage_mg: Some(mg),
            reasoning: OPTIMIZED_REASONING.to_string(),
        },
        Err(e) => {
            tracing::debug!(drug = %drug.name, "standard dosing: {e}");
            DosageRecommendation::standard()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::Gender;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn amoxicillin() -> Drug {
        let mut drug = Drug::new("Amoxicillin", "antibiotic");
        drug.pediatric_dose_mg_kg = Some(25.0);
        drug
    }

    fn child(weight_kg: Option<f64>) -> Patient {
        let mut patient = Patient::new("A", "B", Gender::Male);
        patient.date_of_birth = NaiveDate::from_ymd_opt(2019, 3, 2);
        patient.weight_kg = weight_kg;
        patient
    }

    #[test]
    fn weight_based_dose() {
        let rec = recommend(&amoxicillin(), &child(Some(18.4)), "otitis", today());
        assert_eq!(rec.recommended_dosage_mg, Some(460.0));
        assert_eq!(rec.reasoning, OPTIMIZED_REASONING);
    }

    #[test]
    fn no_capability_is_standard() {
        let drug = Drug::new("Loratadine", "antihistamine");
        assert_eq!(
            recommend(&drug, &child(Some(18.4)), "allergy", today()),
            DosageRecommendation::standard()
        );
    }

    #[test]
    fn calculation_error_degrades_to_standard() {
        assert_eq!(
            recommend(&amoxicillin(), &child(None), "otitis", today()),
            DosageRecommendation::standard()
        );
    }

    #[test]
    fn adult_gets_standard_dosing() {
        let mut adult = Patient::new("A", "B", Gender::Male);
        adult.date_of_birth = NaiveDate::from_ymd_opt(1980, 5, 5);
        adult.weight_kg = Some(80.0);
        let rec = recommend(&amoxicillin(), &adult, "otitis", today());
        assert_eq!(rec, DosageRecommendation::standard());
        assert_eq!(rec.recommended_dosage_mg, None);
    }
}
