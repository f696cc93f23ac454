use crate::models::{Drug, Patient};

use super::helpers::drug_class_labels;
use super::messages::MessageTemplates;
use super::reference::ALLERGY_FAMILIES;
use super::types::Warning;

/// Allergy warnings for prescribing `drug` to `patient`.
///
/// Per allergy: a name match (exact or substring either way) ends the
/// checks for that allergy; otherwise the class-label, family and declared
/// conflict checks each add their own warning. Repeats are not collapsed.
pub fn check_allergy(patient: &Patient, drug: &Drug) -> Vec<Warning> {
    let mut warnings = Vec::new();
    let drug_name = drug.name.trim().to_lowercase();
    let generic = drug.generic_name.as_deref().unwrap_or_default().to_lowercase();
    let labels = drug_class_labels(drug);

    for allergen in patient.allergy_names() {
        let allergy = allergen.to_lowercase();

        if allergy == drug_name
            || (!drug_name.is_empty() && (drug_name.contains(&allergy) || allergy.contains(&drug_name)))
        {
            warnings.push(Warning::allergy(
                &allergen,
                MessageTemplates::allergy_direct(&allergen, &drug.name),
            ));
            continue;
        }

        if let Some(label) = labels
            .iter()
            .find(|label| label.contains(&allergy) || allergy.contains(label.as_str()))
        {
            warnings.push(Warning::allergy(
                &allergen,
                MessageTemplates::allergy_class(&allergen, &drug.name, label),
            ));
        }

        for family in ALLERGY_FAMILIES {
            if !family.allergens.iter().any(|a| allergy.contains(a)) {
                continue;
            }
            if family
                .members
                .iter()
                .any(|m| drug_name.contains(m) || generic.contains(m))
            {
                warnings.push(Warning::allergy(
                    &allergen,
                    MessageTemplates::allergy_family(&allergen, &drug.name, family.label),
                ));
            }
        }

        if drug
            .allergy_conflicts
            .iter()
            .any(|c| c.name.trim().eq_ignore_ascii_case(&allergen))
        {
            warnings.push(Warning::allergy(
                &allergen,
                MessageTemplates::allergy_declared(&allergen, &drug.name),
            ));
        }
    }

    if !warnings.is_empty() {
        tracing::debug!(
            drug = %drug.name,
            warning_count = warnings.len(),
            "allergy conflicts found"
        );
    }
    warnings
}

pub fn has_allergy_conflict(patient: &Patient, drug: &Drug) -> bool {
    !check_allergy(patient, drug).is_empty()
}

/// Distinct allergens that produced a warning, in first-seen order.
pub fn conflicting_allergens(warnings: &[Warning]) -> Vec<String> {
    let mut allergens: Vec<String> = Vec::new();
    for allergen in warnings.iter().filter_map(|w| w.allergen.as_ref()) {
        if !allergens.contains(allergen) {
            allergens.push(allergen.clone());
        }
    }
    allergens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::{Gender, WarningSeverity, WarningType};
    use crate::models::{Allergy, PatientAllergy};

    fn patient_allergic_to(names: &[&str]) -> Patient {
        let mut p = Patient::new("Test", "Patient", Gender::Female);
        for name in names {
            p.allergies.push(PatientAllergy::new(Allergy::new(*name)));
        }
        p
    }

    #[test]
    fn exact_name_match_is_high_severity() {
        let patient = patient_allergic_to(&["Ibuprofen"]);
        let drug = Drug::new("ibuprofen", "analgesic");
        let warnings = check_allergy(&patient, &drug);
        assert!(!warnings.is_empty());
        assert!(warnings
            .iter()
            .all(|w| w.warning_type == WarningType::Allergy && w.severity == WarningSeverity::High));
    }

    #[test]
    fn penicillin_allergy_flags_amoxicillin() {
        let patient = patient_allergic_to(&["penicillin"]);
        let drug = Drug::new("Amoxicillin", "antibiotic");
        let warnings = check_allergy(&patient, &drug);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("penicillin family"));
        assert_eq!(warnings[0].severity, WarningSeverity::High);
    }

    #[test]
    fn aspirin_allergy_flags_nsaid_generic() {
        let patient = patient_allergic_to(&["Aspirin"]);
        let mut drug = Drug::new("Advil", "analgesic");
        drug.generic_name = Some("Ibuprofen".into());
        let warnings = check_allergy(&patient, &drug);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("NSAID"));
    }

    #[test]
    fn substring_match_either_direction() {
        let patient = patient_allergic_to(&["codeine phosphate"]);
        let drug = Drug::new("Codeine", "analgesic");
        assert_eq!(check_allergy(&patient, &drug).len(), 1);
    }

    #[test]
    fn class_and_family_both_report() {
        let patient = patient_allergic_to(&["penicillin"]);
        let mut drug = Drug::new("Moxatag", "antibiotic");
        drug.generic_name = Some("amoxicillin".into());
        drug.therapeutic_class = Some("Penicillin antibiotic".into());
        let warnings = check_allergy(&patient, &drug);
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn declared_conflict_reports() {
        let latex = Allergy::new("Latex");
        let patient = patient_allergic_to(&["latex"]);
        let mut drug = Drug::new("Gloved Injection", "vaccine");
        drug.allergy_conflicts = vec![latex];
        let warnings = check_allergy(&patient, &drug);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("documented as conflicting"));
    }

    #[test]
    fn declared_allergies_are_checked() {
        let mut patient = Patient::new("Test", "Patient", Gender::Male);
        patient.declared_allergies = vec!["Naproxen".into()];
        let drug = Drug::new("Naproxen", "analgesic");
        assert!(has_allergy_conflict(&patient, &drug));
    }

    #[test]
    fn unrelated_allergy_is_clear() {
        let patient = patient_allergic_to(&["shellfish"]);
        let drug = Drug::new("Metformin", "antidiabetic");
        assert!(check_allergy(&patient, &drug).is_empty());
    }

    #[test]
    fn no_allergies_no_warnings() {
        let patient = Patient::new("Test", "Patient", Gender::Other);
        assert!(check_allergy(&patient, &Drug::new("Aspirin", "analgesic")).is_empty());
    }

    #[test]
    fn conflicting_allergens_dedup() {
        let warnings = vec![
            Warning::allergy("Penicillin", "a".into()),
            Warning::allergy("Penicillin", "b".into()),
        ];
        assert_eq!(conflicting_allergens(&warnings), vec!["Penicillin".to_string()]);
    }
}
