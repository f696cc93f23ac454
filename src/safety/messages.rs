/// Message templates for warnings and safety reasoning.
pub struct MessageTemplates;

impl MessageTemplates {
    /// Allergy matched the drug name.
    pub fn allergy_direct(allergen: &str, drug: &str) -> String {
        format!(
            "Patient is allergic to {allergen}. Prescribing {drug} could cause a severe allergic reaction."
        )
    }

    /// Allergy matched one of the drug's class labels.
    pub fn allergy_class(allergen: &str, drug: &str, label: &str) -> String {
        format!(
            "Patient is allergic to {allergen}. {drug} belongs to a related class ({label}) and may cause a severe allergic reaction."
        )
    }

    /// Allergy matched through a cross-reactivity family.
    pub fn allergy_family(allergen: &str, drug: &str, family: &str) -> String {
        format!(
            "Patient is allergic to {allergen}. {drug} is in the {family} family and may cause a cross-reactive allergic reaction."
        )
    }

    /// Allergy the drug is declared to conflict with.
    pub fn allergy_declared(allergen: &str, drug: &str) -> String {
        format!(
            "Patient is allergic to {allergen}. {drug} is documented as conflicting with this allergy."
        )
    }

    pub fn interaction(name: &str, drug_names: &[String], description: &str) -> String {
        format!(
            "High risk of {name} when combining [{}]. {description}",
            drug_names.join(", ")
        )
        .trim_end()
        .to_string()
    }

    pub fn duplicate_therapy(class: &str) -> String {
        format!(
            "Duplicate therapy detected: Multiple {class} medications prescribed together. \
             This may lead to increased side effects or reduced efficacy."
        )
    }

    pub fn overall(score: f64) -> &'static str {
        if score >= 0.8 {
            "Overall: SAFE for this patient"
        } else if score >= 0.5 {
            "Overall: MODERATE risk - monitor closely"
        } else if score >= 0.2 {
            "Overall: HIGH risk - consider alternatives"
        } else {
            "Overall: CONTRAINDICATED - do not prescribe"
        }
    }
}
