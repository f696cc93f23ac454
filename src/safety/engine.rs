use std::time::Instant;

use uuid::Uuid;

use crate::models::{Drug, Interaction, Patient};
use crate::store::{order_by_ids, ClinicalStore};

use super::allergy::check_allergy;
use super::analysis::build_safety_analysis;
use super::interactions;
use super::scoring::SafetyScorer;
use super::types::{
    ConflictReport, PrescriptionCheck, SafetyAnalysis, SafetyAssessment, SafetyError, Warning,
};

/// Store-backed front for the allergy, interaction and scoring checks.
pub struct SafetyEngine<'a> {
    store: &'a dyn ClinicalStore,
    scorer: SafetyScorer,
}

impl<'a> SafetyEngine<'a> {
    pub fn new(store: &'a dyn ClinicalStore) -> Self {
        Self::with_scorer(store, SafetyScorer::for_today())
    }

    pub fn with_scorer(store: &'a dyn ClinicalStore, scorer: SafetyScorer) -> Self {
        Self { store, scorer }
    }

    pub fn scorer(&self) -> &SafetyScorer {
        &self.scorer
    }

    pub fn load_patient(&self, id: &Uuid) -> Result<Patient, SafetyError> {
        self.store
            .get_patient(id)?
            .ok_or(SafetyError::PatientNotFound(*id))
    }

    pub fn load_drug(&self, id: &Uuid) -> Result<Drug, SafetyError> {
        self.store.get_drug(id)?.ok_or(SafetyError::DrugNotFound(*id))
    }

    /// Rules that can possibly apply to the patient's regimen plus one more drug.
    pub fn rules_for(&self, patient: &Patient) -> Result<Vec<Interaction>, SafetyError> {
        let max = patient.active_medications.len() + 1;
        if max < 2 {
            return Ok(Vec::new());
        }
        Ok(self.store.list_interactions(max)?)
    }

    pub fn check_interactions(&self, patient: &Patient, candidate: &Drug) -> Result<Vec<Warning>, SafetyError> {
        let rules = self.rules_for(patient)?;
        Ok(interactions::check_interactions(patient, candidate, &rules))
    }

    /// Allergy checks only.
    pub fn check_allergy_only(&self, patient_id: &Uuid, drug_id: &Uuid) -> Result<ConflictReport, SafetyError> {
        let patient = self.load_patient(patient_id)?;
        let drug = self.load_drug(drug_id)?;
        Ok(ConflictReport::from_warnings(check_allergy(&patient, &drug)))
    }

    /// Allergy warnings followed by interaction warnings for one candidate drug.
    pub fn check_conflict(&self, patient_id: &Uuid, drug_id: &Uuid) -> Result<ConflictReport, SafetyError> {
        let patient = self.load_patient(patient_id)?;
        let drug = self.load_drug(drug_id)?;

        let mut warnings = check_allergy(&patient, &drug);
        warnings.extend(self.check_interactions(&patient, &drug)?);

        tracing::info!(
            patient_id = %patient.id,
            drug = %drug.name,
            active_medications = patient.active_medications.len(),
            warnings = warnings.len(),
            "Conflict check complete"
        );
        Ok(ConflictReport::from_warnings(warnings))
    }

    /// Pairwise interactions and duplicate therapy within a proposed list.
    pub fn check_prescription_list(
        &self,
        patient_id: &Uuid,
        drug_ids: &[Uuid],
    ) -> Result<PrescriptionCheck, SafetyError> {
        if drug_ids.is_empty() {
            return Err(SafetyError::InvalidInput("drug_ids must list at least one drug".into()));
        }
        self.load_patient(patient_id)?;

        let mut unique: Vec<Uuid> = Vec::new();
        for id in drug_ids {
            if !unique.contains(id) {
                unique.push(*id);
            }
        }
        if unique.len() < 2 {
            return Ok(PrescriptionCheck::empty());
        }

        let drugs = order_by_ids(self.store.get_drugs(&unique)?, &unique);
        if let Some(missing) = unique.iter().find(|id| !drugs.iter().any(|d| d.id == **id)) {
            return Err(SafetyError::DrugNotFound(*missing));
        }

        let rules = self.store.list_interactions(2)?;
        let check = interactions::check_prescription_list(&drugs, &rules);
        tracing::info!(
            drugs = drugs.len(),
            interactions = check.interactions.len(),
            duplicate_therapy = check.duplicate_therapy.len(),
            "Prescription list check complete"
        );
        Ok(check)
    }

    pub fn score(&self, drug: &Drug, patient: &Patient, condition: &str) -> Result<SafetyAssessment, SafetyError> {
        let rules = self.rules_for(patient)?;
        Ok(self.scorer.score(drug, patient, condition, &rules))
    }

    /// Condition-free safety review with flag-based warnings and recommendations.
    pub fn safety_analysis(&self, patient_id: &Uuid, drug_id: &Uuid) -> Result<SafetyAnalysis, SafetyError> {
        let start = Instant::now();
        let patient = self.load_patient(patient_id)?;
        let drug = self.load_drug(drug_id)?;

        let assessment = self.score(&drug, &patient, "")?;
        let allergy_warnings = check_allergy(&patient, &drug);
        let age = patient.age_on(self.scorer.today());
        let analysis = build_safety_analysis(&drug, &patient, age, assessment, &allergy_warnings);

        tracing::info!(
            patient_id = %patient.id,
            drug = %drug.name,
            safety_score = analysis.safety_score,
            is_safe = analysis.is_safe,
            processing_ms = start.elapsed().as_millis() as u64,
            "Safety analysis complete"
        );
        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::*;
    use crate::models::{Allergy, PatientAllergy, Prescription};
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    fn engine(store: &MemoryStore) -> SafetyEngine<'_> {
        SafetyEngine::with_scorer(store, SafetyScorer::new(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()))
    }

    fn rule(name: &str, severity: InteractionSeverity, drugs: &[&Drug]) -> Interaction {
        Interaction {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            severity,
            drugs: drugs.iter().map(|d| d.reference()).collect(),
        }
    }

    #[test]
    fn penicillin_allergy_blocks_amoxicillin() {
        let mut store = MemoryStore::new();
        let drug_id = store.add_drug(Drug::new("Amoxicillin", "antibiotic"));
        let mut patient = Patient::new("A", "B", Gender::Female);
        patient.allergies.push(PatientAllergy::new(Allergy::new("penicillin")));
        let patient_id = store.add_patient(patient);

        let report = engine(&store).check_conflict(&patient_id, &drug_id).unwrap();
        assert_eq!(report.status, CheckStatus::Conflict);
        assert_eq!(report.warnings[0].warning_type, WarningType::Allergy);
        assert_eq!(report.warnings[0].severity, WarningSeverity::High);
    }

    #[test]
    fn warfarin_patient_gets_aspirin_interaction() {
        let mut store = MemoryStore::new();
        let warfarin = Drug::new("Warfarin", "anticoagulant");
        let aspirin = Drug::new("Aspirin", "analgesic");
        store.add_interaction(rule("Bleeding", InteractionSeverity::Major, &[&warfarin, &aspirin]));
        let warfarin_id = store.add_drug(warfarin);
        let aspirin_id = store.add_drug(aspirin);
        let patient_id = store.add_patient(Patient::new("A", "B", Gender::Male));
        store.add_prescription(Prescription::new(patient_id, PrescriptionStatus::Active, vec![warfarin_id]));

        let report = engine(&store).check_conflict(&patient_id, &aspirin_id).unwrap();
        assert_eq!(report.status, CheckStatus::Conflict);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].warning_type, WarningType::MultiDrugInteraction);
    }

    #[test]
    fn three_drug_rule_reported_alone() {
        let mut store = MemoryStore::new();
        let a = Drug::new("DrugA", "x");
        let b = Drug::new("DrugB", "x");
        let c = Drug::new("DrugC", "x");
        store.add_interaction(rule("AB", InteractionSeverity::Moderate, &[&a, &b]));
        store.add_interaction(rule("ABC", InteractionSeverity::Contraindicated, &[&a, &b, &c]));
        let (a_id, b_id, c_id) = (store.add_drug(a), store.add_drug(b), store.add_drug(c));
        let patient_id = store.add_patient(Patient::new("A", "B", Gender::Male));
        store.add_prescription(Prescription::new(patient_id, PrescriptionStatus::Active, vec![a_id, b_id]));

        let report = engine(&store).check_conflict(&patient_id, &c_id).unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].message.contains("ABC"));
        assert_eq!(report.warnings[0].severity, WarningSeverity::Critical);
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let mut store = MemoryStore::new();
        let drug_id = store.add_drug(Drug::new("X", "y"));
        let patient_id = store.add_patient(Patient::new("A", "B", Gender::Male));
        let engine = engine(&store);

        assert!(matches!(
            engine.check_conflict(&Uuid::new_v4(), &drug_id),
            Err(SafetyError::PatientNotFound(_))
        ));
        assert!(matches!(
            engine.check_conflict(&patient_id, &Uuid::new_v4()),
            Err(SafetyError::DrugNotFound(_))
        ));
        assert!(matches!(
            engine.check_prescription_list(&patient_id, &[drug_id, Uuid::new_v4()]),
            Err(SafetyError::DrugNotFound(_))
        ));
    }

    #[test]
    fn prescription_list_under_two_is_empty() {
        let mut store = MemoryStore::new();
        let drug_id = store.add_drug(Drug::new("X", "y"));
        let patient_id = store.add_patient(Patient::new("A", "B", Gender::Male));
        let check = engine(&store)
            .check_prescription_list(&patient_id, &[drug_id, drug_id])
            .unwrap();
        assert_eq!(check.status, CheckStatus::Ok);
    }

    #[test]
    fn empty_prescription_list_is_invalid() {
        let mut store = MemoryStore::new();
        let patient_id = store.add_patient(Patient::new("A", "B", Gender::Male));
        let err = engine(&store).check_prescription_list(&patient_id, &[]).unwrap_err();
        assert!(matches!(err, SafetyError::InvalidInput(msg) if msg.contains("drug_ids")));
    }

    #[test]
    fn allergy_only_ignores_interactions() {
        let mut store = MemoryStore::new();
        let warfarin = Drug::new("Warfarin", "anticoagulant");
        let aspirin = Drug::new("Aspirin", "analgesic");
        store.add_interaction(rule("Bleeding", InteractionSeverity::Major, &[&warfarin, &aspirin]));
        let warfarin_id = store.add_drug(warfarin);
        let aspirin_id = store.add_drug(aspirin);
        let patient_id = store.add_patient(Patient::new("A", "B", Gender::Male));
        store.add_prescription(Prescription::new(patient_id, PrescriptionStatus::Active, vec![warfarin_id]));

        let report = engine(&store).check_allergy_only(&patient_id, &aspirin_id).unwrap();
        assert_eq!(report.status, CheckStatus::Ok);
    }

    #[test]
    fn safety_analysis_reports_patient_and_drug() {
        let mut store = MemoryStore::new();
        let drug_id = store.add_drug(Drug::new("Paracetamol", "analgesic"));
        let mut patient = Patient::new("Ana", "Lopez", Gender::Female);
        patient.date_of_birth = NaiveDate::from_ymd_opt(1990, 1, 1);
        let patient_id = store.add_patient(patient);

        let analysis = engine(&store).safety_analysis(&patient_id, &drug_id).unwrap();
        assert!(analysis.is_safe);
        assert_eq!(analysis.patient_info.age, Some(34));
        assert_eq!(analysis.drug_info.name, "Paracetamol");
        assert_eq!(analysis.patient_info.name, "Ana Lopez");
    }
}
