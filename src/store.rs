//! Read-side seam between the engines and persistence.
//!
//! The safety engine and the suggestion ensemble only ever read; they go
//! through `ClinicalStore` so the same logic runs against SQLite in the
//! service and against `MemoryStore` in tests.

use std::collections::HashMap;

use rusqlite::Connection;
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::models::*;

pub trait ClinicalStore {
    /// Patient with allergy records and active medications populated.
    fn get_patient(&self, id: &Uuid) -> Result<Option<Patient>, DatabaseError>;

    fn get_drug(&self, id: &Uuid) -> Result<Option<Drug>, DatabaseError>;

    /// Drugs for the given ids; unknown ids are omitted, order unspecified.
    fn get_drugs(&self, ids: &[Uuid]) -> Result<Vec<Drug>, DatabaseError>;

    /// Available drugs not in `exclude`.
    fn list_available_drugs(&self, exclude: &[Uuid]) -> Result<Vec<Drug>, DatabaseError>;

    /// Rules with at most `max_drug_count` drugs, ordered by descending drug count.
    fn list_interactions(&self, max_drug_count: usize) -> Result<Vec<Interaction>, DatabaseError>;

    /// Clustering input: same-gender patients other than the subject.
    fn find_similar_patients(
        &self,
        patient: &Patient,
        limit: usize,
    ) -> Result<Vec<Patient>, DatabaseError>;

    /// Drug ids from active or completed prescriptions of these patients, repeats kept.
    fn prescription_history(&self, patient_ids: &[Uuid]) -> Result<Vec<Uuid>, DatabaseError>;
}

// ═══════════════════════════════════════════════════════════
// SQLite
// ═══════════════════════════════════════════════════════════

/// `ClinicalStore` over a borrowed SQLite connection.
pub struct SqliteStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl ClinicalStore for SqliteStore<'_> {
    fn get_patient(&self, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
        db::get_patient(self.conn, id)
    }

    fn get_drug(&self, id: &Uuid) -> Result<Option<Drug>, DatabaseError> {
        db::get_drug(self.conn, id)
    }

    fn get_drugs(&self, ids: &[Uuid]) -> Result<Vec<Drug>, DatabaseError> {
        db::get_drugs_by_ids(self.conn, ids)
    }

    fn list_available_drugs(&self, exclude: &[Uuid]) -> Result<Vec<Drug>, DatabaseError> {
        db::list_available_drugs(self.conn, exclude)
    }

    fn list_interactions(&self, max_drug_count: usize) -> Result<Vec<Interaction>, DatabaseError> {
        db::list_interactions(self.conn, max_drug_count)
    }

    fn find_similar_patients(
        &self,
        patient: &Patient,
        limit: usize,
    ) -> Result<Vec<Patient>, DatabaseError> {
        db::list_patients_by_gender(self.conn, patient.gender, &patient.id, limit)
    }

    fn prescription_history(&self, patient_ids: &[Uuid]) -> Result<Vec<Uuid>, DatabaseError> {
        db::get_prescribed_drug_ids(self.conn, patient_ids)
    }
}

// ═══════════════════════════════════════════════════════════
// In-memory
// ═══════════════════════════════════════════════════════════

/// Vector-backed store. Active medications are derived from the held
/// prescriptions on every `get_patient`, matching the SQLite store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    drugs: Vec<Drug>,
    patients: Vec<Patient>,
    interactions: Vec<Interaction>,
    prescriptions: Vec<Prescription>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_drug(&mut self, drug: Drug) -> Uuid {
        let id = drug.id;
        self.drugs.push(drug);
        id
    }

    pub fn add_patient(&mut self, patient: Patient) -> Uuid {
        let id = patient.id;
        self.patients.push(patient);
        id
    }

    pub fn add_interaction(&mut self, interaction: Interaction) {
        self.interactions.push(interaction);
    }

    pub fn add_prescription(&mut self, prescription: Prescription) {
        self.prescriptions.push(prescription);
    }

    fn assemble(&self, patient: &Patient) -> Patient {
        let mut assembled = patient.clone();
        let mut active: Vec<Drug> = Vec::new();
        for prescription in self
            .prescriptions
            .iter()
            .filter(|p| p.patient_id == patient.id && p.status.is_current())
        {
            for drug_id in &prescription.drug_ids {
                if active.iter().any(|d| d.id == *drug_id) {
                    continue;
                }
                if let Some(drug) = self.drugs.iter().find(|d| d.id == *drug_id) {
                    active.push(drug.clone());
                }
            }
        }
        assembled.active_medications = active;
        assembled
    }
}

impl ClinicalStore for MemoryStore {
    fn get_patient(&self, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
        Ok(self
            .patients
            .iter()
            .find(|p| p.id == *id)
            .map(|p| self.assemble(p)))
    }

    fn get_drug(&self, id: &Uuid) -> Result<Option<Drug>, DatabaseError> {
        Ok(self.drugs.iter().find(|d| d.id == *id).cloned())
    }

    fn get_drugs(&self, ids: &[Uuid]) -> Result<Vec<Drug>, DatabaseError> {
        Ok(self
            .drugs
            .iter()
            .filter(|d| ids.contains(&d.id))
            .cloned()
            .collect())
    }

    fn list_available_drugs(&self, exclude: &[Uuid]) -> Result<Vec<Drug>, DatabaseError> {
        let mut drugs: Vec<Drug> = self
            .drugs
            .iter()
            .filter(|d| d.is_available() && !exclude.contains(&d.id))
            .cloned()
            .collect();
        drugs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(drugs)
    }

    fn list_interactions(&self, max_drug_count: usize) -> Result<Vec<Interaction>, DatabaseError> {
        let mut rules: Vec<Interaction> = self
            .interactions
            .iter()
            .filter(|i| i.size() <= max_drug_count)
            .cloned()
            .collect();
        rules.sort_by(|a, b| {
            b.size()
                .cmp(&a.size())
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(rules)
    }

    fn find_similar_patients(
        &self,
        patient: &Patient,
        limit: usize,
    ) -> Result<Vec<Patient>, DatabaseError> {
        Ok(self
            .patients
            .iter()
            .filter(|p| p.gender == patient.gender && p.id != patient.id)
            .take(limit)
            .map(|p| self.assemble(p))
            .collect())
    }

    fn prescription_history(&self, patient_ids: &[Uuid]) -> Result<Vec<Uuid>, DatabaseError> {
        Ok(self
            .prescriptions
            .iter()
            .filter(|p| patient_ids.contains(&p.patient_id) && p.status.counts_as_history())
            .flat_map(|p| p.drug_ids.iter().copied())
            .collect())
    }
}

/// Reorder `drugs` to follow `ids`, dropping duplicates. Used where request order is reported back.
pub fn order_by_ids(drugs: Vec<Drug>, ids: &[Uuid]) -> Vec<Drug> {
    let mut by_id: HashMap<Uuid, Drug> = drugs.into_iter().map(|d| (d.id, d)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::models::enums::*;

    fn interaction(name: &str, drugs: &[&Drug]) -> Interaction {
        Interaction {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            severity: InteractionSeverity::Moderate,
            drugs: drugs.iter().map(|d| d.reference()).collect(),
        }
    }

    #[test]
    fn memory_store_derives_active_medications() {
        let mut store = MemoryStore::new();
        let drug = Drug::new("Warfarin", "anticoagulant");
        let drug_id = store.add_drug(drug);
        let patient_id = store.add_patient(Patient::new("A", "B", Gender::Male));
        store.add_prescription(Prescription::new(patient_id, PrescriptionStatus::Active, vec![drug_id]));
        store.add_prescription(Prescription::new(patient_id, PrescriptionStatus::Active, vec![drug_id]));

        let patient = store.get_patient(&patient_id).unwrap().unwrap();
        assert_eq!(patient.active_medications.len(), 1);
    }

    #[test]
    fn memory_store_orders_interactions_by_size() {
        let mut store = MemoryStore::new();
        let a = Drug::new("A", "x");
        let b = Drug::new("B", "x");
        let c = Drug::new("C", "x");
        store.add_interaction(interaction("pair", &[&a, &b]));
        store.add_interaction(interaction("triple", &[&a, &b, &c]));

        let rules = store.list_interactions(3).unwrap();
        assert_eq!(rules[0].name, "triple");
        assert_eq!(store.list_interactions(2).unwrap().len(), 1);
    }

    #[test]
    fn memory_store_similar_patients_share_gender() {
        let mut store = MemoryStore::new();
        let subject = Patient::new("S", "S", Gender::Female);
        store.add_patient(subject.clone());
        store.add_patient(Patient::new("P", "P", Gender::Female));
        store.add_patient(Patient::new("M", "M", Gender::Male));

        let similar = store.find_similar_patients(&subject, 10).unwrap();
        assert_eq!(similar.len(), 1);
        assert_eq!(similar[0].gender, Gender::Female);
    }

    #[test]
    fn sqlite_store_reads_through_repository() {
        let conn = open_memory_database().unwrap();
        let drug = Drug::new("Ibuprofen", "analgesic");
        db::insert_drug(&conn, &drug).unwrap();

        let store = SqliteStore::new(&conn);
        assert!(store.get_drug(&drug.id).unwrap().is_some());
        assert_eq!(store.list_available_drugs(&[]).unwrap().len(), 1);
        assert!(store.get_patient(&Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn order_by_ids_follows_request() {
        let a = Drug::new("A", "x");
        let b = Drug::new("B", "x");
        let ids = vec![b.id, a.id, b.id];
        let ordered = order_by_ids(vec![a.clone(), b.clone()], &ids);
        assert_eq!(ordered.iter().map(|d| d.id).collect::<Vec<_>>(), vec![b.id, a.id]);
    }
}
