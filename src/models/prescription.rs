use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::PrescriptionStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub status: PrescriptionStatus,
    pub drug_ids: Vec<Uuid>,
    pub created_at: NaiveDateTime,
}

impl Prescription {
    pub fn new(patient_id: Uuid, status: PrescriptionStatus, drug_ids: Vec<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id,
            status,
            drug_ids,
            created_at: chrono::Local::now().naive_local(),
        }
    }
}
