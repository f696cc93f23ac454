use rusqlite::{params, params_from_iter, Connection};
use uuid::Uuid;

use super::{get_drugs_by_ids, parse_uuid, placeholders};
use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_prescription(conn: &Connection, prescription: &Prescription) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO prescriptions (id, patient_id, status, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            prescription.id.to_string(),
            prescription.patient_id.to_string(),
            prescription.status.as_str(),
            prescription.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;
    for (position, drug_id) in prescription.drug_ids.iter().enumerate() {
        conn.execute(
            "INSERT OR IGNORE INTO prescription_medications (prescription_id, drug_id, position)
             VALUES (?1, ?2, ?3)",
            params![prescription.id.to_string(), drug_id.to_string(), position as i64],
        )?;
    }
    Ok(())
}

/// Drugs on the patient's active prescriptions, one entry per distinct drug.
pub fn get_active_medications(conn: &Connection, patient_id: &Uuid) -> Result<Vec<Drug>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT pm.drug_id
         FROM prescriptions p
         JOIN prescription_medications pm ON pm.prescription_id = p.id
         WHERE p.patient_id = ?1 AND p.status = 'active'",
    )?;
    let ids: Vec<String> = stmt
        .query_map(params![patient_id.to_string()], |row| row.get::<_, String>(0))?
        .collect::<Result<_, _>>()?;
    let ids = ids
        .iter()
        .map(|id| parse_uuid(id))
        .collect::<Result<Vec<_>, _>>()?;
    get_drugs_by_ids(conn, &ids)
}

/// Drug ids prescribed to any of `patient_ids` on active or completed prescriptions.
/// One entry per prescription line, so frequent drugs repeat.
pub fn get_prescribed_drug_ids(
    conn: &Connection,
    patient_ids: &[Uuid],
) -> Result<Vec<Uuid>, DatabaseError> {
    if patient_ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT pm.drug_id
         FROM prescriptions p
         JOIN prescription_medications pm ON pm.prescription_id = p.id
         WHERE p.status IN ('active', 'completed') AND p.patient_id IN ({})
         ORDER BY p.created_at, pm.position",
        placeholders(patient_ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let ids: Vec<String> = stmt
        .query_map(
            params_from_iter(patient_ids.iter().map(|id| id.to_string())),
            |row| row.get::<_, String>(0),
        )?
        .collect::<Result<_, _>>()?;
    ids.iter().map(|id| parse_uuid(id)).collect()
}
