use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{get_active_medications, get_patient_allergies, insert_patient_allergy, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::Gender;
use crate::models::*;

/// Insert a patient and their explicit allergy records.
/// `active_medications` is derived from prescriptions and is not stored here.
pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    let declared = serde_json::to_string(&patient.declared_allergies)
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;
    conn.execute(
        "INSERT INTO patients (id, first_name, last_name, date_of_birth, gender, weight_kg,
         height_cm, is_pregnant, is_breastfeeding, medical_history, organ_function_notes,
         declared_allergies)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            patient.id.to_string(),
            patient.first_name,
            patient.last_name,
            patient.date_of_birth.map(|d| d.to_string()),
            patient.gender.as_str(),
            patient.weight_kg,
            patient.height_cm,
            patient.is_pregnant as i32,
            patient.is_breastfeeding as i32,
            patient.medical_history,
            patient.organ_function_notes,
            declared,
        ],
    )?;
    for record in &patient.allergies {
        insert_patient_allergy(conn, &patient.id, record)?;
    }
    Ok(())
}

/// Fully assembled patient: allergy records and active medications included.
pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, first_name, last_name, date_of_birth, gender, weight_kg, height_cm,
             is_pregnant, is_breastfeeding, medical_history, organ_function_notes,
             declared_allergies
             FROM patients WHERE id = ?1",
            params![id.to_string()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, Option<f64>>(5)?,
                    row.get::<_, Option<f64>>(6)?,
                    row.get::<_, i32>(7)?,
                    row.get::<_, i32>(8)?,
                    row.get::<_, Option<String>>(9)?,
                    row.get::<_, Option<String>>(10)?,
                    row.get::<_, String>(11)?,
                ))
            },
        )
        .optional()?;

    let Some((
        id,
        first_name,
        last_name,
        date_of_birth,
        gender,
        weight_kg,
        height_cm,
        is_pregnant,
        is_breastfeeding,
        medical_history,
        organ_function_notes,
        declared,
    )) = row
    else {
        return Ok(None);
    };

    let id = parse_uuid(&id)?;
    let declared_allergies: Vec<String> = serde_json::from_str(&declared)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("declared_allergies: {e}")))?;
    let date_of_birth = date_of_birth
        .map(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d"))
        .transpose()
        .map_err(|e| DatabaseError::ConstraintViolation(format!("date_of_birth: {e}")))?;

    Ok(Some(Patient {
        id,
        first_name,
        last_name,
        date_of_birth,
        gender: Gender::from_str(&gender)?,
        weight_kg,
        height_cm,
        is_pregnant: is_pregnant != 0,
        is_breastfeeding: is_breastfeeding != 0,
        medical_history,
        organ_function_notes,
        allergies: get_patient_allergies(conn, &id)?,
        declared_allergies,
        active_medications: get_active_medications(conn, &id)?,
    }))
}

/// Patients of the given gender other than `exclude`, assembled, at most `limit`.
pub fn list_patients_by_gender(
    conn: &Connection,
    gender: Gender,
    exclude: &Uuid,
    limit: usize,
) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id FROM patients
         WHERE gender = ?1 AND id != ?2
         ORDER BY last_name, first_name, id
         LIMIT ?3",
    )?;
    let ids: Vec<String> = stmt
        .query_map(
            params![gender.as_str(), exclude.to_string(), limit as i64],
            |row| row.get::<_, String>(0),
        )?
        .collect::<Result<_, _>>()?;

    let mut patients = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(patient) = get_patient(conn, &parse_uuid(&id)?)? {
            patients.push(patient);
        }
    }
    Ok(patients)
}
