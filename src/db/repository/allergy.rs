use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::parse_uuid;
use crate::db::DatabaseError;
use crate::models::enums::AllergySeverity;
use crate::models::*;

pub fn insert_allergy(conn: &Connection, allergy: &Allergy) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO allergies (id, name, description) VALUES (?1, ?2, ?3)",
        params![allergy.id.to_string(), allergy.name, allergy.description],
    )?;
    Ok(())
}

/// Case-insensitive lookup by allergen name.
pub fn get_allergy_by_name(conn: &Connection, name: &str) -> Result<Option<Allergy>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, name, description FROM allergies WHERE name = ?1 COLLATE NOCASE",
            params![name.trim()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            },
        )
        .optional()?;

    match row {
        Some((id, name, description)) => Ok(Some(Allergy {
            id: parse_uuid(&id)?,
            name,
            description,
        })),
        None => Ok(None),
    }
}

pub fn list_allergies(conn: &Connection) -> Result<Vec<Allergy>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT id, name, description FROM allergies ORDER BY name")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
        ))
    })?;

    let mut allergies = Vec::new();
    for row in rows {
        let (id, name, description) = row?;
        allergies.push(Allergy {
            id: parse_uuid(&id)?,
            name,
            description,
        });
    }
    Ok(allergies)
}

/// Allergens a drug is declared to conflict with.
pub fn get_drug_allergy_conflicts(
    conn: &Connection,
    drug_id: &Uuid,
) -> Result<Vec<Allergy>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT a.id, a.name, a.description
         FROM drug_allergy_conflicts dac
         JOIN allergies a ON a.id = dac.allergy_id
         WHERE dac.drug_id = ?1
         ORDER BY a.name",
    )?;
    let rows = stmt.query_map(params![drug_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
        ))
    })?;

    let mut allergies = Vec::new();
    for row in rows {
        let (id, name, description) = row?;
        allergies.push(Allergy {
            id: parse_uuid(&id)?,
            name,
            description,
        });
    }
    Ok(allergies)
}

pub fn link_drug_allergy_conflict(
    conn: &Connection,
    drug_id: &Uuid,
    allergy_id: &Uuid,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT OR IGNORE INTO drug_allergy_conflicts (drug_id, allergy_id) VALUES (?1, ?2)",
        params![drug_id.to_string(), allergy_id.to_string()],
    )?;
    Ok(())
}

pub fn insert_patient_allergy(
    conn: &Connection,
    patient_id: &Uuid,
    record: &PatientAllergy,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patient_allergies (patient_id, allergy_id, severity, reaction, date_noted)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            patient_id.to_string(),
            record.allergy.id.to_string(),
            record.severity.map(|s| s.as_str()),
            record.reaction,
            record.date_noted.map(|d| d.to_string()),
        ],
    )?;
    Ok(())
}

pub fn get_patient_allergies(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<PatientAllergy>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT a.id, a.name, a.description, pa.severity, pa.reaction, pa.date_noted
         FROM patient_allergies pa
         JOIN allergies a ON a.id = pa.allergy_id
         WHERE pa.patient_id = ?1
         ORDER BY a.name",
    )?;
    let rows = stmt.query_map(params![patient_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, Option<String>>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, Option<String>>(5)?,
        ))
    })?;

    let mut records = Vec::new();
    for row in rows {
        let (id, name, description, severity, reaction, date_noted) = row?;
        records.push(PatientAllergy {
            allergy: Allergy {
                id: parse_uuid(&id)?,
                name,
                description,
            },
            severity: severity.as_deref().map(AllergySeverity::from_str).transpose()?,
            reaction,
            date_noted: date_noted.and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        });
    }
    Ok(records)
}
