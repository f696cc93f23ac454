use std::str::FromStr;

use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{get_drug_allergy_conflicts, link_drug_allergy_conflict, parse_uuid, placeholders};
use crate::db::DatabaseError;
use crate::models::enums::Availability;
use crate::models::*;

const DRUG_COLUMNS: &str = "id, name, generic_name, strength, form, manufacturer, category,
     therapeutic_class, dosage_instructions, side_effects, contraindications,
     pediatric_dose_mg_kg, pregnancy_safe, breastfeeding_safe, pediatric_safe,
     geriatric_safe, availability, price";

/// Raw drug row before enum/uuid parsing and conflict loading.
struct DrugRow {
    id: String,
    name: String,
    generic_name: Option<String>,
    strength: Option<String>,
    form: Option<String>,
    manufacturer: Option<String>,
    category: String,
    therapeutic_class: Option<String>,
    dosage_instructions: Option<String>,
    side_effects: Option<String>,
    contraindications: Option<String>,
    pediatric_dose_mg_kg: Option<f64>,
    pregnancy_safe: i32,
    breastfeeding_safe: i32,
    pediatric_safe: i32,
    geriatric_safe: i32,
    availability: String,
    price: Option<f64>,
}

impl DrugRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            generic_name: row.get(2)?,
            strength: row.get(3)?,
            form: row.get(4)?,
            manufacturer: row.get(5)?,
            category: row.get(6)?,
            therapeutic_class: row.get(7)?,
            dosage_instructions: row.get(8)?,
            side_effects: row.get(9)?,
            contraindications: row.get(10)?,
            pediatric_dose_mg_kg: row.get(11)?,
            pregnancy_safe: row.get(12)?,
            breastfeeding_safe: row.get(13)?,
            pediatric_safe: row.get(14)?,
            geriatric_safe: row.get(15)?,
            availability: row.get(16)?,
            price: row.get(17)?,
        })
    }

    fn into_drug(self, conn: &Connection) -> Result<Drug, DatabaseError> {
        let id = parse_uuid(&self.id)?;
        let allergy_conflicts = get_drug_allergy_conflicts(conn, &id)?;
        Ok(Drug {
            id,
            name: self.name,
            generic_name: self.generic_name,
            strength: self.strength,
            form: self.form,
            manufacturer: self.manufacturer,
            category: self.category,
            therapeutic_class: self.therapeutic_class,
            dosage_instructions: self.dosage_instructions,
            side_effects: self.side_effects,
            contraindications: self.contraindications,
            pediatric_dose_mg_kg: self.pediatric_dose_mg_kg,
            pregnancy_safe: self.pregnancy_safe != 0,
            breastfeeding_safe: self.breastfeeding_safe != 0,
            pediatric_safe: self.pediatric_safe != 0,
            geriatric_safe: self.geriatric_safe != 0,
            availability: Availability::from_str(&self.availability)?,
            price: self.price,
            allergy_conflicts,
        })
    }
}

/// Insert a drug and its declared allergy conflicts.
/// Conflict allergens must already exist in `allergies`.
pub fn insert_drug(conn: &Connection, drug: &Drug) -> Result<(), DatabaseError> {
    conn.execute(
        &format!(
            "INSERT INTO drugs ({DRUG_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)"
        ),
        params![
            drug.id.to_string(),
            drug.name,
            drug.generic_name,
            drug.strength,
            drug.form,
            drug.manufacturer,
            drug.category,
            drug.therapeutic_class,
            drug.dosage_instructions,
            drug.side_effects,
            drug.contraindications,
            drug.pediatric_dose_mg_kg,
            drug.pregnancy_safe as i32,
            drug.breastfeeding_safe as i32,
            drug.pediatric_safe as i32,
            drug.geriatric_safe as i32,
            drug.availability.as_str(),
            drug.price,
        ],
    )?;
    for allergy in &drug.allergy_conflicts {
        link_drug_allergy_conflict(conn, &drug.id, &allergy.id)?;
    }
    Ok(())
}

pub fn get_drug(conn: &Connection, id: &Uuid) -> Result<Option<Drug>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {DRUG_COLUMNS} FROM drugs WHERE id = ?1"),
            params![id.to_string()],
            DrugRow::from_row,
        )
        .optional()?;
    row.map(|r| r.into_drug(conn)).transpose()
}

/// Fetch drugs by id, in catalog name order. Unknown ids are skipped.
pub fn get_drugs_by_ids(conn: &Connection, ids: &[Uuid]) -> Result<Vec<Drug>, DatabaseError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT {DRUG_COLUMNS} FROM drugs WHERE id IN ({}) ORDER BY name",
        placeholders(ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(ids.iter().map(|id| id.to_string())), DrugRow::from_row)?;
    let raw: Vec<DrugRow> = rows.collect::<Result<_, _>>()?;
    raw.into_iter().map(|r| r.into_drug(conn)).collect()
}

/// Available drugs not in `exclude`, in catalog name order.
pub fn list_available_drugs(conn: &Connection, exclude: &[Uuid]) -> Result<Vec<Drug>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DRUG_COLUMNS} FROM drugs WHERE availability = 'available' ORDER BY name"
    ))?;
    let rows = stmt.query_map([], DrugRow::from_row)?;
    let raw: Vec<DrugRow> = rows.collect::<Result<_, _>>()?;

    let mut drugs = Vec::with_capacity(raw.len());
    for row in raw {
        let drug = row.into_drug(conn)?;
        if !exclude.contains(&drug.id) {
            drugs.push(drug);
        }
    }
    Ok(drugs)
}

pub fn count_drugs(conn: &Connection) -> Result<i64, DatabaseError> {
    Ok(conn.query_row("SELECT COUNT(*) FROM drugs", [], |row| row.get(0))?)
}
