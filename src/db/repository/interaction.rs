use std::collections::HashMap;
use std::str::FromStr;

use rusqlite::{params, Connection};

use super::parse_uuid;
use crate::db::DatabaseError;
use crate::models::enums::InteractionSeverity;
use crate::models::*;

/// Insert an interaction rule and its drug membership.
pub fn insert_interaction(conn: &Connection, interaction: &Interaction) -> Result<(), DatabaseError> {
    if interaction.size() < 2 {
        return Err(DatabaseError::ConstraintViolation(format!(
            "interaction '{}' must involve at least two distinct drugs",
            interaction.name
        )));
    }
    conn.execute(
        "INSERT INTO interactions (id, name, description, severity) VALUES (?1, ?2, ?3, ?4)",
        params![
            interaction.id.to_string(),
            interaction.name,
            interaction.description,
            interaction.severity.as_str(),
        ],
    )?;
    for drug in &interaction.drugs {
        conn.execute(
            "INSERT OR IGNORE INTO interaction_drugs (interaction_id, drug_id) VALUES (?1, ?2)",
            params![interaction.id.to_string(), drug.id.to_string()],
        )?;
    }
    Ok(())
}

/// Interaction rules with at most `max_drug_count` drugs, largest rules first.
/// Ties keep a stable order by name so repeated checks report identically.
pub fn list_interactions(
    conn: &Connection,
    max_drug_count: usize,
) -> Result<Vec<Interaction>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT i.id, i.name, i.description, i.severity, COUNT(idr.drug_id) AS drug_count
         FROM interactions i
         JOIN interaction_drugs idr ON idr.interaction_id = i.id
         GROUP BY i.id
         HAVING drug_count <= ?1
         ORDER BY drug_count DESC, i.name, i.id",
    )?;
    let rows = stmt.query_map(params![max_drug_count as i64], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
        ))
    })?;

    let mut interactions = Vec::new();
    for row in rows {
        let (id, name, description, severity) = row?;
        interactions.push(Interaction {
            id: parse_uuid(&id)?,
            name,
            description,
            severity: InteractionSeverity::from_str(&severity)?,
            drugs: Vec::new(),
        });
    }
    if interactions.is_empty() {
        return Ok(interactions);
    }

    let mut members: HashMap<String, Vec<DrugRef>> = HashMap::new();
    let mut stmt = conn.prepare(
        "SELECT idr.interaction_id, d.id, d.name
         FROM interaction_drugs idr
         JOIN drugs d ON d.id = idr.drug_id
         ORDER BY d.name",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;
    for row in rows {
        let (interaction_id, drug_id, drug_name) = row?;
        members.entry(interaction_id).or_default().push(DrugRef {
            id: parse_uuid(&drug_id)?,
            name: drug_name,
        });
    }

    for interaction in &mut interactions {
        interaction.drugs = members
            .remove(&interaction.id.to_string())
            .unwrap_or_default();
    }
    Ok(interactions)
}
