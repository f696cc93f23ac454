use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::drug::DrugRef;
use super::enums::InteractionSeverity;

/// A named multi-drug interaction rule over a set of two or more drugs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub severity: InteractionSeverity,
    pub drugs: Vec<DrugRef>,
}

impl Interaction {
    pub fn drug_ids(&self) -> BTreeSet<Uuid> {
        self.drugs.iter().map(|d| d.id).collect()
    }

    /// Number of distinct drugs in the rule.
    pub fn size(&self) -> usize {
        self.drug_ids().len()
    }

    pub fn drug_names(&self) -> Vec<String> {
        self.drugs.iter().map(|d| d.name.clone()).collect()
    }
}
