//! Prescribing safety: allergy conflicts, interaction subset matching,
//! duplicate therapy and the multiplicative safety score.

pub mod allergy;
pub mod analysis;
pub mod engine;
pub mod helpers;
pub mod interactions;
pub mod messages;
pub mod reference;
pub mod scoring;
pub mod types;

pub use allergy::{check_allergy, has_allergy_conflict};
pub use analysis::{analyze_condition, analyze_patient_complexity};
pub use engine::SafetyEngine;
pub use interactions::{check_interactions, check_prescription_list, match_interactions};
pub use scoring::SafetyScorer;
pub use types::*;
