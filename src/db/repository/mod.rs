//! Repository layer: entity-scoped database operations.
//!
//! Every function takes a borrowed `Connection`; callers own transactions.

mod allergy;
mod drug;
mod interaction;
mod patient;
mod prescription;

use uuid::Uuid;

use super::DatabaseError;

pub use allergy::*;
pub use drug::*;
pub use interaction::*;
pub use patient::*;
pub use prescription::*;

pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

/// `?1, ?2, ... ?n` for dynamic IN lists.
pub(crate) fn placeholders(n: usize) -> String {
    (1..=n).map(|i| format!("?{i}")).collect::<Vec<_>>().join(", ")
}
