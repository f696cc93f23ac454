//! Conflict endpoints.
//!
//! - `POST /api/conflicts/check`: allergy and interaction warnings for one candidate
//! - `POST /api/conflicts/allergy`: allergy warnings only

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{body, required, ApiContext};
use crate::safety::{ConflictReport, SafetyEngine};
use crate::store::SqliteStore;

#[derive(Debug, Deserialize)]
pub struct ConflictRequest {
    pub patient_id: Option<Uuid>,
    pub drug_id: Option<Uuid>,
}

impl ConflictRequest {
    fn ids(self) -> Result<(Uuid, Uuid), ApiError> {
        Ok((
            required(self.patient_id, "patient_id")?,
            required(self.drug_id, "drug_id")?,
        ))
    }
}

/// `POST /api/conflicts/check`
pub async fn check(
    State(ctx): State<ApiContext>,
    payload: Result<Json<ConflictRequest>, JsonRejection>,
) -> Result<Json<ConflictReport>, ApiError> {
    let (patient_id, drug_id) = body(payload)?.ids()?;

    let conn = ctx.core.lock_db()?;
    let store = SqliteStore::new(&conn);
    let report = SafetyEngine::new(&store).check_conflict(&patient_id, &drug_id)?;
    Ok(Json(report))
}

/// `POST /api/conflicts/allergy`
pub async fn allergy(
    State(ctx): State<ApiContext>,
    payload: Result<Json<ConflictRequest>, JsonRejection>,
) -> Result<Json<ConflictReport>, ApiError> {
    let (patient_id, drug_id) = body(payload)?.ids()?;

    let conn = ctx.core.lock_db()?;
    let store = SqliteStore::new(&conn);
    let report = SafetyEngine::new(&store).check_allergy_only(&patient_id, &drug_id)?;
    Ok(Json(report))
}
