use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{body, required, ApiContext};
use crate::safety::{PrescriptionCheck, SafetyEngine};
use crate::store::SqliteStore;

#[derive(Debug, Deserialize)]
pub struct PrescriptionCheckRequest {
    pub patient_id: Option<Uuid>,
    pub drug_ids: Option<Vec<Uuid>>,
}

/// `POST /api/prescriptions/check`: pairwise interactions and duplicate therapy in a proposed list.
pub async fn check(
    State(ctx): State<ApiContext>,
    payload: Result<Json<PrescriptionCheckRequest>, JsonRejection>,
) -> Result<Json<PrescriptionCheck>, ApiError> {
    let req = body(payload)?;
    let patient_id = required(req.patient_id, "patient_id")?;
    let drug_ids = required(req.drug_ids, "drug_ids")?;

    let conn = ctx.core.lock_db()?;
    let store = SqliteStore::new(&conn);
    let check = SafetyEngine::new(&store).check_prescription_list(&patient_id, &drug_ids)?;
    Ok(Json(check))
}
