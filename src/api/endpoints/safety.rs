use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{body, required, ApiContext};
use crate::safety::{SafetyAnalysis, SafetyEngine};
use crate::store::SqliteStore;

#[derive(Debug, Deserialize)]
pub struct SafetyAnalysisRequest {
    pub patient_id: Option<Uuid>,
    pub drug_id: Option<Uuid>,
}

/// `POST /api/safety/analysis`
pub async fn analysis(
    State(ctx): State<ApiContext>,
    payload: Result<Json<SafetyAnalysisRequest>, JsonRejection>,
) -> Result<Json<SafetyAnalysis>, ApiError> {
    let req = body(payload)?;
    let patient_id = required(req.patient_id, "patient_id")?;
    let drug_id = required(req.drug_id, "drug_id")?;

    let conn = ctx.core.lock_db()?;
    let store = SqliteStore::new(&conn);
    let analysis = SafetyEngine::new(&store).safety_analysis(&patient_id, &drug_id)?;
    Ok(Json(analysis))
}
