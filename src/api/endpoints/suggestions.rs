//! Suggestion endpoints.
//!
//! - `POST /api/suggestions`: ranked suggestions for a condition
//! - `POST /api/suggestions/analysis`: weights, condition read-out, complexity and top three

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{body, required, ApiContext};
use crate::store::SqliteStore;
use crate::suggestions::{
    EnhancedAnalysis, SuggestionEngine, SuggestionOptions, SuggestionRequest, SuggestionResult,
};

#[derive(Debug, Deserialize)]
pub struct SuggestBody {
    pub patient_id: Option<Uuid>,
    pub condition: Option<String>,
    #[serde(default)]
    pub excluded_drug_ids: Vec<Uuid>,
    pub max_suggestions: Option<usize>,
    #[serde(default)]
    pub options: SuggestionOptions,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisBody {
    pub patient_id: Option<Uuid>,
    pub condition: Option<String>,
}

/// `POST /api/suggestions`
pub async fn suggest(
    State(ctx): State<ApiContext>,
    payload: Result<Json<SuggestBody>, JsonRejection>,
) -> Result<Json<SuggestionResult>, ApiError> {
    let req = body(payload)?;
    let request = SuggestionRequest {
        patient_id: required(req.patient_id, "patient_id")?,
        condition: required(req.condition, "condition")?,
        excluded_drug_ids: req.excluded_drug_ids,
        max_suggestions: req.max_suggestions,
        options: req.options,
    };

    let conn = ctx.core.lock_db()?;
    let store = SqliteStore::new(&conn);
    let result = SuggestionEngine::new(&store, ctx.core.config.clone()).suggest(&request)?;
    Ok(Json(result))
}

/// `POST /api/suggestions/analysis`
pub async fn analysis(
    State(ctx): State<ApiContext>,
    payload: Result<Json<AnalysisBody>, JsonRejection>,
) -> Result<Json<EnhancedAnalysis>, ApiError> {
    let req = body(payload)?;
    let patient_id = required(req.patient_id, "patient_id")?;
    let condition = required(req.condition, "condition")?;

    let conn = ctx.core.lock_db()?;
    let store = SqliteStore::new(&conn);
    let analysis = SuggestionEngine::new(&store, ctx.core.config.clone())
        .enhanced_analysis(&patient_id, &condition)?;
    Ok(Json(analysis))
}
