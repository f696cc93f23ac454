use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub drugs: i64,
}

/// `GET /api/health`: liveness plus a catalog size read to prove the database answers.
pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    let drugs = {
        let conn = ctx.core.lock_db()?;
        db::count_drugs(&conn).map_err(|e| ApiError::Internal(e.to_string()))?
    };

    Ok(Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        drugs,
    }))
}
