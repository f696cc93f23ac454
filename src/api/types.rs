//! Shared types for the HTTP layer.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::api::error::ApiError;
use crate::core_state::CoreState;

/// State handed to every handler via `State<ApiContext>`.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

/// Unwrap a JSON body, turning every rejection into a 400.
pub fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(value)| value).map_err(ApiError::from)
}

/// A field the request body must carry; an explicit `null` counts as missing.
pub fn required<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::BadRequest(format!("{field} is required")))
}
