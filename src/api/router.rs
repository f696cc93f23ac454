//! HTTP router.
//!
//! Returns a composable `Router` with every route nested under `/api/`.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the API router over shared state.
pub fn api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);

    // NOTE: Path params would use `:param` syntax (matchit 0.7 / axum 0.7).
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/conflicts/check", post(endpoints::conflicts::check))
        .route("/conflicts/allergy", post(endpoints::conflicts::allergy))
        .route("/prescriptions/check", post(endpoints::prescriptions::check))
        .route("/suggestions", post(endpoints::suggestions::suggest))
        .route("/suggestions/analysis", post(endpoints::suggestions::analysis))
        .route("/safety/analysis", post(endpoints::safety::analysis))
        .with_state(ctx);

    Router::new()
        .nest("/api", routes)
        .layer(TraceLayer::new_for_http())
}
