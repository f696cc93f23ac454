//! HTTP surface for the safety and suggestion engines.
//!
//! Routes are nested under `/api/` and exchange JSON. Errors always come
//! back as `{"error": {"code", "message"}}`.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_api_server, ApiServer};
pub use types::ApiContext;
