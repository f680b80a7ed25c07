//! HTTP request handlers

pub mod agents;
pub mod analytics;
pub mod goals;
pub mod patterns;
pub mod predictions;
pub mod recommendations;
pub mod transactions;

pub use agents::*;
pub use analytics::*;
pub use goals::*;
pub use patterns::*;
pub use predictions::*;
pub use recommendations::*;
pub use transactions::*;

use axum::Json;

/// GET /api/v1/health - Liveness probe
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
