//! Recommendation handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{AppError, AppState};
use finsight_core::recommend::{
    category_recommendations, CategoryReport, RecommendationReport, Recommender,
};

/// GET /api/v1/recommendations/:user_id - Top ranked recommendations
///
/// Runs all registered analyzers and returns up to the ten highest-priority
/// recommendations.
pub async fn get_recommendations(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<RecommendationReport>, AppError> {
    let recommender = Recommender::new();
    Ok(Json(recommender.recommend(&state.db, user_id)?))
}

/// GET /api/v1/recommendations/:user_id/category/:category - Category drill-down
pub async fn get_category_recommendations(
    State(state): State<Arc<AppState>>,
    Path((user_id, category)): Path<(i64, String)>,
) -> Result<Json<CategoryReport>, AppError> {
    Ok(Json(category_recommendations(
        &state.db, user_id, &category,
    )?))
}
