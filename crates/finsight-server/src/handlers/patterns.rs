//! Pattern recognition handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{AppError, AppState};
use finsight_core::patterns::{
    AnomalyReport, BehavioralPatterns, CategoryPatterns, CorrelationReport, Detection,
    PatternEngine, PatternReport, TemporalPatterns,
};

/// GET /api/v1/patterns/:user_id - Run all five pattern detectors
pub async fn detect_patterns(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<PatternReport>, AppError> {
    let engine = PatternEngine::new(&state.db);
    Ok(Json(engine.detect_all(user_id)?))
}

/// GET /api/v1/patterns/:user_id/spending - Category variability patterns
pub async fn spending_patterns(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Detection<CategoryPatterns>>, AppError> {
    let engine = PatternEngine::new(&state.db);
    Ok(Json(engine.spending_patterns(user_id)?))
}

/// GET /api/v1/patterns/:user_id/temporal - Day-of-week and hour-of-day habits
pub async fn temporal_patterns(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Detection<TemporalPatterns>>, AppError> {
    let engine = PatternEngine::new(&state.db);
    Ok(Json(engine.temporal_patterns(user_id)?))
}

/// GET /api/v1/patterns/:user_id/behavioral - Behavioral flags and recurring charges
pub async fn behavioral_patterns(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Detection<BehavioralPatterns>>, AppError> {
    let engine = PatternEngine::new(&state.db);
    Ok(Json(engine.behavioral_patterns(user_id)?))
}

/// GET /api/v1/patterns/:user_id/anomalies - IQR outliers and possible duplicates
pub async fn anomalies(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Detection<AnomalyReport>>, AppError> {
    let engine = PatternEngine::new(&state.db);
    Ok(Json(engine.anomalies(user_id)?))
}

/// GET /api/v1/patterns/:user_id/correlations - Cross-category weekly correlations
pub async fn correlations(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Detection<CorrelationReport>>, AppError> {
    let engine = PatternEngine::new(&state.db);
    Ok(Json(engine.correlations(user_id)?))
}
