//! Goal handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::{AppError, AppState, CreatedResponse, SuccessResponse};
use finsight_core::models::{Goal, NewGoal};

/// Request body for updating goal progress
#[derive(Debug, Deserialize)]
pub struct GoalProgressRequest {
    /// Total amount saved toward the goal so far
    pub current_amount: f64,
}

/// POST /api/v1/goals - Create a savings goal
pub async fn create_goal(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewGoal>,
) -> Result<Json<CreatedResponse>, AppError> {
    let id = state.db.insert_goal(&body)?;
    Ok(Json(CreatedResponse { id }))
}

/// GET /api/v1/goals/:user_id - List a user's goals
pub async fn list_goals(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<Goal>>, AppError> {
    let goals = state.db.fetch_goals(user_id)?;
    Ok(Json(goals))
}

/// PATCH /api/v1/goals/progress/:goal_id - Update saved progress
///
/// A goal reaching its target amount is marked completed automatically.
pub async fn update_goal_progress(
    State(state): State<Arc<AppState>>,
    Path(goal_id): Path<i64>,
    Json(body): Json<GoalProgressRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.db.update_goal_progress(goal_id, body.current_amount)?;
    Ok(Json(SuccessResponse { success: true }))
}
