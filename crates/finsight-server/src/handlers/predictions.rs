//! Prediction handlers
//!
//! Each route feeds caller-supplied series or snapshot figures into the
//! shared [`PredictiveEngine`] and returns the typed prediction record.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::{AppError, AppState};
use finsight_core::forecast::{
    AnomalyPrediction, FinancialHealth, GoalAchievement, IncomeForecast, Prediction,
    SavingsProjection, SpendingForecast,
};

fn default_forecast_days() -> u32 {
    30
}

fn default_forecast_months() -> u32 {
    6
}

fn default_confidence_level() -> f64 {
    0.95
}

fn default_return_rate() -> f64 {
    0.05
}

fn default_projection_months() -> u32 {
    12
}

fn default_sensitivity() -> f64 {
    2.0
}

/// Request body for spending forecasts
#[derive(Debug, Deserialize)]
pub struct SpendingForecastRequest {
    /// Daily spending totals, oldest first (at least 7)
    pub historical_spending: Vec<f64>,
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u32,
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,
}

/// Request body for income forecasts
#[derive(Debug, Deserialize)]
pub struct IncomeForecastRequest {
    /// Monthly income totals, oldest first (at least 3)
    pub historical_income: Vec<f64>,
    #[serde(default = "default_forecast_months")]
    pub forecast_months: u32,
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,
}

/// Request body for savings projections
#[derive(Debug, Deserialize)]
pub struct SavingsProjectionRequest {
    pub current_savings: f64,
    pub monthly_contribution: f64,
    #[serde(default = "default_return_rate")]
    pub annual_return_rate: f64,
    #[serde(default = "default_projection_months")]
    pub projection_months: u32,
}

/// Request body for goal achievement predictions
#[derive(Debug, Deserialize)]
pub struct GoalAchievementRequest {
    pub goal_amount: f64,
    pub current_progress: f64,
    pub monthly_contribution: f64,
    pub goal_deadline_months: u32,
}

/// Request body for financial health assessments
#[derive(Debug, Deserialize)]
pub struct FinancialHealthRequest {
    pub income: f64,
    pub expenses: f64,
    pub savings: f64,
    pub debt: f64,
    pub emergency_fund: f64,
}

/// Request body for anomaly likelihood predictions
#[derive(Debug, Deserialize)]
pub struct AnomalyPredictionRequest {
    /// Daily spending totals (at least 7)
    pub historical_data: Vec<f64>,
    /// Z-score threshold multiplier; lower is more sensitive
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f64,
}

/// POST /api/v1/predictions/spending-forecast - Forecast daily spending
pub async fn forecast_spending(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SpendingForecastRequest>,
) -> Result<Json<SpendingForecast>, AppError> {
    let mut engine = state
        .predictive
        .lock()
        .map_err(|_| AppError::internal("Prediction engine unavailable"))?;

    let forecast = engine.forecast_spending(
        &body.historical_spending,
        body.forecast_days,
        body.confidence_level,
    )?;

    Ok(Json(forecast))
}

/// POST /api/v1/predictions/income-forecast - Forecast monthly income
pub async fn forecast_income(
    State(state): State<Arc<AppState>>,
    Json(body): Json<IncomeForecastRequest>,
) -> Result<Json<IncomeForecast>, AppError> {
    let mut engine = state
        .predictive
        .lock()
        .map_err(|_| AppError::internal("Prediction engine unavailable"))?;

    let forecast = engine.forecast_income(
        &body.historical_income,
        body.forecast_months,
        body.confidence_level,
    )?;

    Ok(Json(forecast))
}

/// POST /api/v1/predictions/savings-projection - Project compounded savings
pub async fn project_savings(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SavingsProjectionRequest>,
) -> Result<Json<SavingsProjection>, AppError> {
    let mut engine = state
        .predictive
        .lock()
        .map_err(|_| AppError::internal("Prediction engine unavailable"))?;

    let projection = engine.project_savings(
        body.current_savings,
        body.monthly_contribution,
        body.annual_return_rate,
        body.projection_months,
    )?;

    Ok(Json(projection))
}

/// POST /api/v1/predictions/goal-achievement - Predict goal achievement odds
pub async fn predict_goal_achievement(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GoalAchievementRequest>,
) -> Result<Json<GoalAchievement>, AppError> {
    let mut engine = state
        .predictive
        .lock()
        .map_err(|_| AppError::internal("Prediction engine unavailable"))?;

    let prediction = engine.predict_goal_achievement(
        body.goal_amount,
        body.current_progress,
        body.monthly_contribution,
        body.goal_deadline_months,
    )?;

    Ok(Json(prediction))
}

/// POST /api/v1/predictions/financial-health - Score overall financial health
pub async fn assess_financial_health(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FinancialHealthRequest>,
) -> Result<Json<FinancialHealth>, AppError> {
    let mut engine = state
        .predictive
        .lock()
        .map_err(|_| AppError::internal("Prediction engine unavailable"))?;

    let health = engine.assess_financial_health(
        body.income,
        body.expenses,
        body.savings,
        body.debt,
        body.emergency_fund,
    )?;

    Ok(Json(health))
}

/// POST /api/v1/predictions/anomalies - Estimate anomaly likelihood
pub async fn predict_anomalies(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AnomalyPredictionRequest>,
) -> Result<Json<AnomalyPrediction>, AppError> {
    let mut engine = state
        .predictive
        .lock()
        .map_err(|_| AppError::internal("Prediction engine unavailable"))?;

    let prediction = engine.predict_anomalies(&body.historical_data, body.sensitivity)?;

    Ok(Json(prediction))
}

/// GET /api/v1/predictions/history - Past predictions, oldest first
pub async fn prediction_history(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Prediction>>, AppError> {
    let engine = state
        .predictive
        .lock()
        .map_err(|_| AppError::internal("Prediction engine unavailable"))?;

    Ok(Json(engine.history().cloned().collect()))
}
