//! Analytics handlers
//!
//! Windowed analyses fetch the user's transactions and run one of the pure
//! analytics functions over them. Ratio analyses take the figures directly.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::{AppError, AppState};
use finsight_core::analytics::{
    self, BudgetVarianceAnalysis, CashFlowAnalysis, IncomeTrendAnalysis, SavingsRateAnalysis,
    SpendingPatternAnalysis,
};

fn default_period_days() -> u32 {
    30
}

fn default_trend_period_days() -> u32 {
    90
}

/// Request body for transaction-window analyses
#[derive(Debug, Deserialize)]
pub struct WindowedAnalysisRequest {
    pub user_id: i64,
    #[serde(default = "default_period_days")]
    pub period_days: u32,
}

/// Request body for income trend analysis
#[derive(Debug, Deserialize)]
pub struct IncomeTrendRequest {
    pub user_id: i64,
    #[serde(default = "default_trend_period_days")]
    pub period_days: u32,
}

/// Request body for savings rate analysis
#[derive(Debug, Deserialize)]
pub struct SavingsRateRequest {
    pub income: f64,
    pub expenses: f64,
    pub savings: f64,
    #[serde(default = "default_period_days")]
    pub period_days: u32,
}

/// Request body for budget variance analysis
#[derive(Debug, Deserialize)]
pub struct BudgetVarianceRequest {
    /// Budgeted amount per category; defines the comparison set
    pub budget: BTreeMap<String, f64>,
    /// Actual spending per category
    pub actual_spending: BTreeMap<String, f64>,
}

/// POST /api/v1/analytics/spending-patterns - Spending distribution and outliers
pub async fn analyze_spending_patterns(
    State(state): State<Arc<AppState>>,
    Json(body): Json<WindowedAnalysisRequest>,
) -> Result<Json<SpendingPatternAnalysis>, AppError> {
    let transactions = state.db.fetch_transactions(body.user_id, None, None, None)?;
    let analysis = analytics::analyze_spending_patterns(&transactions, body.period_days)?;
    Ok(Json(analysis))
}

/// POST /api/v1/analytics/income-trends - Income stability and monthly trend
pub async fn analyze_income_trends(
    State(state): State<Arc<AppState>>,
    Json(body): Json<IncomeTrendRequest>,
) -> Result<Json<IncomeTrendAnalysis>, AppError> {
    let transactions = state.db.fetch_transactions(body.user_id, None, None, None)?;
    let analysis = analytics::analyze_income_trends(&transactions, body.period_days)?;
    Ok(Json(analysis))
}

/// POST /api/v1/analytics/savings-rate - Savings rate against the 20% target
pub async fn calculate_savings_rate(
    Json(body): Json<SavingsRateRequest>,
) -> Result<Json<SavingsRateAnalysis>, AppError> {
    let analysis = analytics::calculate_savings_rate(
        body.income,
        body.expenses,
        body.savings,
        body.period_days,
    )?;
    Ok(Json(analysis))
}

/// POST /api/v1/analytics/budget-variance - Budget vs actual by category
pub async fn analyze_budget_variance(
    Json(body): Json<BudgetVarianceRequest>,
) -> Result<Json<BudgetVarianceAnalysis>, AppError> {
    let analysis = analytics::analyze_budget_variance(&body.budget, &body.actual_spending)?;
    Ok(Json(analysis))
}

/// POST /api/v1/analytics/cash-flow - Daily signed cash flow
pub async fn analyze_cash_flow(
    State(state): State<Arc<AppState>>,
    Json(body): Json<WindowedAnalysisRequest>,
) -> Result<Json<CashFlowAnalysis>, AppError> {
    let transactions = state.db.fetch_transactions(body.user_id, None, None, None)?;
    let analysis = analytics::analyze_cash_flow(&transactions, body.period_days)?;
    Ok(Json(analysis))
}
