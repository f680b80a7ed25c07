//! Result records for the predictive engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stats::Trend;

/// A completed prediction, as stored in the engine's bounded history
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "prediction_type", rename_all = "snake_case")]
pub enum Prediction {
    SpendingForecast(SpendingForecast),
    IncomeForecast(IncomeForecast),
    SavingsProjection(SavingsProjection),
    GoalAchievement(GoalAchievement),
    FinancialHealth(FinancialHealth),
    AnomalyPrediction(AnomalyPrediction),
}

/// Interval around one forecast point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower_bound: f64,
    pub point_estimate: f64,
    pub upper_bound: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendingForecast {
    pub forecast_days: u32,
    pub historical_average: f64,
    pub historical_std_dev: f64,
    pub forecast_values: Vec<f64>,
    pub confidence_intervals: Vec<ConfidenceInterval>,
    pub confidence_level: f64,
    pub total_forecasted_spending: f64,
    pub average_daily_forecast: f64,
    pub trend: Trend,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeForecast {
    pub forecast_months: u32,
    pub historical_average: f64,
    pub historical_std_dev: f64,
    pub trend_slope: f64,
    pub forecast_values: Vec<f64>,
    pub confidence_intervals: Vec<ConfidenceInterval>,
    pub confidence_level: f64,
    pub total_forecasted_income: f64,
    pub average_monthly_forecast: f64,
    pub trend_direction: TrendDirection,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsProjection {
    pub current_savings: f64,
    pub monthly_contribution: f64,
    pub annual_return_rate: f64,
    pub projection_months: u32,
    pub projected_values: Vec<f64>,
    pub final_amount: f64,
    pub total_contributed: f64,
    pub total_interest_earned: f64,
    pub average_monthly_growth: f64,
    pub generated_at: DateTime<Utc>,
}

/// How likely a goal is to be met by its deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AchievementStatus {
    #[serde(rename = "On Track")]
    OnTrack,
    #[serde(rename = "Slightly Behind")]
    SlightlyBehind,
    #[serde(rename = "Behind Schedule")]
    BehindSchedule,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalAchievement {
    pub goal_amount: f64,
    pub current_progress: f64,
    pub remaining_amount: f64,
    pub current_monthly_contribution: f64,
    pub required_monthly_contribution: f64,
    /// None when the contribution is 0 and the goal is unreachable
    pub months_needed_at_current_rate: Option<f64>,
    pub goal_deadline_months: u32,
    pub achievement_probability: f64,
    pub achievement_status: AchievementStatus,
    pub projected_completion_date: Option<DateTime<Utc>>,
    pub recommendation: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthCategory {
    Excellent,
    Good,
    Fair,
    Poor,
}

/// Ratios underlying the health score
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HealthMetrics {
    pub savings_rate: f64,
    pub expense_ratio: f64,
    pub debt_to_income_ratio: f64,
    pub emergency_fund_months: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialHealth {
    pub current_health_score: f64,
    pub health_category: HealthCategory,
    pub metrics: HealthMetrics,
    pub projected_health_score: f64,
    pub projected_health_category: HealthCategory,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyPrediction {
    pub historical_mean: f64,
    pub historical_std_dev: f64,
    pub anomaly_threshold: f64,
    pub sensitivity: f64,
    pub anomaly_probability: f64,
    pub risk_level: RiskLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub generated_at: DateTime<Utc>,
}
