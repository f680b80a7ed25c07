//! Predictive Insights Engine
//!
//! Forecasting and scoring over caller-supplied series: spending and income
//! forecasts, compound savings projections, goal achievement odds, financial
//! health scoring, and anomaly likelihood. Every successful call is appended
//! to a bounded prediction history.

use std::collections::VecDeque;

use chrono::{Duration, Utc};

use crate::error::{Error, Result};
use crate::stats;

mod types;

pub use types::{
    AchievementStatus, AnomalyPrediction, ConfidenceInterval, FinancialHealth, GoalAchievement,
    HealthCategory, HealthMetrics, IncomeForecast, Prediction, RiskLevel, SavingsProjection,
    SpendingForecast, TrendDirection,
};

/// Default bound on the retained prediction history
pub const DEFAULT_HISTORY_CAPACITY: usize = 128;

/// Smoothing factor for exponential smoothing forecasts
const SMOOTHING_ALPHA: f64 = 0.3;

/// Minimum daily samples for spending and anomaly predictions
const MIN_DAILY_SAMPLES: usize = 7;
/// Minimum monthly samples for income forecasts
const MIN_MONTHLY_SAMPLES: usize = 3;

/// Forecasting engine with a bounded record of past predictions
pub struct PredictiveEngine {
    history: VecDeque<Prediction>,
    history_capacity: usize,
}

impl Default for PredictiveEngine {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl PredictiveEngine {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(history_capacity.min(DEFAULT_HISTORY_CAPACITY)),
            history_capacity,
        }
    }

    /// Past predictions, oldest first
    pub fn history(&self) -> impl Iterator<Item = &Prediction> {
        self.history.iter()
    }

    pub fn history_capacity(&self) -> usize {
        self.history_capacity
    }

    fn record(&mut self, prediction: Prediction) {
        while self.history.len() >= self.history_capacity.max(1) {
            self.history.pop_front();
        }
        if self.history_capacity > 0 {
            self.history.push_back(prediction);
        }
    }

    /// Forecast daily spending by exponential smoothing
    ///
    /// The forecast is the smoothed level repeated for each future day, the
    /// standard flat prediction of simple exponential smoothing.
    pub fn forecast_spending(
        &mut self,
        historical_spending: &[f64],
        forecast_days: u32,
        confidence_level: f64,
    ) -> Result<SpendingForecast> {
        if historical_spending.len() < MIN_DAILY_SAMPLES {
            return Err(Error::InsufficientData(format!(
                "Spending forecast needs at least {} daily samples, got {}",
                MIN_DAILY_SAMPLES,
                historical_spending.len()
            )));
        }

        let mean = stats::mean(historical_spending);
        let std_dev = stats::sample_std_dev(historical_spending);

        let level = exponential_smoothing_level(historical_spending, SMOOTHING_ALPHA);
        let forecast_values: Vec<f64> = std::iter::repeat(level)
            .take(forecast_days as usize)
            .collect();

        let confidence_intervals =
            confidence_intervals(&forecast_values, std_dev, confidence_level);

        let result = SpendingForecast {
            forecast_days,
            historical_average: mean,
            historical_std_dev: std_dev,
            total_forecasted_spending: forecast_values.iter().sum(),
            average_daily_forecast: stats::mean(&forecast_values),
            trend: stats::classify_trend(&forecast_values),
            forecast_values,
            confidence_intervals,
            confidence_level,
            generated_at: Utc::now(),
        };

        self.record(Prediction::SpendingForecast(result.clone()));
        Ok(result)
    }

    /// Forecast monthly income by linear trend extrapolation
    pub fn forecast_income(
        &mut self,
        historical_income: &[f64],
        forecast_months: u32,
        confidence_level: f64,
    ) -> Result<IncomeForecast> {
        if historical_income.len() < MIN_MONTHLY_SAMPLES {
            return Err(Error::InsufficientData(format!(
                "Income forecast needs at least {} monthly samples, got {}",
                MIN_MONTHLY_SAMPLES,
                historical_income.len()
            )));
        }

        let mean = stats::mean(historical_income);
        let std_dev = stats::sample_std_dev(historical_income);
        let slope = stats::trend_slope(historical_income);

        let forecast_values: Vec<f64> = (0..forecast_months)
            .map(|i| (mean + slope * i as f64).max(0.0))
            .collect();

        let confidence_intervals =
            confidence_intervals(&forecast_values, std_dev, confidence_level);

        let result = IncomeForecast {
            forecast_months,
            historical_average: mean,
            historical_std_dev: std_dev,
            trend_slope: slope,
            total_forecasted_income: forecast_values.iter().sum(),
            average_monthly_forecast: stats::mean(&forecast_values),
            trend_direction: if slope > 0.0 {
                TrendDirection::Increasing
            } else {
                TrendDirection::Decreasing
            },
            forecast_values,
            confidence_intervals,
            confidence_level,
            generated_at: Utc::now(),
        };

        self.record(Prediction::IncomeForecast(result.clone()));
        Ok(result)
    }

    /// Project savings growth with monthly compounding
    ///
    /// Each month adds the contribution and then applies one month of return.
    pub fn project_savings(
        &mut self,
        current_savings: f64,
        monthly_contribution: f64,
        annual_return_rate: f64,
        projection_months: u32,
    ) -> Result<SavingsProjection> {
        if current_savings < 0.0 || monthly_contribution < 0.0 {
            return Err(Error::InvalidInput(
                "Savings and contribution must be non-negative".into(),
            ));
        }

        let monthly_return = annual_return_rate / 12.0;
        let mut projected_values = Vec::with_capacity(projection_months as usize);
        let mut amount = current_savings;
        for _ in 0..projection_months {
            amount += monthly_contribution;
            amount *= 1.0 + monthly_return;
            projected_values.push(amount);
        }

        let final_amount = projected_values.last().copied().unwrap_or(current_savings);
        let total_contributed =
            current_savings + monthly_contribution * projection_months as f64;

        let monthly_growth: Vec<f64> = projected_values
            .windows(2)
            .map(|pair| pair[1] - pair[0])
            .collect();

        let result = SavingsProjection {
            current_savings,
            monthly_contribution,
            annual_return_rate,
            projection_months,
            final_amount,
            total_contributed,
            total_interest_earned: if projected_values.is_empty() {
                0.0
            } else {
                final_amount - total_contributed
            },
            average_monthly_growth: stats::mean(&monthly_growth),
            projected_values,
            generated_at: Utc::now(),
        };

        self.record(Prediction::SavingsProjection(result.clone()));
        Ok(result)
    }

    /// Predict whether a goal will be met by its deadline
    pub fn predict_goal_achievement(
        &mut self,
        goal_amount: f64,
        current_progress: f64,
        monthly_contribution: f64,
        goal_deadline_months: u32,
    ) -> Result<GoalAchievement> {
        if goal_amount <= 0.0 {
            return Err(Error::InvalidInput(
                "Goal amount must be positive".into(),
            ));
        }
        if monthly_contribution < 0.0 {
            return Err(Error::InvalidInput(
                "Monthly contribution must be non-negative".into(),
            ));
        }

        let remaining = goal_amount - current_progress;
        let months_needed = if monthly_contribution > 0.0 {
            Some(remaining / monthly_contribution)
        } else {
            None
        };

        let deadline = goal_deadline_months as f64;
        // Exactly 1.2x the deadline still counts as slightly behind
        let (achievement_probability, achievement_status) = match months_needed {
            Some(needed) if needed <= deadline => (0.95, AchievementStatus::OnTrack),
            Some(needed) if needed <= deadline * 1.2 => (0.70, AchievementStatus::SlightlyBehind),
            _ => (0.30, AchievementStatus::BehindSchedule),
        };

        let required_monthly = if goal_deadline_months > 0 {
            remaining / deadline
        } else {
            0.0
        };

        // A horizon too distant for the calendar stays unprojected
        let projected_completion_date = months_needed
            .and_then(|needed| Duration::try_days((needed * 30.0) as i64))
            .and_then(|ahead| Utc::now().checked_add_signed(ahead));

        let recommendation = if achievement_probability >= 0.9 {
            "On track to achieve goal".to_string()
        } else if achievement_probability >= 0.7 {
            format!(
                "Increase monthly contribution by ${:.2} to stay on track",
                required_monthly - monthly_contribution
            )
        } else {
            format!(
                "Significantly increase monthly contribution to ${:.2} to achieve goal",
                required_monthly
            )
        };

        let result = GoalAchievement {
            goal_amount,
            current_progress,
            remaining_amount: remaining,
            current_monthly_contribution: monthly_contribution,
            required_monthly_contribution: required_monthly,
            months_needed_at_current_rate: months_needed,
            goal_deadline_months,
            achievement_probability,
            achievement_status,
            projected_completion_date,
            recommendation,
            generated_at: Utc::now(),
        };

        self.record(Prediction::GoalAchievement(result.clone()));
        Ok(result)
    }

    /// Score overall financial health from five snapshot figures
    pub fn assess_financial_health(
        &mut self,
        income: f64,
        expenses: f64,
        savings: f64,
        debt: f64,
        emergency_fund: f64,
    ) -> Result<FinancialHealth> {
        let metrics = health_metrics(income, expenses, savings, debt, emergency_fund);
        let score = health_score(&metrics);

        // Projection assumes a 5% improvement in each ratio and a 3-month
        // emergency fund
        let projected_metrics = HealthMetrics {
            savings_rate: metrics.savings_rate * 1.05,
            expense_ratio: metrics.expense_ratio * 0.95,
            debt_to_income_ratio: metrics.debt_to_income_ratio * 0.95,
            emergency_fund_months: 3.0,
        };
        let projected_score = health_score(&projected_metrics);

        let result = FinancialHealth {
            current_health_score: score,
            health_category: categorize_health(score),
            projected_health_score: projected_score,
            projected_health_category: categorize_health(projected_score),
            strengths: health_strengths(&metrics),
            weaknesses: health_weaknesses(&metrics),
            recommendations: health_recommendations(&metrics),
            metrics,
            generated_at: Utc::now(),
        };

        self.record(Prediction::FinancialHealth(result.clone()));
        Ok(result)
    }

    /// Estimate how likely future values are to exceed a z-score threshold
    pub fn predict_anomalies(
        &mut self,
        historical_data: &[f64],
        sensitivity: f64,
    ) -> Result<AnomalyPrediction> {
        if historical_data.len() < MIN_DAILY_SAMPLES {
            return Err(Error::InsufficientData(format!(
                "Anomaly prediction needs at least {} samples, got {}",
                MIN_DAILY_SAMPLES,
                historical_data.len()
            )));
        }

        let mean = stats::mean(historical_data);
        let std_dev = stats::sample_std_dev(historical_data);
        let threshold = mean + sensitivity * std_dev;

        let exceeding = historical_data.iter().filter(|v| **v > threshold).count();
        let probability = exceeding as f64 / historical_data.len() as f64;

        let risk_level = if probability > 0.5 {
            RiskLevel::High
        } else if probability > 0.3 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };

        let result = AnomalyPrediction {
            historical_mean: mean,
            historical_std_dev: std_dev,
            anomaly_threshold: threshold,
            sensitivity,
            anomaly_probability: probability,
            warning: (probability > 0.5)
                .then(|| "Unusual spending pattern detected".to_string()),
            risk_level,
            generated_at: Utc::now(),
        };

        self.record(Prediction::AnomalyPrediction(result.clone()));
        Ok(result)
    }
}

/// Final level of simple exponential smoothing over the series
fn exponential_smoothing_level(data: &[f64], alpha: f64) -> f64 {
    let mut level = data[0];
    for value in &data[1..] {
        level = alpha * value + (1.0 - alpha) * level;
    }
    level
}

fn confidence_intervals(
    forecast: &[f64],
    std_dev: f64,
    confidence_level: f64,
) -> Vec<ConfidenceInterval> {
    let z_score = if confidence_level >= 0.95 { 1.96 } else { 1.645 };
    let margin = z_score * std_dev;

    forecast
        .iter()
        .map(|value| ConfidenceInterval {
            lower_bound: (value - margin).max(0.0),
            point_estimate: *value,
            upper_bound: value + margin,
        })
        .collect()
}

/// Derive the four health ratios, guarding zero denominators
pub fn health_metrics(
    income: f64,
    expenses: f64,
    savings: f64,
    debt: f64,
    emergency_fund: f64,
) -> HealthMetrics {
    HealthMetrics {
        savings_rate: if income > 0.0 { savings / income * 100.0 } else { 0.0 },
        expense_ratio: if income > 0.0 { expenses / income * 100.0 } else { 0.0 },
        debt_to_income_ratio: if income > 0.0 { debt / income } else { 0.0 },
        emergency_fund_months: if expenses > 0.0 {
            emergency_fund / expenses * 12.0
        } else {
            0.0
        },
    }
}

/// Health score in [0, 100]: four bucketed components worth up to 25 each
pub fn health_score(m: &HealthMetrics) -> f64 {
    let mut score: f64 = 0.0;

    score += if m.savings_rate >= 20.0 {
        25.0
    } else if m.savings_rate >= 15.0 {
        20.0
    } else if m.savings_rate >= 10.0 {
        15.0
    } else if m.savings_rate >= 5.0 {
        10.0
    } else {
        5.0
    };

    score += if m.expense_ratio <= 50.0 {
        25.0
    } else if m.expense_ratio <= 60.0 {
        20.0
    } else if m.expense_ratio <= 70.0 {
        15.0
    } else if m.expense_ratio <= 80.0 {
        10.0
    } else {
        5.0
    };

    score += if m.debt_to_income_ratio <= 0.3 {
        25.0
    } else if m.debt_to_income_ratio <= 0.5 {
        20.0
    } else if m.debt_to_income_ratio <= 0.75 {
        15.0
    } else if m.debt_to_income_ratio <= 1.0 {
        10.0
    } else {
        5.0
    };

    score += if m.emergency_fund_months >= 6.0 {
        25.0
    } else if m.emergency_fund_months >= 3.0 {
        20.0
    } else if m.emergency_fund_months >= 1.0 {
        15.0
    } else if m.emergency_fund_months > 0.0 {
        10.0
    } else {
        0.0
    };

    score.min(100.0)
}

pub fn categorize_health(score: f64) -> HealthCategory {
    if score >= 80.0 {
        HealthCategory::Excellent
    } else if score >= 60.0 {
        HealthCategory::Good
    } else if score >= 40.0 {
        HealthCategory::Fair
    } else {
        HealthCategory::Poor
    }
}

pub(crate) fn health_strengths(m: &HealthMetrics) -> Vec<String> {
    let mut strengths = Vec::new();
    if m.savings_rate >= 15.0 {
        strengths.push("Strong savings rate".to_string());
    }
    if m.expense_ratio <= 60.0 {
        strengths.push("Well-controlled expenses".to_string());
    }
    if m.debt_to_income_ratio <= 0.5 {
        strengths.push("Manageable debt levels".to_string());
    }
    if m.emergency_fund_months >= 3.0 {
        strengths.push("Adequate emergency fund".to_string());
    }
    strengths
}

pub(crate) fn health_weaknesses(m: &HealthMetrics) -> Vec<String> {
    let mut weaknesses = Vec::new();
    if m.savings_rate < 5.0 {
        weaknesses.push("Low savings rate".to_string());
    }
    if m.expense_ratio > 75.0 {
        weaknesses.push("High expense ratio".to_string());
    }
    if m.debt_to_income_ratio > 1.0 {
        weaknesses.push("High debt burden".to_string());
    }
    if m.emergency_fund_months < 1.0 {
        weaknesses.push("Insufficient emergency fund".to_string());
    }
    weaknesses
}

pub(crate) fn health_recommendations(m: &HealthMetrics) -> Vec<String> {
    let mut recommendations = Vec::new();
    if m.savings_rate < 10.0 {
        recommendations.push("Increase savings rate to at least 10%".to_string());
    }
    if m.expense_ratio > 70.0 {
        recommendations.push("Review and reduce discretionary spending".to_string());
    }
    if m.debt_to_income_ratio > 0.5 {
        recommendations.push("Focus on debt reduction".to_string());
    }
    if m.emergency_fund_months < 3.0 {
        recommendations.push("Build emergency fund to 3-6 months of expenses".to_string());
    }
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Trend;

    #[test]
    fn test_spending_forecast_requires_seven_points() {
        let mut engine = PredictiveEngine::default();
        let six = [10.0; 6];
        assert!(matches!(
            engine.forecast_spending(&six, 30, 0.95),
            Err(Error::InsufficientData(_))
        ));
        assert_eq!(engine.history().count(), 0);
    }

    #[test]
    fn test_spending_forecast_is_flat_at_smoothed_level() {
        let mut engine = PredictiveEngine::default();
        let history = [100.0, 110.0, 90.0, 105.0, 95.0, 100.0, 102.0];
        let forecast = engine.forecast_spending(&history, 14, 0.95).unwrap();

        assert_eq!(forecast.forecast_values.len(), 14);
        let level = forecast.forecast_values[0];
        assert!(forecast.forecast_values.iter().all(|v| *v == level));
        assert_eq!(forecast.trend, Trend::Stable);
        assert!(
            (forecast.total_forecasted_spending - level * 14.0).abs() < 1e-9
        );

        // The smoothed level weights recent values but stays within the
        // observed range
        assert!(level >= 90.0 && level <= 110.0);

        // Intervals bracket the point estimate symmetrically except at the
        // zero floor
        for interval in &forecast.confidence_intervals {
            assert!(interval.lower_bound <= interval.point_estimate);
            assert!(interval.point_estimate <= interval.upper_bound);
            assert!(interval.lower_bound >= 0.0);
        }

        assert_eq!(engine.history().count(), 1);
    }

    #[test]
    fn test_smoothing_level_constant_series() {
        assert_eq!(exponential_smoothing_level(&[50.0; 10], 0.3), 50.0);
    }

    #[test]
    fn test_income_forecast_trend() {
        let mut engine = PredictiveEngine::default();
        let rising = [3000.0, 3100.0, 3200.0, 3300.0];
        let forecast = engine.forecast_income(&rising, 3, 0.95).unwrap();

        assert_eq!(forecast.trend_direction, TrendDirection::Increasing);
        assert_eq!(forecast.forecast_values.len(), 3);
        // Values extend the linear trend from the historical mean
        assert!(forecast.forecast_values[2] > forecast.forecast_values[0]);
        assert!((forecast.trend_slope - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_savings_projection_zero_return_identity() {
        let mut engine = PredictiveEngine::default();
        let projection = engine.project_savings(1000.0, 100.0, 0.0, 12).unwrap();

        // With a 0% return the final amount is exactly the contributions
        assert!((projection.final_amount - 2200.0).abs() < 1e-9);
        assert!((projection.total_contributed - 2200.0).abs() < 1e-9);
        assert!(projection.total_interest_earned.abs() < 1e-9);
        assert_eq!(projection.projected_values.len(), 12);
        assert!((projection.average_monthly_growth - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_savings_projection_rejects_negative_input() {
        let mut engine = PredictiveEngine::default();
        assert!(matches!(
            engine.project_savings(-1.0, 100.0, 0.05, 12),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            engine.project_savings(1000.0, -1.0, 0.05, 12),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_goal_tier_boundaries() {
        let mut engine = PredictiveEngine::default();

        // months_needed == deadline: 5000 remaining / 500 = 10 months
        let exact = engine
            .predict_goal_achievement(5000.0, 0.0, 500.0, 10)
            .unwrap();
        assert_eq!(exact.achievement_status, AchievementStatus::OnTrack);
        assert_eq!(exact.achievement_probability, 0.95);

        // months_needed == 1.2 * deadline: 6000 / 500 = 12 = 1.2 * 10
        let boundary = engine
            .predict_goal_achievement(6000.0, 0.0, 500.0, 10)
            .unwrap();
        assert_eq!(boundary.achievement_status, AchievementStatus::SlightlyBehind);
        assert_eq!(boundary.achievement_probability, 0.70);

        // months_needed just past 1.2 * deadline
        let behind = engine
            .predict_goal_achievement(6001.0, 0.0, 500.0, 10)
            .unwrap();
        assert_eq!(behind.achievement_status, AchievementStatus::BehindSchedule);
        assert_eq!(behind.achievement_probability, 0.30);
    }

    #[test]
    fn test_goal_far_future_horizon_stays_unprojected() {
        let mut engine = PredictiveEngine::default();
        // A tiny contribution toward a huge goal needs more months than the
        // calendar can represent
        let result = engine
            .predict_goal_achievement(1.0e18, 0.0, 0.001, 12)
            .unwrap();

        assert!(result.months_needed_at_current_rate.is_some());
        assert_eq!(result.projected_completion_date, None);
        assert_eq!(result.achievement_status, AchievementStatus::BehindSchedule);
    }

    #[test]
    fn test_goal_zero_contribution_is_unreachable() {
        let mut engine = PredictiveEngine::default();
        let result = engine
            .predict_goal_achievement(5000.0, 1000.0, 0.0, 12)
            .unwrap();

        assert_eq!(result.months_needed_at_current_rate, None);
        assert_eq!(result.projected_completion_date, None);
        assert_eq!(result.achievement_status, AchievementStatus::BehindSchedule);
        // Required monthly still computable from the deadline
        assert!((result.required_monthly_contribution - 4000.0 / 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_health_perfect_vector_scores_100() {
        let mut engine = PredictiveEngine::default();
        // savings rate 25%, expense ratio 50%, debt ratio 0.2, 12 fund months
        let health = engine
            .assess_financial_health(10_000.0, 5_000.0, 2_500.0, 2_000.0, 5_000.0)
            .unwrap();

        assert_eq!(health.current_health_score, 100.0);
        assert_eq!(health.health_category, HealthCategory::Excellent);
        assert!(health.weaknesses.is_empty());
        assert_eq!(health.strengths.len(), 4);
    }

    #[test]
    fn test_health_sub_scores_bounded() {
        let mut engine = PredictiveEngine::default();
        // Worst case on every axis
        let health = engine
            .assess_financial_health(1000.0, 2000.0, 0.0, 5000.0, 0.0)
            .unwrap();
        // 5 + 5 + 5 + 0
        assert_eq!(health.current_health_score, 15.0);
        assert_eq!(health.health_category, HealthCategory::Poor);
        assert_eq!(health.weaknesses.len(), 4);
        assert_eq!(health.recommendations.len(), 4);
    }

    #[test]
    fn test_anomaly_probability_and_risk() {
        let mut engine = PredictiveEngine::default();
        // Eight modest values and two spikes with low sensitivity
        let data = [10.0, 11.0, 9.0, 10.0, 12.0, 10.0, 11.0, 10.0, 100.0, 95.0];
        let result = engine.predict_anomalies(&data, 0.5).unwrap();

        assert!((result.anomaly_probability - 0.2).abs() < 1e-9);
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert!(result.warning.is_none());
    }

    #[test]
    fn test_history_is_bounded() {
        let mut engine = PredictiveEngine::new(3);
        for i in 0..10 {
            engine
                .project_savings(1000.0 + i as f64, 100.0, 0.05, 6)
                .unwrap();
        }
        assert_eq!(engine.history().count(), 3);

        // The retained entries are the most recent three
        let starts: Vec<f64> = engine
            .history()
            .filter_map(|p| match p {
                Prediction::SavingsProjection(s) => Some(s.current_savings),
                _ => None,
            })
            .collect();
        assert_eq!(starts, vec![1007.0, 1008.0, 1009.0]);
    }
}
