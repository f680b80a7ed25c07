//! Advanced Analytics Engine
//!
//! Pure descriptive analytics over caller-supplied transaction slices: no
//! state, no persistence, just windowed aggregation. The window is measured
//! backwards from `Utc::now()` by `period_days`.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Transaction, TransactionKind};
use crate::stats::{self, Trend};

/// Spending behavior over the analysis window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendingPatternAnalysis {
    pub period_days: u32,
    pub total_transactions: usize,
    pub spending_by_category: BTreeMap<String, f64>,
    pub daily_average: f64,
    pub daily_median: f64,
    pub daily_std_dev: f64,
    /// 90th percentile of daily spending; heavy days sit above this
    pub daily_p90: f64,
    pub weekly_average: f64,
    pub patterns_identified: Vec<String>,
    pub anomalies: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeTrendAnalysis {
    pub period_days: u32,
    pub total_income_transactions: usize,
    pub total_income: f64,
    pub average_income: f64,
    /// 0-1, higher is more stable
    pub income_stability: f64,
    pub income_by_source: BTreeMap<String, f64>,
    /// Totals keyed by "YYYY-MM"
    pub monthly_trend: BTreeMap<String, f64>,
    pub trend_direction: Trend,
    pub projected_annual_income: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SavingsRateCategory {
    #[serde(rename = "Very Low")]
    VeryLow,
    Low,
    Moderate,
    Good,
    Excellent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsRateAnalysis {
    pub period_days: u32,
    pub income: f64,
    pub expenses: f64,
    pub savings: f64,
    pub savings_rate_percent: f64,
    pub expense_ratio_percent: f64,
    pub savings_rate_category: SavingsRateCategory,
    pub recommendation: String,
    pub target_savings_rate: f64,
    pub gap_to_target: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetStatus {
    Over,
    Under,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryVariance {
    pub budgeted: f64,
    pub actual: f64,
    pub variance: f64,
    pub variance_percent: f64,
    pub status: BudgetStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetVarianceAnalysis {
    pub category_analysis: BTreeMap<String, CategoryVariance>,
    pub total_budget: f64,
    pub total_actual: f64,
    pub total_variance: f64,
    pub overall_variance_percent: f64,
    pub categories_over_budget: Vec<String>,
    pub categories_under_budget: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowAnalysis {
    pub period_days: u32,
    pub total_inflow: f64,
    pub total_outflow: f64,
    /// Final value of the cumulative series
    pub net_cash_flow: f64,
    /// Signed net flow per day, in date order
    pub daily_flow: Vec<f64>,
    pub cumulative_flow: Vec<f64>,
    pub average_daily_flow: f64,
    pub cash_flow_volatility: f64,
    pub positive_flow_days: usize,
    pub negative_flow_days: usize,
}

fn in_window(t: &Transaction, period_days: u32) -> bool {
    t.transaction_date > Utc::now() - Duration::days(period_days as i64)
}

/// Daily expense totals keyed by calendar date
fn daily_spending(transactions: &[&Transaction]) -> BTreeMap<NaiveDate, f64> {
    let mut daily = BTreeMap::new();
    for t in transactions {
        if t.kind == TransactionKind::Expense {
            *daily.entry(t.transaction_date.date_naive()).or_insert(0.0) += t.amount;
        }
    }
    daily
}

/// Analyze spending distribution, volatility, and daily outliers
pub fn analyze_spending_patterns(
    transactions: &[Transaction],
    period_days: u32,
) -> Result<SpendingPatternAnalysis> {
    if transactions.is_empty() {
        return Err(Error::InsufficientData("No transactions provided".into()));
    }

    let windowed: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| in_window(t, period_days))
        .collect();

    let mut spending_by_category: BTreeMap<String, f64> = BTreeMap::new();
    for t in &windowed {
        if t.kind == TransactionKind::Expense {
            *spending_by_category.entry(t.category.clone()).or_insert(0.0) += t.amount;
        }
    }

    let daily: Vec<f64> = daily_spending(&windowed).into_values().collect();

    let mut weekly: BTreeMap<u32, f64> = BTreeMap::new();
    for t in &windowed {
        if t.kind == TransactionKind::Expense {
            *weekly.entry(t.transaction_date.iso_week().week()).or_insert(0.0) += t.amount;
        }
    }
    let weekly: Vec<f64> = weekly.into_values().collect();

    let mut patterns_identified = Vec::new();
    if !daily.is_empty() && stats::sample_std_dev(&daily) > stats::mean(&daily) * 0.5 {
        patterns_identified.push("High spending volatility".to_string());
    }
    match stats::classify_trend(&weekly) {
        Trend::Increasing => {
            patterns_identified.push("Spending trend is increasing".to_string())
        }
        Trend::Decreasing => {
            patterns_identified.push("Spending trend is decreasing".to_string())
        }
        _ => {}
    }

    Ok(SpendingPatternAnalysis {
        period_days,
        total_transactions: windowed.len(),
        spending_by_category,
        daily_average: stats::mean(&daily),
        daily_median: stats::median(&daily),
        daily_std_dev: stats::sample_std_dev(&daily),
        daily_p90: stats::percentile(&daily, 90.0),
        weekly_average: stats::mean(&weekly),
        patterns_identified,
        anomalies: daily_anomalies(&daily),
    })
}

/// Days whose spending deviates more than 2 standard deviations from the
/// mean, capped at 5
fn daily_anomalies(daily: &[f64]) -> Vec<String> {
    if daily.len() < 3 {
        return Vec::new();
    }

    let mean = stats::mean(daily);
    let std_dev = stats::sample_std_dev(daily);

    daily
        .iter()
        .filter(|v| (**v - mean).abs() > 2.0 * std_dev)
        .map(|v| format!("Unusual spending detected: ${:.2}", v))
        .take(5)
        .collect()
}

/// Analyze income stability, sources, and monthly trend
pub fn analyze_income_trends(
    transactions: &[Transaction],
    period_days: u32,
) -> Result<IncomeTrendAnalysis> {
    if transactions.is_empty() {
        return Err(Error::InsufficientData("No transactions provided".into()));
    }

    let income: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| t.kind == TransactionKind::Income && in_window(t, period_days))
        .collect();

    if income.is_empty() {
        return Err(Error::NoData("No income transactions found".into()));
    }

    let amounts: Vec<f64> = income.iter().map(|t| t.amount).collect();

    let mut income_by_source: BTreeMap<String, f64> = BTreeMap::new();
    for t in &income {
        let source = t.source.clone().unwrap_or_else(|| "Other".to_string());
        *income_by_source.entry(source).or_insert(0.0) += t.amount;
    }

    let mut monthly_trend: BTreeMap<String, f64> = BTreeMap::new();
    for t in &income {
        let month = t.transaction_date.format("%Y-%m").to_string();
        *monthly_trend.entry(month).or_insert(0.0) += t.amount;
    }
    let monthly_values: Vec<f64> = monthly_trend.values().copied().collect();

    Ok(IncomeTrendAnalysis {
        period_days,
        total_income_transactions: income.len(),
        total_income: amounts.iter().sum(),
        average_income: stats::mean(&amounts),
        income_stability: stability(&amounts),
        income_by_source,
        trend_direction: stats::classify_trend(&monthly_values),
        projected_annual_income: stats::mean(&monthly_values) * 12.0,
        monthly_trend,
    })
}

/// Income stability in [0, 1]: 1 minus the coefficient of variation
fn stability(amounts: &[f64]) -> f64 {
    if amounts.len() < 2 {
        return 1.0;
    }
    if stats::mean(amounts) <= 0.0 {
        return 0.0;
    }
    (1.0 - stats::coefficient_of_variation(amounts)).clamp(0.0, 1.0)
}

/// Savings rate with a 5-tier classification against the 20% target
pub fn calculate_savings_rate(
    income: f64,
    expenses: f64,
    savings: f64,
    period_days: u32,
) -> Result<SavingsRateAnalysis> {
    if income <= 0.0 {
        return Err(Error::InvalidInput("Income must be positive".into()));
    }

    let savings_rate = savings / income * 100.0;
    let expense_ratio = expenses / income * 100.0;

    Ok(SavingsRateAnalysis {
        period_days,
        income,
        expenses,
        savings,
        savings_rate_percent: savings_rate,
        expense_ratio_percent: expense_ratio,
        savings_rate_category: categorize_savings_rate(savings_rate),
        recommendation: savings_recommendation(savings_rate),
        target_savings_rate: 20.0,
        gap_to_target: (20.0 - savings_rate).max(0.0),
    })
}

fn categorize_savings_rate(rate: f64) -> SavingsRateCategory {
    if rate < 5.0 {
        SavingsRateCategory::VeryLow
    } else if rate < 10.0 {
        SavingsRateCategory::Low
    } else if rate < 20.0 {
        SavingsRateCategory::Moderate
    } else if rate < 30.0 {
        SavingsRateCategory::Good
    } else {
        SavingsRateCategory::Excellent
    }
}

fn savings_recommendation(rate: f64) -> String {
    if rate < 10.0 {
        "Increase savings by reducing discretionary spending".to_string()
    } else if rate < 20.0 {
        "Good progress, aim for 20% savings rate".to_string()
    } else if rate < 30.0 {
        "Excellent savings rate, consider investment opportunities".to_string()
    } else {
        "Outstanding savings rate, focus on wealth building".to_string()
    }
}

/// Per-category variance between a budget and actual spending
///
/// Categories present only in `actual` are ignored; the budget defines the
/// comparison set.
pub fn analyze_budget_variance(
    budget: &BTreeMap<String, f64>,
    actual_spending: &BTreeMap<String, f64>,
) -> Result<BudgetVarianceAnalysis> {
    let mut category_analysis = BTreeMap::new();
    let mut total_budget = 0.0;
    let mut total_actual = 0.0;

    for (category, budgeted) in budget {
        let actual = actual_spending.get(category).copied().unwrap_or(0.0);
        let variance = actual - budgeted;
        let variance_percent = if *budgeted > 0.0 {
            variance / budgeted * 100.0
        } else {
            0.0
        };

        category_analysis.insert(
            category.clone(),
            CategoryVariance {
                budgeted: *budgeted,
                actual,
                variance,
                variance_percent,
                status: if variance > 0.0 {
                    BudgetStatus::Over
                } else {
                    BudgetStatus::Under
                },
            },
        );

        total_budget += budgeted;
        total_actual += actual;
    }

    let total_variance = total_actual - total_budget;

    Ok(BudgetVarianceAnalysis {
        categories_over_budget: category_analysis
            .iter()
            .filter(|(_, v)| v.variance > 0.0)
            .map(|(c, _)| c.clone())
            .collect(),
        categories_under_budget: category_analysis
            .iter()
            .filter(|(_, v)| v.variance < 0.0)
            .map(|(c, _)| c.clone())
            .collect(),
        category_analysis,
        total_budget,
        total_actual,
        total_variance,
        overall_variance_percent: if total_budget > 0.0 {
            total_variance / total_budget * 100.0
        } else {
            0.0
        },
    })
}

/// Daily signed cash flow and its cumulative path
pub fn analyze_cash_flow(
    transactions: &[Transaction],
    period_days: u32,
) -> Result<CashFlowAnalysis> {
    if transactions.is_empty() {
        return Err(Error::InsufficientData("No transactions provided".into()));
    }

    let windowed: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| in_window(t, period_days))
        .collect();

    let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut total_inflow = 0.0;
    let mut total_outflow = 0.0;
    for t in &windowed {
        let signed = match t.kind {
            TransactionKind::Income => {
                total_inflow += t.amount;
                t.amount
            }
            TransactionKind::Expense => {
                total_outflow += t.amount;
                -t.amount
            }
        };
        *daily.entry(t.transaction_date.date_naive()).or_insert(0.0) += signed;
    }

    let daily_flow: Vec<f64> = daily.into_values().collect();
    let cumulative_flow: Vec<f64> = daily_flow
        .iter()
        .scan(0.0, |total, flow| {
            *total += flow;
            Some(*total)
        })
        .collect();

    Ok(CashFlowAnalysis {
        period_days,
        total_inflow,
        total_outflow,
        net_cash_flow: cumulative_flow.last().copied().unwrap_or(0.0),
        average_daily_flow: stats::mean(&daily_flow),
        cash_flow_volatility: stats::sample_std_dev(&daily_flow),
        positive_flow_days: daily_flow.iter().filter(|f| **f > 0.0).count(),
        negative_flow_days: daily_flow.iter().filter(|f| **f < 0.0).count(),
        daily_flow,
        cumulative_flow,
    })
}
