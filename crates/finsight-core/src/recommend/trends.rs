//! Category trend analyzer: month-over-month spending movement

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, Utc};

use crate::error::Result;
use crate::models::TransactionKind;
use crate::stats;

use super::engine::{Analyzer, RecommendationContext};
use super::types::{AnalyzerKind, Recommendation, RecommendationKind};

/// Month-over-month increase that triggers an alert, in percent
const INCREASE_ALERT_PERCENT: f64 = 30.0;

pub struct CategoryTrendAnalyzer;

/// Midnight on the first day of the month containing `at`
fn month_start(at: DateTime<Utc>) -> DateTime<Utc> {
    at.date_naive()
        .with_day(1)
        .unwrap_or_else(|| at.date_naive())
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc()
}

impl Analyzer for CategoryTrendAnalyzer {
    fn id(&self) -> AnalyzerKind {
        AnalyzerKind::CategoryTrends
    }

    fn name(&self) -> &'static str {
        "Category Trends"
    }

    fn analyze(&self, ctx: &RecommendationContext<'_>) -> Result<Vec<Recommendation>> {
        let current_start = month_start(ctx.now);
        let previous_start = month_start(current_start - Duration::days(1));

        let current = ctx.db.fetch_transactions(
            ctx.user_id,
            Some(TransactionKind::Expense),
            Some(current_start),
            None,
        )?;
        let previous = ctx.db.fetch_transactions(
            ctx.user_id,
            Some(TransactionKind::Expense),
            Some(previous_start),
            Some(current_start),
        )?;

        // No baseline month, no trend to report
        if previous.is_empty() {
            return Ok(Vec::new());
        }

        let mut current_totals: BTreeMap<String, f64> = BTreeMap::new();
        for t in &current {
            *current_totals.entry(t.category.clone()).or_insert(0.0) += t.amount;
        }
        let mut previous_totals: BTreeMap<String, f64> = BTreeMap::new();
        for t in &previous {
            *previous_totals.entry(t.category.clone()).or_insert(0.0) += t.amount;
        }

        let mut recommendations = Vec::new();
        for (category, current_amount) in &current_totals {
            let previous_amount = previous_totals.get(category).copied().unwrap_or(0.0);
            if previous_amount <= 0.0 {
                continue;
            }

            let increase_pct = (current_amount - previous_amount) / previous_amount * 100.0;
            if increase_pct > INCREASE_ALERT_PERCENT {
                recommendations.push(
                    Recommendation::new(
                        RecommendationKind::TrendAlert,
                        format!("{} spending increased", category),
                        format!(
                            "Your {} spending increased by {:.1}% compared to last month.",
                            category, increase_pct
                        ),
                        format!("Investigate {} spending increase", category),
                        7,
                    )
                    .with_category(category)
                    .with_increase_percentage(stats::round1(increase_pct)),
                );
            }
        }

        Ok(recommendations)
    }
}
