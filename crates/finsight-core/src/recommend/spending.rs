//! Spending pattern analyzer: per-category purchase-size and volume review

use std::collections::BTreeMap;

use chrono::Duration;

use crate::error::Result;
use crate::models::TransactionKind;
use crate::stats;

use super::engine::{Analyzer, RecommendationContext};
use super::types::{AnalyzerKind, Recommendation, RecommendationKind};

/// Window for recent spending review
const WINDOW_DAYS: i64 = 30;
/// Purchase size under which a transaction counts as small
const SMALL_PURCHASE_LIMIT: f64 = 50.0;
/// Category total above which a budget review is suggested
const HIGH_SPEND_LIMIT: f64 = 500.0;

pub struct SpendingPatternAnalyzer;

impl Analyzer for SpendingPatternAnalyzer {
    fn id(&self) -> AnalyzerKind {
        AnalyzerKind::SpendingPatterns
    }

    fn name(&self) -> &'static str {
        "Spending Patterns"
    }

    fn analyze(&self, ctx: &RecommendationContext<'_>) -> Result<Vec<Recommendation>> {
        let since = ctx.now - Duration::days(WINDOW_DAYS);
        let transactions = ctx.db.fetch_transactions(
            ctx.user_id,
            Some(TransactionKind::Expense),
            Some(since),
            None,
        )?;

        let mut by_category: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for t in &transactions {
            by_category.entry(t.category.clone()).or_default().push(t.amount);
        }

        let mut recommendations = Vec::new();
        for (category, amounts) in &by_category {
            let total: f64 = amounts.iter().sum();
            let avg = total / amounts.len() as f64;

            let small = amounts.iter().filter(|a| **a < SMALL_PURCHASE_LIMIT).count();
            if small as f64 > amounts.len() as f64 * 0.6 {
                recommendations.push(
                    Recommendation::new(
                        RecommendationKind::Consolidation,
                        format!("Consolidate {} purchases", category),
                        format!(
                            "You have {} small purchases in {}. Consider consolidating \
                             to save time and potentially reduce costs.",
                            small, category
                        ),
                        format!("Review and consolidate {} purchases", category),
                        7,
                    )
                    .with_category(category)
                    .with_potential_savings(stats::round2(avg * 0.1)),
                );
            }

            if total > HIGH_SPEND_LIMIT {
                recommendations.push(
                    Recommendation::new(
                        RecommendationKind::BudgetReview,
                        format!("Review {} spending", category),
                        format!(
                            "Your {} spending is ${:.2} in the last 30 days. \
                             Consider setting a budget limit.",
                            category, total
                        ),
                        format!("Set a budget limit for {}", category),
                        6,
                    )
                    .with_category(category)
                    .with_current_spending(stats::round2(total)),
                );
            }
        }

        Ok(recommendations)
    }
}
