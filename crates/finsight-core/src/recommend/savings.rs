//! Savings potential analyzer: discretionary spending and subscription audit

use chrono::Duration;

use crate::error::Result;
use crate::models::TransactionKind;
use crate::stats;

use super::engine::{Analyzer, RecommendationContext};
use super::types::{AnalyzerKind, Recommendation, RecommendationKind};

const WINDOW_DAYS: i64 = 90;

/// Categories counted as discretionary (matched case-insensitively)
const DISCRETIONARY_CATEGORIES: [&str; 4] =
    ["entertainment", "dining", "shopping", "subscriptions"];

/// Fraction of discretionary spending assumed reducible
const REDUCIBLE_FRACTION: f64 = 0.2;

pub struct SavingsPotentialAnalyzer;

impl Analyzer for SavingsPotentialAnalyzer {
    fn id(&self) -> AnalyzerKind {
        AnalyzerKind::SavingsPotential
    }

    fn name(&self) -> &'static str {
        "Savings Potential"
    }

    fn analyze(&self, ctx: &RecommendationContext<'_>) -> Result<Vec<Recommendation>> {
        let since = ctx.now - Duration::days(WINDOW_DAYS);
        let transactions = ctx.db.fetch_transactions(
            ctx.user_id,
            Some(TransactionKind::Expense),
            Some(since),
            None,
        )?;

        let mut recommendations = Vec::new();

        let discretionary: f64 = transactions
            .iter()
            .filter(|t| DISCRETIONARY_CATEGORIES.contains(&t.category.to_lowercase().as_str()))
            .map(|t| t.amount)
            .sum();
        if discretionary > 0.0 {
            let savings_potential = discretionary * REDUCIBLE_FRACTION;
            recommendations.push(
                Recommendation::new(
                    RecommendationKind::SavingsOpportunity,
                    "Reduce discretionary spending",
                    format!(
                        "You spend ${:.2} on discretionary items. Reducing by 20% \
                         could save ${:.2}.",
                        discretionary, savings_potential
                    ),
                    "Review discretionary spending categories",
                    8,
                )
                .with_potential_savings(stats::round2(savings_potential)),
            );
        }

        let subscriptions: Vec<f64> = transactions
            .iter()
            .filter(|t| {
                t.description.to_lowercase().contains("subscription")
                    || t.category.to_lowercase().contains("subscription")
            })
            .map(|t| t.amount)
            .collect();
        if !subscriptions.is_empty() {
            let total: f64 = subscriptions.iter().sum();
            recommendations.push(
                Recommendation::new(
                    RecommendationKind::SubscriptionAudit,
                    "Audit your subscriptions",
                    format!(
                        "You have {} subscription transactions totaling ${:.2}. \
                         Review unused subscriptions.",
                        subscriptions.len(),
                        total
                    ),
                    "Review and cancel unused subscriptions",
                    7,
                )
                .with_subscription_count(subscriptions.len()),
            );
        }

        Ok(recommendations)
    }
}
