//! Budget efficiency analyzer: expense-to-income ratio review

use chrono::Duration;

use crate::error::Result;
use crate::models::TransactionKind;
use crate::stats;

use super::engine::{Analyzer, RecommendationContext};
use super::types::{AnalyzerKind, Recommendation, RecommendationKind};

const WINDOW_DAYS: i64 = 30;

/// Expense ratio above which spending is flagged, in percent
const WARNING_RATIO_PERCENT: f64 = 90.0;
/// Expense ratio below which the surplus is worth investing, in percent
const SURPLUS_RATIO_PERCENT: f64 = 50.0;

pub struct BudgetEfficiencyAnalyzer;

impl Analyzer for BudgetEfficiencyAnalyzer {
    fn id(&self) -> AnalyzerKind {
        AnalyzerKind::BudgetEfficiency
    }

    fn name(&self) -> &'static str {
        "Budget Efficiency"
    }

    fn analyze(&self, ctx: &RecommendationContext<'_>) -> Result<Vec<Recommendation>> {
        let since = ctx.now - Duration::days(WINDOW_DAYS);
        let transactions = ctx
            .db
            .fetch_transactions(ctx.user_id, None, Some(since), None)?;

        let income: f64 = transactions
            .iter()
            .filter(|t| t.kind == TransactionKind::Income)
            .map(|t| t.amount)
            .sum();
        let expenses: f64 = transactions
            .iter()
            .filter(|t| t.kind == TransactionKind::Expense)
            .map(|t| t.amount)
            .sum();

        // Without income the ratio is undefined
        if income <= 0.0 {
            return Ok(Vec::new());
        }

        let expense_ratio = expenses / income * 100.0;

        let mut recommendations = Vec::new();
        if expense_ratio > WARNING_RATIO_PERCENT {
            recommendations.push(
                Recommendation::new(
                    RecommendationKind::BudgetWarning,
                    "High expense-to-income ratio",
                    format!(
                        "You're spending {:.1}% of your income. Consider reducing \
                         expenses or increasing income.",
                        expense_ratio
                    ),
                    "Review and reduce expenses",
                    9,
                )
                .with_expense_ratio(stats::round1(expense_ratio)),
            );
        } else if expense_ratio < SURPLUS_RATIO_PERCENT {
            recommendations.push(
                Recommendation::new(
                    RecommendationKind::SavingsOpportunity,
                    "Great savings rate!",
                    format!(
                        "You're only spending {:.1}% of your income. Consider \
                         investing the surplus.",
                        expense_ratio
                    ),
                    "Invest or save the surplus",
                    6,
                )
                .with_monthly_surplus(stats::round2(income - expenses)),
            );
        }

        Ok(recommendations)
    }
}
