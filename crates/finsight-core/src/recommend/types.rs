//! Core types for the recommendation engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Built-in analyzer identities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyzerKind {
    /// Per-category purchase-size and volume review
    SpendingPatterns,
    /// Discretionary spending and subscription audit
    SavingsPotential,
    /// Month-over-month category movement
    CategoryTrends,
    /// Savings goal progress checkpoints
    GoalProgress,
    /// Expense-to-income ratio review
    BudgetEfficiency,
}

impl AnalyzerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyzerKind::SpendingPatterns => "spending_patterns",
            AnalyzerKind::SavingsPotential => "savings_potential",
            AnalyzerKind::CategoryTrends => "category_trends",
            AnalyzerKind::GoalProgress => "goal_progress",
            AnalyzerKind::BudgetEfficiency => "budget_efficiency",
        }
    }
}

impl fmt::Display for AnalyzerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AnalyzerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spending_patterns" => Ok(AnalyzerKind::SpendingPatterns),
            "savings_potential" => Ok(AnalyzerKind::SavingsPotential),
            "category_trends" => Ok(AnalyzerKind::CategoryTrends),
            "goal_progress" => Ok(AnalyzerKind::GoalProgress),
            "budget_efficiency" => Ok(AnalyzerKind::BudgetEfficiency),
            _ => Err(format!("Unknown analyzer: {}", s)),
        }
    }
}

/// What a recommendation suggests doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Consolidation,
    BudgetReview,
    SavingsOpportunity,
    SubscriptionAudit,
    TrendAlert,
    GoalAcceleration,
    GoalMilestone,
    BudgetWarning,
}

/// A single ranked recommendation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub title: String,
    pub description: String,
    pub action: String,
    /// Higher scores rank first; the batch keeps the top 10
    pub priority_score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub potential_savings: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_spending: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_subscriptions: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub increase_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_progress: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expense_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_surplus: Option<f64>,
}

impl Recommendation {
    pub fn new(
        kind: RecommendationKind,
        title: impl Into<String>,
        description: impl Into<String>,
        action: impl Into<String>,
        priority_score: u8,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
            action: action.into(),
            priority_score,
            category: None,
            goal_id: None,
            potential_savings: None,
            current_spending: None,
            current_subscriptions: None,
            increase_percentage: None,
            current_progress: None,
            expense_ratio: None,
            monthly_surplus: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_goal(mut self, goal_id: i64) -> Self {
        self.goal_id = Some(goal_id);
        self
    }

    pub fn with_potential_savings(mut self, amount: f64) -> Self {
        self.potential_savings = Some(amount);
        self
    }

    pub fn with_current_spending(mut self, amount: f64) -> Self {
        self.current_spending = Some(amount);
        self
    }

    pub fn with_subscription_count(mut self, count: usize) -> Self {
        self.current_subscriptions = Some(count);
        self
    }

    pub fn with_increase_percentage(mut self, percent: f64) -> Self {
        self.increase_percentage = Some(percent);
        self
    }

    pub fn with_progress(mut self, percent: f64) -> Self {
        self.current_progress = Some(percent);
        self
    }

    pub fn with_expense_ratio(mut self, percent: f64) -> Self {
        self.expense_ratio = Some(percent);
        self
    }

    pub fn with_monthly_surplus(mut self, amount: f64) -> Self {
        self.monthly_surplus = Some(amount);
        self
    }
}

/// The ranked recommendation batch for one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationReport {
    pub total_recommendations: usize,
    pub recommendations: Vec<Recommendation>,
    pub generated_at: DateTime<Utc>,
}

/// A category-specific nudge (not ranked against the main batch)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CategoryNudge {
    /// Spending varies by more than half the average
    Consistency {
        title: String,
        description: String,
        variance: f64,
        action: String,
    },
    /// More than 20 transactions per month
    Frequency {
        title: String,
        description: String,
        frequency: f64,
        action: String,
    },
}

/// Drill-down report for one spending category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryReport {
    pub category: String,
    pub total_spending: f64,
    pub average_transaction: f64,
    pub transaction_count: usize,
    pub recommendations: Vec<CategoryNudge>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyzer_kind_roundtrip() {
        assert_eq!(AnalyzerKind::GoalProgress.as_str(), "goal_progress");
        assert_eq!(
            AnalyzerKind::from_str("budget_efficiency").unwrap(),
            AnalyzerKind::BudgetEfficiency
        );
        assert!(AnalyzerKind::from_str("nope").is_err());
    }

    #[test]
    fn test_recommendation_builder_skips_absent_fields() {
        let rec = Recommendation::new(
            RecommendationKind::Consolidation,
            "Consolidate dining purchases",
            "Many small purchases",
            "Review dining purchases",
            7,
        )
        .with_category("dining")
        .with_potential_savings(4.5);

        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["type"], "consolidation");
        assert_eq!(json["category"], "dining");
        assert_eq!(json["potential_savings"], 4.5);
        assert!(json.get("goal_id").is_none());
        assert!(json.get("expense_ratio").is_none());
    }
}
