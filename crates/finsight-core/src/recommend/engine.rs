//! Recommendation engine - runs the analyzer battery and ranks the output

use chrono::{DateTime, Duration, Utc};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::TransactionKind;
use crate::stats;

use super::types::{
    AnalyzerKind, CategoryNudge, CategoryReport, Recommendation, RecommendationReport,
};
use super::{
    BudgetEfficiencyAnalyzer, CategoryTrendAnalyzer, GoalProgressAnalyzer,
    SavingsPotentialAnalyzer, SpendingPatternAnalyzer,
};

/// At most this many recommendations survive the ranking cut
const MAX_RECOMMENDATIONS: usize = 10;

/// Context provided to recommendation analyzers
pub struct RecommendationContext<'a> {
    /// Database for querying transactions and goals
    pub db: &'a Database,
    /// User whose finances are being analyzed
    pub user_id: i64,
    /// Reference time for window and month boundaries
    pub now: DateTime<Utc>,
}

impl<'a> RecommendationContext<'a> {
    pub fn new(db: &'a Database, user_id: i64) -> Self {
        Self {
            db,
            user_id,
            now: Utc::now(),
        }
    }
}

/// Trait for recommendation analyzers
pub trait Analyzer: Send + Sync {
    /// Unique identifier for this analyzer
    fn id(&self) -> AnalyzerKind;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Inspect the user's finances and produce recommendations
    fn analyze(&self, ctx: &RecommendationContext<'_>) -> Result<Vec<Recommendation>>;
}

/// Runs all registered analyzers and ranks their combined output
pub struct Recommender {
    analyzers: Vec<Box<dyn Analyzer>>,
}

impl Default for Recommender {
    fn default() -> Self {
        Self::new()
    }
}

impl Recommender {
    /// Create a recommender with the built-in analyzer battery
    pub fn new() -> Self {
        let mut recommender = Self { analyzers: vec![] };

        recommender.register(Box::new(SpendingPatternAnalyzer));
        recommender.register(Box::new(SavingsPotentialAnalyzer));
        recommender.register(Box::new(CategoryTrendAnalyzer));
        recommender.register(Box::new(GoalProgressAnalyzer));
        recommender.register(Box::new(BudgetEfficiencyAnalyzer));

        recommender
    }

    pub fn register(&mut self, analyzer: Box<dyn Analyzer>) {
        self.analyzers.push(analyzer);
    }

    pub fn analyzer_kinds(&self) -> Vec<AnalyzerKind> {
        self.analyzers.iter().map(|a| a.id()).collect()
    }

    /// Run every analyzer, rank by priority, and keep the top 10
    ///
    /// A failing analyzer is logged and skipped; it never aborts the batch.
    pub fn recommend(&self, db: &Database, user_id: i64) -> Result<RecommendationReport> {
        let ctx = RecommendationContext::new(db, user_id);
        let mut all = Vec::new();

        for analyzer in &self.analyzers {
            match analyzer.analyze(&ctx) {
                Ok(recommendations) => {
                    tracing::debug!(
                        analyzer = analyzer.id().as_str(),
                        count = recommendations.len(),
                        "Analyzer complete"
                    );
                    all.extend(recommendations);
                }
                Err(e) => {
                    tracing::warn!(
                        analyzer = analyzer.id().as_str(),
                        error = %e,
                        "Analyzer failed"
                    );
                }
            }
        }

        // Stable sort keeps encounter order among equal priorities
        all.sort_by(|a, b| b.priority_score.cmp(&a.priority_score));
        all.truncate(MAX_RECOMMENDATIONS);

        Ok(RecommendationReport {
            total_recommendations: all.len(),
            recommendations: all,
            generated_at: Utc::now(),
        })
    }
}

/// Drill-down nudges for a single spending category over 90 days
pub fn category_recommendations(
    db: &Database,
    user_id: i64,
    category: &str,
) -> Result<CategoryReport> {
    let since = Utc::now() - Duration::days(90);
    let transactions = db.fetch_transactions(
        user_id,
        Some(TransactionKind::Expense),
        Some(since),
        None,
    )?;

    let amounts: Vec<f64> = transactions
        .iter()
        .filter(|t| t.category == category)
        .map(|t| t.amount)
        .collect();

    if amounts.is_empty() {
        return Err(Error::NoData(format!(
            "No transactions in category {}",
            category
        )));
    }

    let total: f64 = amounts.iter().sum();
    let avg = total / amounts.len() as f64;

    let mut recommendations = Vec::new();

    if amounts.len() > 1 {
        let std_dev = stats::sample_std_dev(&amounts);
        if std_dev > avg * 0.5 {
            recommendations.push(CategoryNudge::Consistency {
                title: format!("Stabilize {} spending", category),
                description: format!(
                    "Your {} spending varies significantly. Try to maintain more \
                     consistent spending.",
                    category
                ),
                variance: stats::round2(std_dev),
                action: format!("Plan {} purchases more consistently", category),
            });
        }
    }

    // Window spans three months
    let per_month = amounts.len() as f64 / 3.0;
    if per_month > 20.0 {
        recommendations.push(CategoryNudge::Frequency {
            title: format!("Reduce {} transaction frequency", category),
            description: format!(
                "You make {:.0} {} transactions per month. Consider batch purchasing.",
                per_month, category
            ),
            frequency: stats::round1(per_month),
            action: format!("Batch {} purchases", category),
        });
    }

    Ok(CategoryReport {
        category: category.to_string(),
        total_spending: stats::round2(total),
        average_transaction: stats::round2(avg),
        transaction_count: amounts.len(),
        recommendations,
    })
}
