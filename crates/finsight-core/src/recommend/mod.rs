//! Intelligent Recommender - Ranked Financial Recommendations
//!
//! A pluggable battery of analyzers, each inspecting one aspect of a user's
//! finances (spending habits, savings potential, category trends, goal
//! progress, budget efficiency). Their combined output is ranked by priority
//! and trimmed to the ten most important recommendations.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use finsight_core::recommend::Recommender;
//!
//! let recommender = Recommender::new();
//! let report = recommender.recommend(&db, user_id)?;
//! ```

pub mod budget;
pub mod engine;
pub mod goals;
pub mod savings;
pub mod spending;
pub mod trends;
pub mod types;

pub use budget::BudgetEfficiencyAnalyzer;
pub use engine::{category_recommendations, Analyzer, RecommendationContext, Recommender};
pub use goals::GoalProgressAnalyzer;
pub use savings::SavingsPotentialAnalyzer;
pub use spending::SpendingPatternAnalyzer;
pub use trends::CategoryTrendAnalyzer;
pub use types::{
    AnalyzerKind, CategoryNudge, CategoryReport, Recommendation, RecommendationKind,
    RecommendationReport,
};
