//! Finsight Core Library
//!
//! Shared functionality for the Finsight personal finance analytics service:
//! - Database access and migrations (transactions, goals)
//! - Statistical pattern recognition over transaction history
//! - Predictive insights: forecasts, projections, health scoring
//! - Descriptive analytics over transaction windows
//! - Ranked financial recommendations
//! - Agent orchestration with synthesized reports

pub mod agents;
pub mod analytics;
pub mod db;
pub mod error;
pub mod forecast;
pub mod models;
pub mod patterns;
pub mod recommend;
pub mod stats;

pub use agents::{
    Agent, AgentInput, AgentKind, AgentReport, Orchestrator, OrchestratorStatus, TaskExecution,
    TaskKind,
};
pub use db::Database;
pub use error::{Error, Result};
pub use forecast::{PredictiveEngine, DEFAULT_HISTORY_CAPACITY};
pub use models::{Goal, GoalStatus, NewGoal, NewTransaction, Transaction, TransactionKind};
pub use patterns::{PatternEngine, PatternReport};
pub use recommend::{Recommender, RecommendationReport};
