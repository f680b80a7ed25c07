//! Domain models for Finsight

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a transaction adds to or draws from the user's balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction kind: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A financial transaction
///
/// Immutable once analyzed; the analytics engines only read these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub kind: TransactionKind,
    pub category: String,
    /// Income source (salary, freelance, ...); unused for expenses
    pub source: Option<String>,
    /// Always non-negative; `kind` carries the sign
    pub amount: f64,
    pub description: String,
    pub transaction_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A new transaction before DB insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    pub user_id: i64,
    pub kind: TransactionKind,
    pub category: String,
    pub source: Option<String>,
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    pub transaction_date: DateTime<Utc>,
}

/// Lifecycle status of a financial goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    Active,
    Completed,
    Abandoned,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Abandoned => "abandoned",
        }
    }
}

impl std::str::FromStr for GoalStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "abandoned" => Ok(Self::Abandoned),
            _ => Err(format!("Unknown goal status: {}", s)),
        }
    }
}

impl std::fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A savings goal
///
/// `current_amount` may exceed `target_amount`; progress is not clamped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub status: GoalStatus,
    pub created_at: DateTime<Utc>,
}

/// A new goal before DB insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGoal {
    pub user_id: i64,
    pub name: String,
    pub target_amount: f64,
    #[serde(default)]
    pub current_amount: f64,
}
