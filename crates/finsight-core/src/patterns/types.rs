//! Result records for the pattern recognition engine
//!
//! Every detector returns a [`Detection`] so that an empty analysis window
//! yields `{"status": "insufficient_data"}` instead of an error or a report
//! full of zeros.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a single pattern detector
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Detection<T> {
    Success {
        #[serde(flatten)]
        report: T,
    },
    InsufficientData,
}

impl<T> Detection<T> {
    pub fn success(report: T) -> Self {
        Self::Success { report }
    }

    /// The report, if the detector had enough data
    pub fn report(&self) -> Option<&T> {
        match self {
            Self::Success { report } => Some(report),
            Self::InsufficientData => None,
        }
    }
}

/// How severe a detected behavior or anomaly is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Variability classification of a category's spending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpendingPatternKind {
    /// stdev < 0.2 × mean
    Consistent,
    /// stdev > 0.8 × mean
    HighlyVariable,
    ModerateVariable,
}

/// Per-category spending statistics over the analysis window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPattern {
    pub category: String,
    pub pattern_type: SpendingPatternKind,
    pub average_transaction: f64,
    pub std_deviation: f64,
    pub transaction_count: usize,
    pub total_spending: f64,
    /// 100 − 100·stdev/mean, clamped to [0, 100]
    pub consistency_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPatterns {
    pub patterns: Vec<CategoryPattern>,
    pub total_categories: usize,
}

/// Spending totals for one weekday
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayOfWeekPattern {
    pub day: String,
    pub total_spending: f64,
    pub average_transaction: f64,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlyBucket {
    pub total: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalPatterns {
    pub day_of_week_patterns: Vec<DayOfWeekPattern>,
    pub peak_spending_day: Option<String>,
    pub peak_spending_hour: Option<u32>,
    pub hourly_distribution: BTreeMap<u32, HourlyBucket>,
}

/// Cadence of a recurring (category, amount) signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceFrequency {
    /// Mean inter-occurrence gap of 25-35 days
    Monthly,
    /// Mean inter-occurrence gap of 5-8 days
    Weekly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringPattern {
    pub category: String,
    pub amount: f64,
    pub frequency: RecurrenceFrequency,
    pub occurrences: usize,
}

/// A detected spending behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "behavior", rename_all = "snake_case")]
pub enum Behavior {
    /// More than half of window transactions are under 50 units
    FrequentSmallPurchases {
        severity: Severity,
        description: String,
        percentage: f64,
        recommendation: String,
    },
    /// At least one transaction over 500 units
    LargePurchases {
        severity: Severity,
        description: String,
        average_large_purchase: f64,
        recommendation: String,
    },
    RecurringTransactions {
        severity: Severity,
        description: String,
        patterns: Vec<RecurringPattern>,
        recommendation: String,
    },
    /// More than 2 transactions per day averaged over the window
    HighTransactionVelocity {
        severity: Severity,
        description: String,
        recommendation: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehavioralPatterns {
    pub behaviors: Vec<Behavior>,
    pub total_behaviors_detected: usize,
}

/// A statistically unusual transaction or transaction group
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "anomaly_type", rename_all = "snake_case")]
pub enum Anomaly {
    /// Amount above Q3 + 1.5·IQR for the window
    OutlierHigh {
        transaction_id: i64,
        amount: f64,
        category: String,
        date: DateTime<Utc>,
        severity: Severity,
        description: String,
    },
    /// Same (category, amount) more than twice with a pair ≤1 day apart
    PotentialDuplicate {
        severity: Severity,
        category: String,
        amount: f64,
        count: usize,
        description: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub anomalies: Vec<Anomaly>,
    pub total_anomalies: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationDirection {
    Positive,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationStrength {
    /// |r| > 0.8
    Strong,
    /// 0.6 < |r| ≤ 0.8
    Moderate,
}

/// Weekly spending correlation between two categories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCorrelation {
    pub category_1: String,
    pub category_2: String,
    pub correlation_coefficient: f64,
    pub relationship: CorrelationDirection,
    pub strength: CorrelationStrength,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationReport {
    pub correlations: Vec<CategoryCorrelation>,
    pub total_correlations: usize,
}

/// All five detector outcomes, aggregated unconditionally
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternSet {
    pub spending_patterns: Detection<CategoryPatterns>,
    pub temporal_patterns: Detection<TemporalPatterns>,
    pub behavioral_patterns: Detection<BehavioralPatterns>,
    pub anomalies: Detection<AnomalyReport>,
    pub correlations: Detection<CorrelationReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternReport {
    pub user_id: i64,
    pub patterns: PatternSet,
    pub analysis_timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_serializes_with_status_tag() {
        let hit: Detection<CategoryPatterns> = Detection::success(CategoryPatterns {
            patterns: vec![],
            total_categories: 0,
        });
        let json = serde_json::to_value(&hit).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["total_categories"], 0);

        let miss: Detection<CategoryPatterns> = Detection::InsufficientData;
        let json = serde_json::to_value(&miss).unwrap();
        assert_eq!(json["status"], "insufficient_data");
        assert!(miss.report().is_none());
    }

    #[test]
    fn test_anomaly_tagging() {
        let anomaly = Anomaly::PotentialDuplicate {
            severity: Severity::Medium,
            category: "dining".to_string(),
            amount: 12.5,
            count: 3,
            description: "Multiple similar transactions detected".to_string(),
        };
        let json = serde_json::to_value(&anomaly).unwrap();
        assert_eq!(json["anomaly_type"], "potential_duplicate");
        assert_eq!(json["severity"], "medium");
    }
}
