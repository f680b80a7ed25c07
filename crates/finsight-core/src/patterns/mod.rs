//! Pattern Recognition Engine
//!
//! Statistical pattern mining over a user's transaction history: category
//! variability, temporal habits, behavioral flags, IQR outliers, and
//! cross-category spending correlations. Every detector tolerates an empty
//! window by reporting [`Detection::InsufficientData`] instead of failing,
//! so [`PatternEngine::detect_all`] always aggregates all five reports.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};

use crate::db::Database;
use crate::error::Result;
use crate::models::{Transaction, TransactionKind};
use crate::stats;

mod types;

pub use types::{
    Anomaly, AnomalyReport, Behavior, BehavioralPatterns, CategoryCorrelation, CategoryPattern,
    CategoryPatterns, CorrelationDirection, CorrelationReport, CorrelationStrength,
    DayOfWeekPattern, Detection, HourlyBucket, PatternReport, PatternSet, RecurrenceFrequency,
    RecurringPattern, Severity, SpendingPatternKind, TemporalPatterns,
};

/// Lookback for category, behavioral, and correlation detection
const LONG_WINDOW_DAYS: i64 = 90;
/// Lookback for temporal and anomaly detection
const SHORT_WINDOW_DAYS: i64 = 30;
/// Minimum transactions per category before variability is classified
const MIN_CATEGORY_SAMPLES: usize = 5;
/// Minimum samples for the simplified IQR quartiles
const MIN_IQR_SAMPLES: usize = 4;
/// "Small purchase" cutoff in currency units
const SMALL_PURCHASE_LIMIT: f64 = 50.0;
/// "Large purchase" cutoff in currency units
const LARGE_PURCHASE_LIMIT: f64 = 500.0;

/// Pattern recognition over one user's transaction history
pub struct PatternEngine<'a> {
    db: &'a Database,
}

impl<'a> PatternEngine<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Run all five detectors and aggregate their reports unconditionally
    pub fn detect_all(&self, user_id: i64) -> Result<PatternReport> {
        let patterns = PatternSet {
            spending_patterns: self.spending_patterns(user_id)?,
            temporal_patterns: self.temporal_patterns(user_id)?,
            behavioral_patterns: self.behavioral_patterns(user_id)?,
            anomalies: self.anomalies(user_id)?,
            correlations: self.correlations(user_id)?,
        };

        tracing::debug!(user_id, "Pattern detection complete");

        Ok(PatternReport {
            user_id,
            patterns,
            analysis_timestamp: Utc::now(),
        })
    }

    fn expenses_since(&self, user_id: i64, days: i64) -> Result<Vec<Transaction>> {
        let since = Utc::now() - Duration::days(days);
        self.db
            .fetch_transactions(user_id, Some(TransactionKind::Expense), Some(since), None)
    }

    /// Category-wise variability classification over 90 days of expenses
    pub fn spending_patterns(&self, user_id: i64) -> Result<Detection<CategoryPatterns>> {
        let transactions = self.expenses_since(user_id, LONG_WINDOW_DAYS)?;
        if transactions.is_empty() {
            return Ok(Detection::InsufficientData);
        }

        let mut category_amounts: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for t in &transactions {
            category_amounts.entry(t.category.clone()).or_default().push(t.amount);
        }

        let mut patterns = Vec::new();
        for (category, amounts) in &category_amounts {
            if amounts.len() < MIN_CATEGORY_SAMPLES {
                continue;
            }

            let avg = stats::mean(amounts);
            let std_dev = stats::sample_std_dev(amounts);

            patterns.push(CategoryPattern {
                category: category.clone(),
                pattern_type: classify_spending_pattern(avg, std_dev),
                average_transaction: stats::round2(avg),
                std_deviation: stats::round2(std_dev),
                transaction_count: amounts.len(),
                total_spending: stats::round2(amounts.iter().sum()),
                consistency_score: consistency_score(avg, std_dev),
            });
        }

        let total_categories = patterns.len();
        Ok(Detection::success(CategoryPatterns {
            patterns,
            total_categories,
        }))
    }

    /// Weekday and hour-of-day spending habits over 30 days
    pub fn temporal_patterns(&self, user_id: i64) -> Result<Detection<TemporalPatterns>> {
        let transactions = self.expenses_since(user_id, SHORT_WINDOW_DAYS)?;
        if transactions.is_empty() {
            return Ok(Detection::InsufficientData);
        }

        let mut day_amounts: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        let mut hour_amounts: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
        for t in &transactions {
            let day = t.transaction_date.format("%A").to_string();
            day_amounts.entry(day).or_default().push(t.amount);
            hour_amounts
                .entry(t.transaction_date.hour())
                .or_default()
                .push(t.amount);
        }

        let peak_spending_day = peak_by_total(&day_amounts).cloned();
        let peak_spending_hour = peak_by_total(&hour_amounts).copied();

        let day_of_week_patterns = day_amounts
            .iter()
            .map(|(day, amounts)| DayOfWeekPattern {
                day: day.clone(),
                total_spending: stats::round2(amounts.iter().sum()),
                average_transaction: stats::round2(stats::mean(amounts)),
                transaction_count: amounts.len(),
            })
            .collect();

        let hourly_distribution = hour_amounts
            .iter()
            .map(|(hour, amounts)| {
                (
                    *hour,
                    HourlyBucket {
                        total: stats::round2(amounts.iter().sum()),
                        count: amounts.len(),
                    },
                )
            })
            .collect();

        Ok(Detection::success(TemporalPatterns {
            day_of_week_patterns,
            peak_spending_day,
            peak_spending_hour,
            hourly_distribution,
        }))
    }

    /// Behavioral flags over 90 days of expenses
    pub fn behavioral_patterns(&self, user_id: i64) -> Result<Detection<BehavioralPatterns>> {
        let transactions = self.expenses_since(user_id, LONG_WINDOW_DAYS)?;
        if transactions.is_empty() {
            return Ok(Detection::InsufficientData);
        }

        let mut behaviors = Vec::new();

        let small: Vec<&Transaction> = transactions
            .iter()
            .filter(|t| t.amount < SMALL_PURCHASE_LIMIT)
            .collect();
        if small.len() as f64 > transactions.len() as f64 * 0.5 {
            behaviors.push(Behavior::FrequentSmallPurchases {
                severity: Severity::Medium,
                description: format!("{} small purchases detected", small.len()),
                percentage: stats::round1(small.len() as f64 / transactions.len() as f64 * 100.0),
                recommendation:
                    "Consider consolidating purchases to reduce transaction frequency".to_string(),
            });
        }

        let large_amounts: Vec<f64> = transactions
            .iter()
            .filter(|t| t.amount > LARGE_PURCHASE_LIMIT)
            .map(|t| t.amount)
            .collect();
        if !large_amounts.is_empty() {
            behaviors.push(Behavior::LargePurchases {
                severity: Severity::Low,
                description: format!("{} large purchases detected", large_amounts.len()),
                average_large_purchase: stats::round2(stats::mean(&large_amounts)),
                recommendation: "Monitor large purchases for budget impact".to_string(),
            });
        }

        let recurring = detect_recurring(&transactions);
        if !recurring.is_empty() {
            behaviors.push(Behavior::RecurringTransactions {
                severity: Severity::Low,
                description: format!(
                    "{} recurring transaction patterns detected",
                    recurring.len()
                ),
                patterns: recurring,
                recommendation: "Consider setting up automatic payments for recurring expenses"
                    .to_string(),
            });
        }

        let per_day = transactions.len() as f64 / LONG_WINDOW_DAYS as f64;
        if per_day > 2.0 {
            behaviors.push(Behavior::HighTransactionVelocity {
                severity: Severity::Medium,
                description: format!("Average {:.1} transactions per day", per_day),
                recommendation: "High transaction frequency may indicate impulse spending"
                    .to_string(),
            });
        }

        let total_behaviors_detected = behaviors.len();
        Ok(Detection::success(BehavioralPatterns {
            behaviors,
            total_behaviors_detected,
        }))
    }

    /// IQR outliers and potential duplicates over 30 days of expenses
    pub fn anomalies(&self, user_id: i64) -> Result<Detection<AnomalyReport>> {
        let transactions = self.expenses_since(user_id, SHORT_WINDOW_DAYS)?;
        if transactions.is_empty() {
            return Ok(Detection::InsufficientData);
        }

        let mut anomalies = Vec::new();

        if transactions.len() >= MIN_IQR_SAMPLES {
            let mut sorted: Vec<f64> = transactions.iter().map(|t| t.amount).collect();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

            // Simplified quartiles at the len/4 and 3·len/4 index positions,
            // not interpolated. Preserved for behavioral compatibility.
            let q1 = sorted[sorted.len() / 4];
            let q3 = sorted[3 * sorted.len() / 4];
            let iqr = q3 - q1;
            let upper_bound = q3 + 1.5 * iqr;

            for t in &transactions {
                if t.amount > upper_bound {
                    let severity = if t.amount > upper_bound * 1.5 {
                        Severity::High
                    } else {
                        Severity::Medium
                    };
                    anomalies.push(Anomaly::OutlierHigh {
                        transaction_id: t.id,
                        amount: stats::round2(t.amount),
                        category: t.category.clone(),
                        date: t.transaction_date,
                        severity,
                        description: format!(
                            "Transaction amount ${:.2} is significantly higher than typical",
                            t.amount
                        ),
                    });
                }
            }
        }

        let mut signatures: BTreeMap<(String, i64), Vec<DateTime<Utc>>> = BTreeMap::new();
        for t in &transactions {
            signatures
                .entry(signature(t))
                .or_default()
                .push(t.transaction_date);
        }

        for ((category, cents), mut dates) in signatures {
            if dates.len() <= 2 {
                continue;
            }
            dates.sort();
            let close_pair = dates
                .windows(2)
                .any(|pair| (pair[1] - pair[0]).num_days() <= 1);
            if close_pair {
                anomalies.push(Anomaly::PotentialDuplicate {
                    severity: Severity::Medium,
                    category,
                    amount: cents as f64 / 100.0,
                    count: dates.len(),
                    description: "Multiple similar transactions detected".to_string(),
                });
            }
        }

        let total_anomalies = anomalies.len();
        Ok(Detection::success(AnomalyReport {
            anomalies,
            total_anomalies,
        }))
    }

    /// Pearson correlation between weekly category totals over 90 days
    pub fn correlations(&self, user_id: i64) -> Result<Detection<CorrelationReport>> {
        let transactions = self.expenses_since(user_id, LONG_WINDOW_DAYS)?;
        if transactions.is_empty() {
            return Ok(Detection::InsufficientData);
        }

        // Weekly expense totals per (ISO week, category)
        let mut weekly: BTreeMap<u32, BTreeMap<String, f64>> = BTreeMap::new();
        for t in &transactions {
            let week = t.transaction_date.iso_week().week();
            *weekly
                .entry(week)
                .or_default()
                .entry(t.category.clone())
                .or_insert(0.0) += t.amount;
        }

        let categories: BTreeSet<&String> = transactions.iter().map(|t| &t.category).collect();
        let categories: Vec<&String> = categories.into_iter().collect();

        let mut correlations = Vec::new();
        for (i, cat1) in categories.iter().enumerate() {
            for cat2 in &categories[i + 1..] {
                let series1: Vec<f64> = weekly
                    .values()
                    .map(|week| week.get(*cat1).copied().unwrap_or(0.0))
                    .collect();
                let series2: Vec<f64> = weekly
                    .values()
                    .map(|week| week.get(*cat2).copied().unwrap_or(0.0))
                    .collect();

                if series1.len() <= 2
                    || series1.iter().sum::<f64>() == 0.0
                    || series2.iter().sum::<f64>() == 0.0
                {
                    continue;
                }

                let r = stats::pearson(&series1, &series2);
                if r.abs() > 0.6 {
                    correlations.push(CategoryCorrelation {
                        category_1: (*cat1).clone(),
                        category_2: (*cat2).clone(),
                        correlation_coefficient: stats::round2(r),
                        relationship: if r > 0.0 {
                            CorrelationDirection::Positive
                        } else {
                            CorrelationDirection::Negative
                        },
                        strength: if r.abs() > 0.8 {
                            CorrelationStrength::Strong
                        } else {
                            CorrelationStrength::Moderate
                        },
                    });
                }
            }
        }

        let total_correlations = correlations.len();
        Ok(Detection::success(CorrelationReport {
            correlations,
            total_correlations,
        }))
    }
}

/// Signature for recurring/duplicate detection: category plus amount rounded
/// to cents
fn signature(t: &Transaction) -> (String, i64) {
    (t.category.clone(), (t.amount * 100.0).round() as i64)
}

fn classify_spending_pattern(avg: f64, std_dev: f64) -> SpendingPatternKind {
    if std_dev < avg * 0.2 {
        SpendingPatternKind::Consistent
    } else if std_dev > avg * 0.8 {
        SpendingPatternKind::HighlyVariable
    } else {
        SpendingPatternKind::ModerateVariable
    }
}

/// Consistency score in [0, 100], inversely proportional to the coefficient
/// of variation
fn consistency_score(avg: f64, std_dev: f64) -> f64 {
    if avg == 0.0 {
        return 0.0;
    }
    let cv_percent = std_dev / avg * 100.0;
    stats::round1((100.0 - cv_percent).clamp(0.0, 100.0))
}

/// Bucket key with the highest total
fn peak_by_total<K>(buckets: &BTreeMap<K, Vec<f64>>) -> Option<&K>
where
    K: Ord,
{
    buckets
        .iter()
        .max_by(|a, b| {
            let sum_a: f64 = a.1.iter().sum();
            let sum_b: f64 = b.1.iter().sum();
            sum_a.partial_cmp(&sum_b).unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(k, _)| k)
}

/// Signatures recurring ≥3 times with a monthly or weekly mean gap
fn detect_recurring(transactions: &[Transaction]) -> Vec<RecurringPattern> {
    let mut by_signature: BTreeMap<(String, i64), Vec<DateTime<Utc>>> = BTreeMap::new();
    for t in transactions {
        by_signature
            .entry(signature(t))
            .or_default()
            .push(t.transaction_date);
    }

    let mut patterns = Vec::new();
    for ((category, cents), mut dates) in by_signature {
        if dates.len() < 3 {
            continue;
        }
        dates.sort();
        let intervals: Vec<f64> = dates
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).num_days() as f64)
            .collect();
        let avg_interval = stats::mean(&intervals);

        let frequency = if (25.0..=35.0).contains(&avg_interval) {
            Some(RecurrenceFrequency::Monthly)
        } else if (5.0..=8.0).contains(&avg_interval) {
            Some(RecurrenceFrequency::Weekly)
        } else {
            None
        };

        if let Some(frequency) = frequency {
            patterns.push(RecurringPattern {
                category,
                amount: cents as f64 / 100.0,
                frequency,
                occurrences: dates.len(),
            });
        }
    }
    patterns
}
