//! Integration tests for finsight-core
//!
//! These tests exercise the full seed → detect → recommend → orchestrate
//! workflow against a real database.

use chrono::{Duration, Utc};

use finsight_core::{
    db::Database,
    models::{GoalStatus, NewGoal, NewTransaction, TransactionKind},
    patterns::{Behavior, PatternEngine, RecurrenceFrequency},
    recommend::Recommender,
    AgentInput, Orchestrator, PredictiveEngine, TaskKind,
};

fn expense(user_id: i64, category: &str, amount: f64, days_ago: i64) -> NewTransaction {
    NewTransaction {
        user_id,
        kind: TransactionKind::Expense,
        category: category.to_string(),
        source: None,
        amount,
        description: format!("{} purchase", category),
        transaction_date: Utc::now() - Duration::days(days_ago),
    }
}

fn income(user_id: i64, amount: f64, days_ago: i64) -> NewTransaction {
    NewTransaction {
        user_id,
        kind: TransactionKind::Income,
        category: "salary".to_string(),
        source: Some("employer".to_string()),
        amount,
        description: "Monthly salary".to_string(),
        transaction_date: Utc::now() - Duration::days(days_ago),
    }
}

// =============================================================================
// Pattern Detection Workflow
// =============================================================================

#[test]
fn test_seed_and_detect_workflow() {
    let db = Database::in_memory().expect("Failed to create test database");

    // A month of daily groceries at a steady price
    for day in 1..=20 {
        db.insert_transaction(&expense(1, "groceries", 45.0, day))
            .expect("Failed to insert transaction");
    }
    // A monthly streaming charge, same amount, ~30 day cadence
    for days_ago in [5, 35, 65] {
        db.insert_transaction(&expense(1, "entertainment", 15.49, days_ago))
            .expect("Failed to insert transaction");
    }

    let engine = PatternEngine::new(&db);
    let report = engine.detect_all(1).expect("Detection failed");
    assert_eq!(report.user_id, 1);

    // Twenty same-priced purchases classify groceries as consistent
    let categories = report
        .patterns
        .spending_patterns
        .report()
        .expect("Expected spending patterns");
    let groceries = categories
        .patterns
        .iter()
        .find(|p| p.category == "groceries")
        .expect("Expected a groceries pattern");
    assert_eq!(groceries.transaction_count, 20);
    assert_eq!(groceries.consistency_score, 100.0);

    // The streaming charge surfaces as a monthly recurring pattern
    let behavioral = report
        .patterns
        .behavioral_patterns
        .report()
        .expect("Expected behavioral patterns");
    let recurring = behavioral
        .behaviors
        .iter()
        .find_map(|b| match b {
            Behavior::RecurringTransactions { patterns, .. } => patterns
                .iter()
                .find(|p| p.category == "entertainment"),
            _ => None,
        })
        .expect("Expected a recurring entertainment charge");
    assert_eq!(recurring.frequency, RecurrenceFrequency::Monthly);
    assert_eq!(recurring.occurrences, 3);
}

#[test]
fn test_anomaly_detection_flags_outlier() {
    let db = Database::in_memory().expect("Failed to create test database");

    for day in 1..=10 {
        db.insert_transaction(&expense(1, "dining", 20.0, day))
            .expect("Failed to insert transaction");
    }
    db.insert_transaction(&expense(1, "dining", 800.0, 3))
        .expect("Failed to insert transaction");

    let engine = PatternEngine::new(&db);
    let detection = engine.anomalies(1).expect("Detection failed");
    let report = detection.report().expect("Expected an anomaly report");

    let amounts: Vec<f64> = report
        .anomalies
        .iter()
        .filter_map(|a| match a {
            finsight_core::patterns::Anomaly::OutlierHigh { amount, .. } => Some(*amount),
            _ => None,
        })
        .collect();
    assert!(amounts.contains(&800.0), "Outlier should be flagged");
    assert!(!amounts.contains(&20.0), "Baseline should not be flagged");
}

// =============================================================================
// Recommendation Workflow
// =============================================================================

#[test]
fn test_recommendation_pipeline_ranks_by_priority() {
    let db = Database::in_memory().expect("Failed to create test database");

    // Many small dining purchases: triggers consolidation (priority 7) and,
    // being discretionary, a savings opportunity (priority 8)
    for day in 1..=10 {
        db.insert_transaction(&expense(1, "dining", 12.0, day))
            .expect("Failed to insert transaction");
    }

    let recommender = Recommender::new();
    let report = recommender.recommend(&db, 1).expect("Recommendation failed");

    assert!(report.total_recommendations >= 2);
    assert_eq!(report.total_recommendations, report.recommendations.len());

    // Descending priority order
    for pair in report.recommendations.windows(2) {
        assert!(pair[0].priority_score >= pair[1].priority_score);
    }
    assert_eq!(report.recommendations[0].priority_score, 8);
}

#[test]
fn test_goal_workflow_feeds_recommendations() {
    let db = Database::in_memory().expect("Failed to create test database");

    let goal_id = db
        .insert_goal(&NewGoal {
            user_id: 1,
            name: "Vacation".to_string(),
            target_amount: 2000.0,
            current_amount: 100.0,
        })
        .expect("Failed to insert goal");

    // Under 25% progress: the goal analyzer suggests acceleration
    let recommender = Recommender::new();
    let report = recommender.recommend(&db, 1).expect("Recommendation failed");
    assert!(report
        .recommendations
        .iter()
        .any(|r| r.goal_id == Some(goal_id)));

    // Completing the goal removes it from consideration
    db.update_goal_progress(goal_id, 2000.0)
        .expect("Failed to update goal");
    let goals = db.fetch_goals(1).expect("Failed to fetch goals");
    assert_eq!(goals[0].status, GoalStatus::Completed);

    let report = recommender.recommend(&db, 1).expect("Recommendation failed");
    assert!(report
        .recommendations
        .iter()
        .all(|r| r.goal_id != Some(goal_id)));
}

// =============================================================================
// Prediction and Orchestration Workflow
// =============================================================================

#[test]
fn test_prediction_history_accumulates() {
    let mut engine = PredictiveEngine::default();

    let daily = [100.0, 110.0, 90.0, 105.0, 95.0, 100.0, 102.0];
    engine
        .forecast_spending(&daily, 30, 0.95)
        .expect("Forecast failed");
    engine
        .project_savings(1000.0, 200.0, 0.05, 12)
        .expect("Projection failed");
    engine
        .assess_financial_health(6000.0, 3000.0, 1200.0, 500.0, 9000.0)
        .expect("Assessment failed");

    assert_eq!(engine.history().count(), 3);
}

#[test]
fn test_orchestrator_full_task() {
    let mut orchestrator = Orchestrator::new();

    let input = AgentInput {
        income: 6000.0,
        expenses: 3000.0,
        savings: 1200.0,
        debt: 500.0,
        emergency_fund: 9000.0,
        monthly_spending: vec![2900.0, 3000.0, 3100.0],
        monthly_income: vec![6000.0, 6000.0, 6000.0],
    };

    let execution = orchestrator
        .execute(TaskKind::FinancialPlanning, &input)
        .expect("Execution failed");

    assert_eq!(execution.agent_results.len(), 3);
    let synthesis = &execution.synthesized_recommendation;
    assert_eq!(synthesis.confidence_score, 1.0);
    assert!(!synthesis.key_insights.is_empty());
    assert!(!synthesis.next_steps.is_empty());

    let status = orchestrator.status();
    assert_eq!(status.total_executions, 1);
    assert!(status.last_execution.is_some());
}

// =============================================================================
// Behavioral Flags
// =============================================================================

#[test]
fn test_large_purchase_behavior_flagged() {
    let db = Database::in_memory().expect("Failed to create test database");

    for day in 1..=6 {
        db.insert_transaction(&expense(1, "shopping", 100.0, day))
            .expect("Failed to insert transaction");
    }
    db.insert_transaction(&expense(1, "electronics", 1200.0, 2))
        .expect("Failed to insert transaction");

    let engine = PatternEngine::new(&db);
    let detection = engine.behavioral_patterns(1).expect("Detection failed");
    let report = detection.report().expect("Expected behavioral patterns");

    assert!(report
        .behaviors
        .iter()
        .any(|b| matches!(b, Behavior::LargePurchases { .. })));
}
