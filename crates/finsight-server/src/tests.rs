//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use tower::ServiceExt;

use finsight_core::models::{NewTransaction, TransactionKind};
use finsight_core::Database;

fn setup_test_app() -> (Database, Router) {
    let db = Database::in_memory().unwrap();
    let app = create_router(db.clone(), finsight_core::DEFAULT_HISTORY_CAPACITY);
    (db, app)
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn seed_expense(db: &Database, category: &str, amount: f64, days_ago: i64) {
    db.insert_transaction(&NewTransaction {
        user_id: 1,
        kind: TransactionKind::Expense,
        category: category.to_string(),
        source: None,
        amount,
        description: format!("{} purchase", category),
        transaction_date: Utc::now() - Duration::days(days_ago),
    })
    .unwrap();
}

// ========== Health ==========

#[tokio::test]
async fn test_health_check() {
    let (_db, app) = setup_test_app();

    let response = app.oneshot(get("/api/v1/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
}

// ========== Transaction API ==========

#[tokio::test]
async fn test_create_and_list_transactions() {
    let (_db, app) = setup_test_app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/transactions",
            serde_json::json!({
                "user_id": 1,
                "kind": "expense",
                "category": "groceries",
                "amount": 42.50,
                "description": "Weekly shop",
                "transaction_date": Utc::now().to_rfc3339(),
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert!(json["id"].as_i64().unwrap() > 0);

    let response = app.oneshot(get("/api/v1/transactions/1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let transactions = json.as_array().unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0]["category"], "groceries");
    assert_eq!(transactions[0]["kind"], "expense");
}

#[tokio::test]
async fn test_list_transactions_rejects_unknown_kind() {
    let (_db, app) = setup_test_app();

    let response = app
        .oneshot(get("/api/v1/transactions/1?kind=loan"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Unknown transaction kind");
}

#[tokio::test]
async fn test_list_transactions_kind_filter() {
    let (db, app) = setup_test_app();
    seed_expense(&db, "dining", 30.0, 1);
    db.insert_transaction(&NewTransaction {
        user_id: 1,
        kind: TransactionKind::Income,
        category: "salary".to_string(),
        source: Some("employer".to_string()),
        amount: 3000.0,
        description: "Monthly salary".to_string(),
        transaction_date: Utc::now() - Duration::days(1),
    })
    .unwrap();

    let response = app
        .oneshot(get("/api/v1/transactions/1?kind=income"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let transactions = json.as_array().unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0]["kind"], "income");
}

// ========== Goal API ==========

#[tokio::test]
async fn test_goal_lifecycle() {
    let (_db, app) = setup_test_app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/goals",
            serde_json::json!({
                "user_id": 1,
                "name": "Emergency fund",
                "target_amount": 5000.0,
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let goal_id = get_body_json(response).await["id"].as_i64().unwrap();

    // Reaching the target marks the goal completed
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/v1/goals/progress/{}", goal_id))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({ "current_amount": 5000.0 }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/api/v1/goals/1")).await.unwrap();
    let json = get_body_json(response).await;
    let goals = json.as_array().unwrap();
    assert_eq!(goals.len(), 1);
    assert_eq!(goals[0]["status"], "completed");
    assert_eq!(goals[0]["current_amount"], 5000.0);
}

#[tokio::test]
async fn test_update_missing_goal_returns_404() {
    let (_db, app) = setup_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri("/api/v1/goals/progress/999")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({ "current_amount": 10.0 }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ========== Pattern API ==========

#[tokio::test]
async fn test_patterns_empty_user_reports_insufficient_data() {
    let (_db, app) = setup_test_app();

    let response = app.oneshot(get("/api/v1/patterns/1")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["user_id"], 1);
    assert_eq!(
        json["patterns"]["spending_patterns"]["status"],
        "insufficient_data"
    );
    assert_eq!(json["patterns"]["anomalies"]["status"], "insufficient_data");
}

#[tokio::test]
async fn test_spending_patterns_detector_route() {
    let (db, app) = setup_test_app();
    // Five same-priced purchases make one consistent category
    for day in 0..5 {
        seed_expense(&db, "groceries", 50.0, day);
    }

    let response = app
        .oneshot(get("/api/v1/patterns/1/spending"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["total_categories"], 1);
    assert_eq!(json["patterns"][0]["category"], "groceries");
    assert_eq!(json["patterns"][0]["pattern_type"], "consistent");
}

// ========== Prediction API ==========

#[tokio::test]
async fn test_spending_forecast_rejects_short_history() {
    let (_db, app) = setup_test_app();

    let response = app
        .oneshot(post_json(
            "/api/v1/predictions/spending-forecast",
            serde_json::json!({ "historical_spending": [10.0, 12.0, 11.0] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_spending_forecast_records_history() {
    let (_db, app) = setup_test_app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/predictions/spending-forecast",
            serde_json::json!({
                "historical_spending": [100.0, 110.0, 90.0, 105.0, 95.0, 100.0, 102.0],
                "forecast_days": 14,
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["forecast_days"], 14);
    assert_eq!(json["forecast_values"].as_array().unwrap().len(), 14);

    let response = app.oneshot(get("/api/v1/predictions/history")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let history = json.as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["prediction_type"], "spending_forecast");
}

#[tokio::test]
async fn test_financial_health_perfect_vector() {
    let (_db, app) = setup_test_app();

    let response = app
        .oneshot(post_json(
            "/api/v1/predictions/financial-health",
            serde_json::json!({
                "income": 10000.0,
                "expenses": 5000.0,
                "savings": 2500.0,
                "debt": 2000.0,
                "emergency_fund": 5000.0,
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["current_health_score"], 100.0);
    assert_eq!(json["health_category"], "Excellent");
}

#[tokio::test]
async fn test_goal_achievement_route() {
    let (_db, app) = setup_test_app();

    let response = app
        .oneshot(post_json(
            "/api/v1/predictions/goal-achievement",
            serde_json::json!({
                "goal_amount": 5000.0,
                "current_progress": 0.0,
                "monthly_contribution": 500.0,
                "goal_deadline_months": 10,
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["achievement_status"], "On Track");
    assert_eq!(json["achievement_probability"], 0.95);
}

// ========== Analytics API ==========

#[tokio::test]
async fn test_savings_rate_route() {
    let (_db, app) = setup_test_app();

    // Exactly 20% sits on the Good boundary
    let response = app
        .oneshot(post_json(
            "/api/v1/analytics/savings-rate",
            serde_json::json!({
                "income": 5000.0,
                "expenses": 4000.0,
                "savings": 1000.0,
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["savings_rate_percent"], 20.0);
    assert_eq!(json["savings_rate_category"], "Good");
}

#[tokio::test]
async fn test_savings_rate_rejects_non_positive_income() {
    let (_db, app) = setup_test_app();

    let response = app
        .oneshot(post_json(
            "/api/v1/analytics/savings-rate",
            serde_json::json!({ "income": 0.0, "expenses": 100.0, "savings": 0.0 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_spending_analysis_requires_transactions() {
    let (_db, app) = setup_test_app();

    let response = app
        .oneshot(post_json(
            "/api/v1/analytics/spending-patterns",
            serde_json::json!({ "user_id": 1 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_budget_variance_route() {
    let (_db, app) = setup_test_app();

    let response = app
        .oneshot(post_json(
            "/api/v1/analytics/budget-variance",
            serde_json::json!({
                "budget": { "food": 100.0 },
                "actual_spending": { "food": 150.0 },
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let food = &json["category_analysis"]["food"];
    assert_eq!(food["variance"], 50.0);
    assert_eq!(food["variance_percent"], 50.0);
    assert_eq!(food["status"], "Over");
}

#[tokio::test]
async fn test_cash_flow_route() {
    let (db, app) = setup_test_app();
    seed_expense(&db, "dining", 100.0, 1);
    db.insert_transaction(&NewTransaction {
        user_id: 1,
        kind: TransactionKind::Income,
        category: "salary".to_string(),
        source: Some("employer".to_string()),
        amount: 400.0,
        description: "Paycheck".to_string(),
        transaction_date: Utc::now() - Duration::days(2),
    })
    .unwrap();

    let response = app
        .oneshot(post_json(
            "/api/v1/analytics/cash-flow",
            serde_json::json!({ "user_id": 1 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["net_cash_flow"], 300.0);
}

// ========== Recommendation API ==========

#[tokio::test]
async fn test_recommendations_empty_user() {
    let (_db, app) = setup_test_app();

    let response = app.oneshot(get("/api/v1/recommendations/1")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["total_recommendations"], 0);
}

#[tokio::test]
async fn test_category_recommendations_missing_category() {
    let (_db, app) = setup_test_app();

    let response = app
        .oneshot(get("/api/v1/recommendations/1/category/dining"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ========== Agent API ==========

#[tokio::test]
async fn test_execute_financial_planning_task() {
    let (_db, app) = setup_test_app();

    let response = app
        .oneshot(post_json(
            "/api/v1/agents/execute",
            serde_json::json!({
                "task_type": "financial_planning",
                "input": {
                    "income": 6000.0,
                    "expenses": 3000.0,
                    "savings": 1200.0,
                    "debt": 500.0,
                    "emergency_fund": 9000.0,
                },
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["task_type"], "financial_planning");
    // Full roster available, so every agent reports
    assert_eq!(
        json["synthesized_recommendation"]["confidence_score"],
        1.0
    );
    assert_eq!(
        json["agent_results"]["financial_advisor"]["status"],
        "success"
    );
}

#[tokio::test]
async fn test_agent_status_route() {
    let (_db, app) = setup_test_app();

    let response = app.oneshot(get("/api/v1/agents/status")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["total_agents"], 3);
    assert_eq!(json["total_executions"], 0);
    assert!(json["last_execution"].is_null());
}

// ========== Security headers ==========

#[tokio::test]
async fn test_security_headers_present() {
    let (_db, app) = setup_test_app();

    let response = app.oneshot(get("/api/v1/health")).await.unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
}
