//! Finsight Web Server
//!
//! Axum-based REST API over the finsight-core engines. Every route is thin
//! glue: deserialize a typed request, call one core operation, serialize the
//! typed result.
//!
//! - Restrictive CORS policy
//! - Sanitized error responses (internal errors are logged, not returned)
//! - Security headers on every response

use std::sync::{Arc, Mutex};

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info};

use finsight_core::{Database, Orchestrator, PredictiveEngine};

mod handlers;

/// Shared application state
pub struct AppState {
    pub db: Database,
    /// Forecasting engine, locked because it records a prediction history
    pub predictive: Mutex<PredictiveEngine>,
    /// Agent orchestrator, locked because it keeps an execution log
    pub orchestrator: Mutex<Orchestrator>,
}

/// Response for create endpoints
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

/// Generic success response
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router
pub fn create_router(db: Database, history_capacity: usize) -> Router {
    let state = Arc::new(AppState {
        db,
        predictive: Mutex::new(PredictiveEngine::new(history_capacity)),
        orchestrator: Mutex::new(Orchestrator::new()),
    });

    let api_routes = Router::new()
        // Transactions
        .route("/transactions", post(handlers::create_transaction))
        .route("/transactions/:user_id", get(handlers::list_transactions))
        // Goals
        .route("/goals", post(handlers::create_goal))
        .route("/goals/:user_id", get(handlers::list_goals))
        .route(
            "/goals/progress/:goal_id",
            patch(handlers::update_goal_progress),
        )
        // Pattern recognition
        .route("/patterns/:user_id", get(handlers::detect_patterns))
        .route(
            "/patterns/:user_id/spending",
            get(handlers::spending_patterns),
        )
        .route(
            "/patterns/:user_id/temporal",
            get(handlers::temporal_patterns),
        )
        .route(
            "/patterns/:user_id/behavioral",
            get(handlers::behavioral_patterns),
        )
        .route("/patterns/:user_id/anomalies", get(handlers::anomalies))
        .route(
            "/patterns/:user_id/correlations",
            get(handlers::correlations),
        )
        // Predictions
        .route(
            "/predictions/spending-forecast",
            post(handlers::forecast_spending),
        )
        .route(
            "/predictions/income-forecast",
            post(handlers::forecast_income),
        )
        .route(
            "/predictions/savings-projection",
            post(handlers::project_savings),
        )
        .route(
            "/predictions/goal-achievement",
            post(handlers::predict_goal_achievement),
        )
        .route(
            "/predictions/financial-health",
            post(handlers::assess_financial_health),
        )
        .route(
            "/predictions/anomalies",
            post(handlers::predict_anomalies),
        )
        .route("/predictions/history", get(handlers::prediction_history))
        // Analytics
        .route(
            "/analytics/spending-patterns",
            post(handlers::analyze_spending_patterns),
        )
        .route(
            "/analytics/income-trends",
            post(handlers::analyze_income_trends),
        )
        .route(
            "/analytics/savings-rate",
            post(handlers::calculate_savings_rate),
        )
        .route(
            "/analytics/budget-variance",
            post(handlers::analyze_budget_variance),
        )
        .route("/analytics/cash-flow", post(handlers::analyze_cash_flow))
        // Recommendations
        .route(
            "/recommendations/:user_id",
            get(handlers::get_recommendations),
        )
        .route(
            "/recommendations/:user_id/category/:category",
            get(handlers::get_category_recommendations),
        )
        // Agents
        .route("/agents/execute", post(handlers::execute_task))
        .route("/agents/status", get(handlers::agent_status))
        // Health check
        .route("/health", get(handlers::health));

    // Restrictive default: same-origin only
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .nest("/api/v1", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
        ))
}

/// Start the server
pub async fn serve(
    db: Database,
    host: &str,
    port: u16,
    history_capacity: usize,
) -> anyhow::Result<()> {
    let app = create_router(db, history_capacity);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl From<finsight_core::Error> for AppError {
    fn from(err: finsight_core::Error) -> Self {
        use finsight_core::Error;

        match err {
            Error::InsufficientData(msg) | Error::InvalidInput(msg) => Self {
                status: StatusCode::BAD_REQUEST,
                message: msg,
                internal: None,
            },
            Error::NoData(msg) => Self {
                status: StatusCode::NOT_FOUND,
                message: msg,
                internal: None,
            },
            other => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                // Return generic message to client
                message: "An internal error occurred".to_string(),
                // Keep full error for logging
                internal: Some(other.into()),
            },
        }
    }
}

#[cfg(test)]
mod tests;
