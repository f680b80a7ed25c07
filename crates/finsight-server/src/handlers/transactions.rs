//! Transaction handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{AppError, AppState, CreatedResponse};
use finsight_core::models::{NewTransaction, Transaction, TransactionKind};

/// Query parameters for listing transactions
#[derive(Debug, Deserialize)]
pub struct TransactionQuery {
    /// Filter by kind (income, expense)
    pub kind: Option<String>,
    /// Only transactions on or after this instant (RFC 3339)
    pub since: Option<DateTime<Utc>>,
    /// Only transactions on or before this instant (RFC 3339)
    pub until: Option<DateTime<Utc>>,
}

/// POST /api/v1/transactions - Record a transaction
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewTransaction>,
) -> Result<Json<CreatedResponse>, AppError> {
    let id = state.db.insert_transaction(&body)?;
    Ok(Json(CreatedResponse { id }))
}

/// GET /api/v1/transactions/:user_id - List a user's transactions
///
/// Results are ordered by transaction date ascending.
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Query(params): Query<TransactionQuery>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let kind = match params.kind.as_deref() {
        Some(raw) => Some(
            raw.parse::<TransactionKind>()
                .map_err(|_| AppError::bad_request("Unknown transaction kind"))?,
        ),
        None => None,
    };

    let transactions = state
        .db
        .fetch_transactions(user_id, kind, params.since, params.until)?;

    Ok(Json(transactions))
}
