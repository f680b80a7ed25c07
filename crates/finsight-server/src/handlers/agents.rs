//! Agent orchestration handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::{AppError, AppState};
use finsight_core::{AgentInput, OrchestratorStatus, TaskExecution, TaskKind};

/// Request body for task execution
#[derive(Debug, Deserialize)]
pub struct ExecuteTaskRequest {
    /// Which roster of agents to run
    pub task_type: TaskKind,
    /// Financial snapshot shared by every agent
    pub input: AgentInput,
}

/// POST /api/v1/agents/execute - Run a task's agent roster and synthesize
pub async fn execute_task(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ExecuteTaskRequest>,
) -> Result<Json<TaskExecution>, AppError> {
    let mut orchestrator = state
        .orchestrator
        .lock()
        .map_err(|_| AppError::internal("Orchestrator unavailable"))?;

    Ok(Json(orchestrator.execute(body.task_type, &body.input)?))
}

/// GET /api/v1/agents/status - Registered agents and execution counts
pub async fn agent_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<OrchestratorStatus>, AppError> {
    let orchestrator = state
        .orchestrator
        .lock()
        .map_err(|_| AppError::internal("Orchestrator unavailable"))?;

    Ok(Json(orchestrator.status()))
}
