use axum::{
    extract::{Query, State},
    Json,
};
use contracts::system::logs::LogEntry;
use serde::Deserialize;

use crate::state::AppState;

const DEFAULT_LIMIT: u64 = 100;

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub limit: Option<u64>,
}

/// GET /api/logs
pub async fn list_recent(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<Vec<LogEntry>>, axum::http::StatusCode> {
    match state
        .logs
        .list_recent(query.limit.unwrap_or(DEFAULT_LIMIT))
        .await
    {
        Ok(logs) => Ok(Json(logs)),
        Err(e) => {
            tracing::error!("Failed to list logs: {}", e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
