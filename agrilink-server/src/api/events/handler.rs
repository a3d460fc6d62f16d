//! Event Log Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use shared::escrow::EscrowEvent;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError, AppResult, ok};

/// `?since=N` (exclusive)
#[derive(Debug, Default, Deserialize)]
pub struct SinceQuery {
    #[serde(default)]
    pub since: u64,
}

/// Event batch plus the sequence to resume from
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBatch {
    pub epoch: String,
    pub current_sequence: u64,
    pub events: Vec<EscrowEvent>,
}

/// Events with sequence > since, ascending
pub async fn since(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<SinceQuery>,
) -> AppResult<Json<ApiResponse<EventBatch>>> {
    user.require_admin()?;

    let escrow = state.escrow.clone();
    let (events, current_sequence) = tokio::task::spawn_blocking(move || {
        let events = escrow.get_events_since(query.since)?;
        let current = escrow.get_current_sequence()?;
        Ok::<_, crate::escrow::ManagerError>((events, current))
    })
    .await
    .map_err(|e| AppError::internal(format!("event task failed: {}", e)))?
    .map_err(|e| AppError::database(e.to_string()))?;

    Ok(ok(EventBatch {
        epoch: state.escrow.epoch().to_string(),
        current_sequence,
        events,
    }))
}
