//! Exception Auditor Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::convert::investigate_error;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::escrow::auditor::{self, ExceptionReport, InvestigationReport};
use crate::utils::{ApiResponse, AppResult, ok};

/// Scan all deliveries for exceptions
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<ExceptionReport>>> {
    user.require_admin()?;
    let snapshot = state.snapshot().await?;
    let report = auditor::find_exceptions(&snapshot);
    tracing::debug!(count = report.count, "Exception scan finished");
    Ok(ok(report))
}

/// Investigate one delivery
pub async fn investigate(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(delivery_id): Path<String>,
) -> AppResult<Json<ApiResponse<InvestigationReport>>> {
    user.require_admin()?;
    let snapshot = state.snapshot().await?;
    let report = auditor::investigate(&snapshot, &delivery_id).map_err(investigate_error)?;
    Ok(ok(report))
}
