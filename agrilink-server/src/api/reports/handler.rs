//! Reports Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::escrow::ActorRole;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::escrow::reports::{
    self, AdminSummary, AuditPage, AuditQuery, FarmerStatement, MarketNews,
};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

/// Platform totals
pub async fn summary(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<AdminSummary>>> {
    user.require_admin()?;
    let snapshot = state.snapshot().await?;
    Ok(ok(reports::admin_summary(&snapshot)))
}

/// Farmer earnings statement (self or admin)
pub async fn statement(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<FarmerStatement>>> {
    user.require_self_or_admin(ActorRole::Farmer, &id)?;
    let snapshot = state.snapshot().await?;
    let statement = reports::farmer_statement(&snapshot, &id).ok_or_else(|| {
        AppError::with_message(ErrorCode::FarmerNotFound, format!("Farmer not found: {}", id))
    })?;
    Ok(ok(statement))
}

/// Top crops and current prices
pub async fn news(
    State(state): State<ServerState>,
    _user: CurrentUser,
) -> AppResult<Json<ApiResponse<MarketNews>>> {
    let snapshot = state.snapshot().await?;
    Ok(ok(reports::market_news(&snapshot)))
}

/// Audit log page, newest first
pub async fn audit_log(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<AuditQuery>,
) -> AppResult<Json<ApiResponse<AuditPage>>> {
    user.require_admin()?;
    let snapshot = state.snapshot().await?;
    Ok(ok(reports::audit_page(&snapshot, query)))
}
