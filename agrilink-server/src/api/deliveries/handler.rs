//! Delivery API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use http::HeaderMap;
use serde::Deserialize;
use shared::escrow::{ActorRole, CommandResponse, EscrowCommandPayload, Secret};
use shared::models::Delivery;

use crate::api::command::submit;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::escrow::reports::visible_deliveries;
use crate::utils::{ApiResponse, AppError, AppResult, ok};

type CommandResult = AppResult<Json<ApiResponse<CommandResponse>>>;

/// List deliveries (agents see their own, admins see all)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<Delivery>>>> {
    user.require_role(ActorRole::DeliveryAgent)?;
    let snapshot = state.snapshot().await?;
    Ok(ok(visible_deliveries(&snapshot, &user.actor())))
}

/// Handoff confirmation request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    /// 管理员代确认时必填，配送员默认使用自己的 id
    pub delivery_agent_id: Option<String>,
    pub farmer_code: Secret,
    pub buyer_code: Secret,
}

/// Confirm a handoff; both codes must match to release payment
pub async fn confirm(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<ConfirmRequest>,
) -> AppResult<Json<ApiResponse<CommandResponse>>> {
    user.require_role(ActorRole::DeliveryAgent)?;
    let delivery_agent_id = match (user.role, req.delivery_agent_id) {
        (ActorRole::DeliveryAgent, _) => user.id.clone(),
        (_, Some(agent)) => agent,
        (_, None) => return Err(AppError::validation("deliveryAgentId is required")),
    };

    submit(
        &state,
        user.actor(),
        &headers,
        EscrowCommandPayload::ConfirmDelivery {
            delivery_id: id,
            delivery_agent_id,
            farmer_code: req.farmer_code,
            buyer_code: req.buyer_code,
        },
    )
    .await
}

/// Admin force-resolves a flagged delivery
pub async fn override_exception(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> CommandResult {
    user.require_admin()?;
    submit(
        &state,
        user.actor(),
        &headers,
        EscrowCommandPayload::ManualOverride { delivery_id: id },
    )
    .await
}
