//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use http::HeaderMap;
use serde::Deserialize;
use shared::escrow::{ActorRole, CommandResponse, EscrowCommandPayload, Secret};
use shared::models::Order;

use crate::api::command::submit;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::escrow::reports::{visible_order, visible_orders};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

type CommandResult = AppResult<Json<ApiResponse<CommandResponse>>>;

/// List orders visible to the caller
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    let snapshot = state.snapshot().await?;
    Ok(ok(visible_orders(&snapshot, &user.actor())))
}

/// Get order by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let snapshot = state.snapshot().await?;
    // 他人订单按不存在处理
    let order = snapshot
        .order(&id)
        .and_then(|o| visible_order(o, &user.actor()))
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::OrderNotFound, format!("Order not found: {}", id))
        })?;
    Ok(ok(order))
}

/// Place order request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    /// 管理员代下单时必填
    pub buyer_id: Option<String>,
    pub listing_id: String,
    pub quantity: i64,
    pub passcode: Secret,
}

/// Place an order (funds go into escrow)
pub async fn place(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Json(req): Json<PlaceOrderRequest>,
) -> CommandResult {
    user.require_role(ActorRole::Buyer)?;
    let buyer_id = match (user.role, req.buyer_id) {
        (ActorRole::Buyer, _) => user.id.clone(),
        (_, Some(id)) => id,
        (_, None) => return Err(AppError::validation("buyerId is required")),
    };

    submit(
        &state,
        user.actor(),
        &headers,
        EscrowCommandPayload::PlaceOrder {
            buyer_id,
            listing_id: req.listing_id,
            quantity: req.quantity,
            passcode: req.passcode,
        },
    )
    .await
}

/// Refund request body
#[derive(Debug, Deserialize)]
pub struct RefundRequest {
    pub passcode: Secret,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Buyer requests a refund
pub async fn request_refund(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<RefundRequest>,
) -> CommandResult {
    user.require_role(ActorRole::Buyer)?;
    submit(
        &state,
        user.actor(),
        &headers,
        EscrowCommandPayload::RequestRefund {
            order_id: id,
            passcode: req.passcode,
            reason: req.reason,
        },
    )
    .await
}

/// Admin approves a pending refund
pub async fn approve_refund(
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
        EscrowCommandPayload::ApproveRefund { order_id: id },
    )
    .await
}

/// Reject body
#[derive(Debug, Default, Deserialize)]
pub struct RejectRequest {
    #[serde(default)]
    pub note: Option<String>,
}

/// Admin rejects a pending refund
pub async fn reject_refund(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Option<Json<RejectRequest>>,
) -> CommandResult {
    user.require_admin()?;
    let Json(req) = body.unwrap_or_default();
    submit(
        &state,
        user.actor(),
        &headers,
        EscrowCommandPayload::RejectRefund {
            order_id: id,
            note: req.note,
        },
    )
    .await
}

/// Rating body
#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub stars: u8,
}

/// Buyer rates the farmer of a delivered order
pub async fn rate(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<RateRequest>,
) -> CommandResult {
    user.require_role(ActorRole::Buyer)?;
    submit(
        &state,
        user.actor(),
        &headers,
        EscrowCommandPayload::RateFarmer {
            order_id: id,
            stars: req.stars,
        },
    )
    .await
}

/// Buyer dismisses the rating prompt
pub async fn skip_rating(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> CommandResult {
    user.require_role(ActorRole::Buyer)?;
    submit(
        &state,
        user.actor(),
        &headers,
        EscrowCommandPayload::SkipRating { order_id: id },
    )
    .await
}
