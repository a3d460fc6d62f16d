//! Listing API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use http::HeaderMap;
use serde::Deserialize;
use shared::escrow::{ActorRole, CommandResponse, EscrowCommandPayload};
use shared::models::ListingView;

use crate::api::command::submit;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::escrow::reports::listing_views;
use crate::utils::{ApiResponse, AppError, AppResult, ok};

/// Query params for listing browse
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// 包含已售完的挂牌
    #[serde(default)]
    pub include_sold: bool,
}

/// Browse listings (farmer codes never included)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<Vec<ListingView>>>> {
    let snapshot = state.snapshot().await?;
    Ok(ok(listing_views(&snapshot, !query.include_sold)))
}

/// Create listing request
///
/// `farmerId` 仅管理员代发时需要，农户默认使用自己的 id。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    pub farmer_id: Option<String>,
    pub crop: String,
    #[serde(default)]
    pub crop_en: String,
    pub quantity: i64,
    pub price_per_unit: f64,
    pub unit: String,
}

/// Publish a listing
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Json(req): Json<CreateListingRequest>,
) -> AppResult<Json<ApiResponse<CommandResponse>>> {
    user.require_role(ActorRole::Farmer)?;
    let farmer_id = match (user.role, req.farmer_id) {
        (ActorRole::Farmer, _) => user.id.clone(),
        (_, Some(id)) => id,
        (_, None) => return Err(AppError::validation("farmerId is required")),
    };

    submit(
        &state,
        user.actor(),
        &headers,
        EscrowCommandPayload::CreateListing {
            farmer_id,
            crop: req.crop,
            crop_en: req.crop_en,
            quantity: req.quantity,
            price_per_unit: req.price_per_unit,
            unit: req.unit,
        },
    )
    .await
}
