//! Buyer API Handlers

use axum::{Json, extract::State};
use http::HeaderMap;
use serde::Deserialize;
use shared::escrow::{Actor, ActorRole, CommandResponse, EscrowCommandPayload, Secret};
use shared::models::Address;

use crate::api::command::submit;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult};

/// 注册前的匿名主体
const SIGNUP_ACTOR_ID: &str = "signup";

/// Signup request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBuyerRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Address,
    pub passcode: Secret,
}

/// Register a buyer account
pub async fn register(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(req): Json<RegisterBuyerRequest>,
) -> AppResult<Json<ApiResponse<CommandResponse>>> {
    submit(
        &state,
        Actor::new(SIGNUP_ACTOR_ID, ActorRole::Buyer),
        &headers,
        EscrowCommandPayload::RegisterBuyer {
            name: req.name,
            email: req.email,
            phone: req.phone,
            address: req.address,
            passcode: req.passcode,
        },
    )
    .await
}
