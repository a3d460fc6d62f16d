//! Authentication Handlers
//!
//! 农户/配送员按 id 登录，买家按邮箱，管理员按用户名。

use std::time::Duration;

use axum::{Json, extract::State};
use shared::client::{LoginRequest, LoginResponse, UserInfo};
use shared::escrow::{ActorRole, MarketplaceSnapshot};
use tokio::time::Instant;

use crate::auth::{CurrentUser, verify_passcode};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::{ApiResponse, AppError, AppResult, ok};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// Principal found for a login attempt
struct Principal {
    id: String,
    name: String,
    passcode_hash: Option<String>,
}

/// Resolve the login identifier for the requested role
fn find_principal(
    state: &ServerState,
    snapshot: &MarketplaceSnapshot,
    role: ActorRole,
    identifier: &str,
) -> Option<Principal> {
    match role {
        ActorRole::Farmer => snapshot.farmer(identifier).map(|f| Principal {
            id: f.id.clone(),
            name: f.name.clone(),
            passcode_hash: Some(f.passcode_hash.clone()),
        }),
        ActorRole::Buyer => snapshot.buyer_by_email(identifier).map(|b| Principal {
            id: b.id.clone(),
            name: b.name.clone(),
            passcode_hash: Some(b.passcode_hash.clone()),
        }),
        ActorRole::DeliveryAgent => snapshot.delivery_agent(identifier).map(|a| Principal {
            id: a.id.clone(),
            name: a.name.clone(),
            passcode_hash: a.passcode_hash.clone(),
        }),
        ActorRole::Admin if identifier == state.config.admin_username => Some(Principal {
            id: state.config.admin_username.clone(),
            name: state.config.admin_username.clone(),
            passcode_hash: Some(state.admin_passcode_hash.to_string()),
        }),
        ActorRole::Admin | ActorRole::System => None,
    }
}

/// Login handler
///
/// Authenticates a principal and returns a JWT token.
/// All failures share one message and take the same minimum time.
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let deadline = Instant::now() + Duration::from_millis(AUTH_FIXED_DELAY_MS);
    let identifier = req.identifier.trim().to_string();

    let snapshot = state.snapshot().await?;
    let principal = find_principal(&state, &snapshot, req.role, &identifier);

    let verified = match principal.as_ref().and_then(|p| p.passcode_hash.clone()) {
        Some(hash) => {
            let passcode = req.passcode.clone();
            tokio::task::spawn_blocking(move || verify_passcode(passcode.expose(), &hash))
                .await
                .map_err(|e| AppError::internal(format!("passcode check failed: {}", e)))?
        }
        None => false,
    };

    // Fixed delay to prevent timing attacks
    tokio::time::sleep_until(deadline).await;

    let principal = match principal {
        Some(p) if verified => p,
        found => {
            security_log!(
                "WARN",
                "login_failed",
                role = req.role.as_str(),
                identifier = identifier.as_str(),
                known = found.is_some()
            );
            return Err(AppError::invalid_credentials());
        }
    };

    let token = state
        .jwt_service
        .generate_token(&principal.id, &principal.name, req.role)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    security_log!(
        "INFO",
        "login_success",
        user_id = principal.id.as_str(),
        role = req.role.as_str()
    );
    tracing::info!(user_id = %principal.id, role = %req.role, "User logged in successfully");

    Ok(ok(LoginResponse {
        token,
        user: UserInfo {
            id: principal.id,
            name: principal.name,
            role: req.role,
        },
    }))
}

/// Get current user info
pub async fn me(user: CurrentUser) -> AppResult<Json<ApiResponse<UserInfo>>> {
    Ok(ok(UserInfo {
        id: user.id,
        name: user.name,
        role: user.role,
    }))
}
