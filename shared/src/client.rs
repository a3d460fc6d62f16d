//! Client-related types shared between server and client
//!
//! Auth request/response types used in API communication.

use crate::escrow::{ActorRole, Secret};
use serde::{Deserialize, Serialize};

// =============================================================================
// Auth API DTOs
// =============================================================================

/// Login request
///
/// `identifier` 按角色解释：农户/配送员为 id，买家为邮箱，管理员为用户名。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub role: ActorRole,
    pub identifier: String,
    pub passcode: Secret,
}

/// Login response data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

/// User information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub role: ActorRole,
}
