//! Delivery Agent Model

use serde::{Deserialize, Serialize};

/// Delivery agent reference data (配送员)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAgent {
    pub id: String,
    pub name: String,
    pub car_id: String,
    /// 无口令的配送员不能登录，但仍可被分配订单
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passcode_hash: Option<String>,
}

/// Delivery agent view without credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAgentProfile {
    pub id: String,
    pub name: String,
    pub car_id: String,
}

impl From<&DeliveryAgent> for DeliveryAgentProfile {
    fn from(a: &DeliveryAgent) -> Self {
        Self {
            id: a.id.clone(),
            name: a.name.clone(),
            car_id: a.car_id.clone(),
        }
    }
}
