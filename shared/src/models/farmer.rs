//! Farmer Model

use serde::{Deserialize, Serialize};

/// Farmer entity (农户)
///
/// `balance` / `total_earned` 只由放款与退款冲正修改，冲正时下限为 0。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Farmer {
    pub id: String,
    pub name: String,
    pub location: String,
    pub phone: String,
    /// Argon2 PHC string
    pub passcode_hash: String,
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub total_earned: f64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub num_ratings: u32,
    #[serde(default)]
    pub successful_deliveries: u32,
}

/// Farmer view without credentials (for API responses)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerProfile {
    pub id: String,
    pub name: String,
    pub location: String,
    pub phone: String,
    pub balance: f64,
    pub total_earned: f64,
    pub rating: f64,
    pub num_ratings: u32,
    pub successful_deliveries: u32,
}

impl From<&Farmer> for FarmerProfile {
    fn from(f: &Farmer) -> Self {
        Self {
            id: f.id.clone(),
            name: f.name.clone(),
            location: f.location.clone(),
            phone: f.phone.clone(),
            balance: f.balance,
            total_earned: f.total_earned,
            rating: f.rating,
            num_ratings: f.num_ratings,
            successful_deliveries: f.successful_deliveries,
        }
    }
}
