//! Listing Model

use serde::{Deserialize, Serialize};

/// Listing status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    #[default]
    Available,
    Sold,
}

/// Listing entity (农户上架)
///
/// 永不删除；`quantity` 归零时 status 变为 Sold。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub farmer_id: String,
    /// Local crop name (also the demand metric key)
    pub crop: String,
    pub crop_en: String,
    pub quantity: i64,
    pub price_per_unit: f64,
    pub unit: String,
    /// 4-digit secret shared with the farmer at listing time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farmer_code: Option<String>,
    pub date_listed: String,
    #[serde(default)]
    pub status: ListingStatus,
}

impl Listing {
    pub fn is_available(&self) -> bool {
        self.status == ListingStatus::Available && self.quantity > 0
    }
}

/// Public listing view (farmer code hidden)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingView {
    pub id: String,
    pub farmer_id: String,
    pub farmer_name: String,
    pub farmer_location: String,
    pub farmer_rating: f64,
    pub crop: String,
    pub crop_en: String,
    pub quantity: i64,
    pub price_per_unit: f64,
    pub unit: String,
    pub date_listed: String,
    pub status: ListingStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_status_serde() {
        assert_eq!(
            serde_json::to_string(&ListingStatus::Available).unwrap(),
            "\"available\""
        );
        assert_eq!(
            serde_json::from_str::<ListingStatus>("\"sold\"").unwrap(),
            ListingStatus::Sold
        );
    }
}
