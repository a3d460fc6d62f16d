//! Buyer Model

use serde::{Deserialize, Serialize};

/// Postal address captured at signup
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

impl Address {
    /// Single-line form used as delivery dropoff location
    pub fn one_line(&self) -> String {
        format!(
            "{}, {}, {} {}",
            self.street, self.city, self.state, self.postal_code
        )
    }
}

/// Buyer entity (买家)
///
/// 注册后身份字段不可变；`balance` 只累计退款。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buyer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Address,
    /// City, used for display and delivery dropoff
    pub location: String,
    /// Argon2 PHC string
    pub passcode_hash: String,
    #[serde(default)]
    pub balance: f64,
    pub created_at: i64,
}

/// Buyer view without credentials (for API responses)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Address,
    pub location: String,
    pub balance: f64,
    pub created_at: i64,
}

impl From<&Buyer> for BuyerProfile {
    fn from(b: &Buyer) -> Self {
        Self {
            id: b.id.clone(),
            name: b.name.clone(),
            email: b.email.clone(),
            phone: b.phone.clone(),
            address: b.address.clone(),
            location: b.location.clone(),
            balance: b.balance,
            created_at: b.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_one_line() {
        let address = Address {
            street: "Bole Road 12".to_string(),
            city: "Addis Ababa".to_string(),
            state: "Addis Ababa".to_string(),
            postal_code: "1000".to_string(),
        };
        assert_eq!(address.one_line(), "Bole Road 12, Addis Ababa, Addis Ababa 1000");
    }
}
