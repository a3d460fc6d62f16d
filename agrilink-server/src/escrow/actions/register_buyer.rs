//! RegisterBuyer command handler
//!
//! 买家注册：校验必填字段、邮箱格式与唯一性、口令格式，
//! 生成 `B` + 4 位随机数字的 id，口令以 argon2 哈希保存。

use async_trait::async_trait;
use validator::ValidateEmail;

use crate::auth::passcode::hash_passcode;
use crate::escrow::codes::{is_valid_passcode, unique_code};
use crate::escrow::traits::{CommandContext, CommandHandler, CommandMetadata, EscrowError};
use shared::escrow::{EscrowEvent, EscrowEventType, EventPayload, Secret};
use shared::models::{Address, Buyer};

/// RegisterBuyer action
#[derive(Debug, Clone)]
pub struct RegisterBuyerAction {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Address,
    pub passcode: Secret,
}

fn required<'s>(field: &str, value: &'s str) -> Result<&'s str, EscrowError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(EscrowError::Validation(format!("{} is required", field)));
    }
    Ok(value)
}

#[async_trait]
impl CommandHandler for RegisterBuyerAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<EscrowEvent>, EscrowError> {
        let snapshot = ctx.snapshot();

        // 1. Required fields
        let name = required("name", &self.name)?;
        let phone = required("phone", &self.phone)?;
        let address = Address {
            street: required("street", &self.address.street)?.to_string(),
            city: required("city", &self.address.city)?.to_string(),
            state: required("state", &self.address.state)?.to_string(),
            postal_code: required("postalCode", &self.address.postal_code)?.to_string(),
        };

        // 2. Email format and uniqueness
        let email = self.email.trim().to_string();
        if !email.validate_email() {
            return Err(EscrowError::Validation("email is invalid".to_string()));
        }
        if snapshot.buyer_by_email(&email).is_some() {
            return Err(EscrowError::EmailTaken);
        }

        // 3. Passcode
        if !is_valid_passcode(self.passcode.expose()) {
            return Err(EscrowError::Validation(
                "passcode must be 4-6 digits".to_string(),
            ));
        }
        let passcode_hash = hash_passcode(self.passcode.expose())
            .map_err(|e| EscrowError::Internal(format!("passcode hashing failed: {}", e)))?;

        // 4. Id
        let digits = unique_code(ctx.rng(), "buyer id", |c| {
            snapshot.buyer(&format!("B{}", c)).is_some()
        })?;

        let buyer = Buyer {
            id: format!("B{}", digits),
            name: name.to_string(),
            email,
            phone: phone.to_string(),
            location: address.one_line(),
            address,
            passcode_hash,
            balance: 0.0,
            created_at: metadata.timestamp,
        };

        // 5. Create event
        let seq = ctx.next_sequence();
        let event = EscrowEvent::new(
            seq,
            buyer.id.clone(),
            metadata.actor.role,
            metadata.command_id.clone(),
            metadata.timestamp,
            EscrowEventType::BuyerRegistered,
            EventPayload::BuyerRegistered {
                buyer: Box::new(buyer),
            },
        );

        Ok(vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::passcode::verify_passcode;
    use crate::escrow::test_support::{create_test_metadata, seeded_snapshot};
    use crate::escrow::traits::EscrowPolicy;
    use shared::escrow::{Actor, ActorRole, MarketplaceSnapshot};

    fn action(email: &str, passcode: &str) -> RegisterBuyerAction {
        RegisterBuyerAction {
            name: "Selam Bekele".to_string(),
            email: email.to_string(),
            phone: "+251933333333".to_string(),
            address: Address {
                street: "Piassa 4".to_string(),
                city: "Gondar".to_string(),
                state: "Amhara".to_string(),
                postal_code: "6200".to_string(),
            },
            passcode: Secret::new(passcode),
        }
    }

    async fn run(
        snapshot: &MarketplaceSnapshot,
        action: &RegisterBuyerAction,
    ) -> Result<Vec<EscrowEvent>, EscrowError> {
        let policy = EscrowPolicy::default();
        let mut ctx = CommandContext::new(snapshot, &policy, 0);
        let metadata = create_test_metadata(Actor::new("anonymous", ActorRole::Buyer));
        action.execute(&mut ctx, &metadata).await
    }

    #[tokio::test]
    async fn test_register_buyer_hashes_passcode() {
        let snapshot = seeded_snapshot();
        let events = run(&snapshot, &action("selam@example.com", "246810")).await.unwrap();

        let EventPayload::BuyerRegistered { buyer } = &events[0].payload else {
            panic!("Expected BuyerRegistered payload");
        };
        assert!(buyer.id.starts_with('B'));
        assert_eq!(buyer.id.len(), 5);
        assert_eq!(events[0].actor_id, buyer.id);
        assert_eq!(buyer.location, "Piassa 4, Gondar, Amhara 6200");
        assert_ne!(buyer.passcode_hash, "246810");
        assert!(verify_passcode("246810", &buyer.passcode_hash));
    }

    #[tokio::test]
    async fn test_register_buyer_email_taken_case_insensitive() {
        let snapshot = seeded_snapshot();
        let result = run(&snapshot, &action("BUYER@example.com", "1234")).await;
        assert!(matches!(result, Err(EscrowError::EmailTaken)));
    }

    #[tokio::test]
    async fn test_register_buyer_invalid_email() {
        let snapshot = seeded_snapshot();
        let result = run(&snapshot, &action("not-an-email", "1234")).await;
        assert!(matches!(result, Err(EscrowError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_buyer_invalid_passcode() {
        let snapshot = seeded_snapshot();
        let result = run(&snapshot, &action("x@example.com", "12")).await;
        assert!(matches!(result, Err(EscrowError::Validation(_))));
        let result = run(&snapshot, &action("x@example.com", "1234567")).await;
        assert!(matches!(result, Err(EscrowError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_buyer_missing_field() {
        let snapshot = seeded_snapshot();
        let mut act = action("x@example.com", "1234");
        act.address.city = "  ".to_string();
        let result = run(&snapshot, &act).await;
        match result {
            Err(EscrowError::Validation(msg)) => assert!(msg.contains("city")),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }
}
