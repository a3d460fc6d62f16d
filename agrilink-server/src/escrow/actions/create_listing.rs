//! CreateListing command handler
//!
//! Farmer publishes produce. The listing gets a sequential id and a fresh
//! farmer code that the farmer hands to the agent at pickup.

use async_trait::async_trait;

use crate::escrow::codes::{random_code, sequential_id};
use crate::escrow::money::validate_listing_input;
use crate::escrow::traits::{CommandContext, CommandHandler, CommandMetadata, EscrowError};
use shared::escrow::{ActorRole, EscrowEvent, EscrowEventType, EventPayload};
use shared::models::{Listing, ListingStatus};
use shared::util::format_date;

/// CreateListing action
#[derive(Debug, Clone)]
pub struct CreateListingAction {
    pub farmer_id: String,
    pub crop: String,
    pub crop_en: String,
    pub quantity: i64,
    pub price_per_unit: f64,
    pub unit: String,
}

#[async_trait]
impl CommandHandler for CreateListingAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<EscrowEvent>, EscrowError> {
        let snapshot = ctx.snapshot();

        // 1. Farmers list for themselves only
        match metadata.actor.role {
            ActorRole::Admin => {}
            ActorRole::Farmer if metadata.actor.id == self.farmer_id => {}
            _ => {
                return Err(EscrowError::PermissionDenied(
                    "listings can only be created by the farmer".to_string(),
                ));
            }
        }

        // 2. Validate input
        validate_listing_input(self.quantity, self.price_per_unit)?;
        let crop = self.crop.trim();
        let unit = self.unit.trim();
        if crop.is_empty() || unit.is_empty() {
            return Err(EscrowError::Validation(
                "crop and unit are required".to_string(),
            ));
        }
        let crop_en = match self.crop_en.trim() {
            "" => crop,
            en => en,
        };

        // 3. Farmer must exist
        if snapshot.farmer(&self.farmer_id).is_none() {
            return Err(EscrowError::FarmerNotFound(self.farmer_id.clone()));
        }

        let listing = Listing {
            id: sequential_id("L", snapshot.listings.len(), |id| snapshot.listing(id).is_some()),
            farmer_id: self.farmer_id.clone(),
            crop: crop.to_string(),
            crop_en: crop_en.to_string(),
            quantity: self.quantity,
            price_per_unit: self.price_per_unit,
            unit: unit.to_string(),
            farmer_code: Some(random_code(ctx.rng())),
            date_listed: format_date(metadata.timestamp),
            status: ListingStatus::Available,
        };

        // 4. Create event
        let seq = ctx.next_sequence();
        let event = EscrowEvent::new(
            seq,
            metadata.actor.id.clone(),
            metadata.actor.role,
            metadata.command_id.clone(),
            metadata.timestamp,
            EscrowEventType::ListingCreated,
            EventPayload::ListingCreated {
                listing: Box::new(listing),
            },
        );

        Ok(vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escrow::test_support::{create_test_metadata, seeded_snapshot};
    use crate::escrow::traits::EscrowPolicy;
    use shared::escrow::{Actor, MarketplaceSnapshot};

    fn action(quantity: i64, price: f64) -> CreateListingAction {
        CreateListingAction {
            farmer_id: "F002".to_string(),
            crop: "በቆሎ".to_string(),
            crop_en: "Maize".to_string(),
            quantity,
            price_per_unit: price,
            unit: "kg".to_string(),
        }
    }

    async fn run(
        snapshot: &MarketplaceSnapshot,
        action: &CreateListingAction,
        actor: Actor,
    ) -> Result<Vec<EscrowEvent>, EscrowError> {
        let policy = EscrowPolicy::default();
        let mut ctx = CommandContext::new(snapshot, &policy, 0);
        let metadata = create_test_metadata(actor);
        action.execute(&mut ctx, &metadata).await
    }

    #[tokio::test]
    async fn test_create_listing_assigns_next_id() {
        let snapshot = seeded_snapshot();
        let events = run(&snapshot, &action(50, 18.5), Actor::new("F002", ActorRole::Farmer))
            .await
            .unwrap();

        let EventPayload::ListingCreated { listing } = &events[0].payload else {
            panic!("Expected ListingCreated payload");
        };
        assert_eq!(listing.id, "L007");
        assert_eq!(listing.status, ListingStatus::Available);
        assert_eq!(listing.date_listed, "2024-03-15");
        assert_eq!(listing.farmer_code.as_deref().map(str::len), Some(4));
    }

    #[tokio::test]
    async fn test_create_listing_validation() {
        let snapshot = seeded_snapshot();
        let farmer = || Actor::new("F002", ActorRole::Farmer);

        assert!(matches!(
            run(&snapshot, &action(0, 10.0), farmer()).await,
            Err(EscrowError::InvalidQuantity(0))
        ));
        assert!(matches!(
            run(&snapshot, &action(5, 0.0), farmer()).await,
            Err(EscrowError::InvalidPrice)
        ));
        assert!(matches!(
            run(&snapshot, &action(5, f64::NAN), farmer()).await,
            Err(EscrowError::InvalidPrice)
        ));
    }

    #[tokio::test]
    async fn test_create_listing_rejects_out_of_range_values() {
        let snapshot = seeded_snapshot();
        let farmer = || Actor::new("F002", ActorRole::Farmer);

        assert!(matches!(
            run(&snapshot, &action(1, 1e30), farmer()).await,
            Err(EscrowError::InvalidPrice)
        ));
        assert!(matches!(
            run(&snapshot, &action(10_000_000_000, 1e20), farmer()).await,
            Err(EscrowError::InvalidQuantity(_))
        ));
        assert!(matches!(
            run(&snapshot, &action(1_000, 1e20), farmer()).await,
            Err(EscrowError::InvalidPrice)
        ));
    }

    #[tokio::test]
    async fn test_create_listing_for_other_farmer_denied() {
        let snapshot = seeded_snapshot();
        let result = run(&snapshot, &action(5, 10.0), Actor::new("F001", ActorRole::Farmer)).await;
        assert!(matches!(result, Err(EscrowError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn test_create_listing_unknown_farmer() {
        let snapshot = seeded_snapshot();
        let mut act = action(5, 10.0);
        act.farmer_id = "F404".to_string();
        let result = run(&snapshot, &act, Actor::admin("admin")).await;
        assert!(matches!(result, Err(EscrowError::FarmerNotFound(_))));
    }
}
