//! RateFarmer / SkipRating command handlers
//!
//! A buyer may rate the farmer once per delivered order, or dismiss the
//! prompt. Either way the order is marked rated.

use async_trait::async_trait;

use crate::escrow::traits::{CommandContext, CommandHandler, CommandMetadata, EscrowError};
use shared::escrow::{Actor, ActorRole, EscrowEvent, EscrowEventType, EventPayload};
use shared::models::Order;

/// RateFarmer action
#[derive(Debug, Clone)]
pub struct RateFarmerAction {
    pub order_id: String,
    pub stars: u8,
}

/// SkipRating action
#[derive(Debug, Clone)]
pub struct SkipRatingAction {
    pub order_id: String,
}

/// Shared checks: order exists, belongs to the caller, delivered, not yet rated
fn rateable_order<'a>(
    ctx: &CommandContext<'a>,
    actor: &Actor,
    order_id: &str,
) -> Result<&'a Order, EscrowError> {
    let order = ctx
        .snapshot()
        .order(order_id)
        .ok_or_else(|| EscrowError::OrderNotFound(order_id.to_string()))?;

    match actor.role {
        ActorRole::Admin => {}
        ActorRole::Buyer if actor.id == order.buyer_id => {}
        _ => {
            return Err(EscrowError::PermissionDenied(
                "only the order's buyer can rate".to_string(),
            ));
        }
    }

    if !order.is_delivered() {
        return Err(EscrowError::OrderNotDelivered(order.id.clone()));
    }
    if order.rated {
        return Err(EscrowError::AlreadyRated(order.id.clone()));
    }
    Ok(order)
}

#[async_trait]
impl CommandHandler for RateFarmerAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<EscrowEvent>, EscrowError> {
        // 1. Validate stars
        if !(1..=5).contains(&self.stars) {
            return Err(EscrowError::InvalidRating(self.stars));
        }

        // 2. Order checks
        let order = rateable_order(ctx, &metadata.actor, &self.order_id)?;
        if ctx.snapshot().farmer(&order.farmer_id).is_none() {
            return Err(EscrowError::FarmerNotFound(order.farmer_id.clone()));
        }

        // 3. Create event
        let seq = ctx.next_sequence();
        let event = EscrowEvent::new(
            seq,
            metadata.actor.id.clone(),
            metadata.actor.role,
            metadata.command_id.clone(),
            metadata.timestamp,
            EscrowEventType::FarmerRated,
            EventPayload::FarmerRated {
                order_id: order.id.clone(),
                farmer_id: order.farmer_id.clone(),
                stars: self.stars,
            },
        );

        Ok(vec![event])
    }
}

#[async_trait]
impl CommandHandler for SkipRatingAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<EscrowEvent>, EscrowError> {
        let order = rateable_order(ctx, &metadata.actor, &self.order_id)?;

        let seq = ctx.next_sequence();
        let event = EscrowEvent::new(
            seq,
            metadata.actor.id.clone(),
            metadata.actor.role,
            metadata.command_id.clone(),
            metadata.timestamp,
            EscrowEventType::RatingSkipped,
            EventPayload::RatingSkipped {
                order_id: order.id.clone(),
            },
        );

        Ok(vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escrow::test_support::{
        buyer_actor, create_test_metadata, delivered_snapshot, snapshot_with_triple,
    };
    use crate::escrow::traits::EscrowPolicy;
    use shared::escrow::MarketplaceSnapshot;

    async fn rate(
        snapshot: &MarketplaceSnapshot,
        stars: u8,
        actor: Actor,
    ) -> Result<Vec<EscrowEvent>, EscrowError> {
        let policy = EscrowPolicy::default();
        let mut ctx = CommandContext::new(snapshot, &policy, 0);
        let metadata = create_test_metadata(actor);
        RateFarmerAction {
            order_id: "O001".to_string(),
            stars,
        }
        .execute(&mut ctx, &metadata)
        .await
    }

    #[tokio::test]
    async fn test_rate_farmer_event() {
        let snapshot = delivered_snapshot();
        let events = rate(&snapshot, 4, buyer_actor()).await.unwrap();
        assert_eq!(events.len(), 1);
        if let EventPayload::FarmerRated {
            farmer_id, stars, ..
        } = &events[0].payload
        {
            assert_eq!(farmer_id, "F001");
            assert_eq!(*stars, 4);
        } else {
            panic!("Expected FarmerRated payload");
        }
    }

    #[tokio::test]
    async fn test_rate_farmer_star_bounds() {
        let snapshot = delivered_snapshot();
        assert!(matches!(
            rate(&snapshot, 0, buyer_actor()).await,
            Err(EscrowError::InvalidRating(0))
        ));
        assert!(matches!(
            rate(&snapshot, 6, buyer_actor()).await,
            Err(EscrowError::InvalidRating(6))
        ));
    }

    #[tokio::test]
    async fn test_rate_farmer_requires_delivery() {
        let snapshot = snapshot_with_triple();
        let result = rate(&snapshot, 5, buyer_actor()).await;
        assert!(matches!(result, Err(EscrowError::OrderNotDelivered(_))));
    }

    #[tokio::test]
    async fn test_rate_farmer_once() {
        let mut snapshot = delivered_snapshot();
        snapshot.order_mut("O001").unwrap().rated = true;
        let result = rate(&snapshot, 5, buyer_actor()).await;
        assert!(matches!(result, Err(EscrowError::AlreadyRated(_))));
    }

    #[tokio::test]
    async fn test_rate_farmer_other_buyer_denied() {
        let snapshot = delivered_snapshot();
        let result = rate(&snapshot, 5, Actor::new("B9999", ActorRole::Buyer)).await;
        assert!(matches!(result, Err(EscrowError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn test_skip_rating_event() {
        let snapshot = delivered_snapshot();
        let policy = EscrowPolicy::default();
        let mut ctx = CommandContext::new(&snapshot, &policy, 0);
        let metadata = create_test_metadata(buyer_actor());
        let events = SkipRatingAction {
            order_id: "O001".to_string(),
        }
        .execute(&mut ctx, &metadata)
        .await
        .unwrap();
        assert_eq!(events[0].event_type, EscrowEventType::RatingSkipped);
    }
}
