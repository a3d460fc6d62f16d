//! PlaceOrder command handler
//!
//! Buyer purchases from a listing. Creates the Order, Delivery and Payment
//! triple in one event; stock, demand metric and audit follow from the applier.

use async_trait::async_trait;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::auth::passcode::verify_passcode;
use crate::escrow::codes::{is_valid_passcode, random_code, sequential_id, unique_code};
use crate::escrow::money::price_order;
use crate::escrow::traits::{CommandContext, CommandHandler, CommandMetadata, EscrowError};
use shared::escrow::{ActorRole, EscrowEvent, EscrowEventType, EventPayload, Secret};
use shared::models::{
    Delivery, DeliveryStatus, Order, OrderStatus, Payment, PaymentStatus, RefundStatus,
};
use shared::util::format_date;

/// 配送员列表为空时的默认配送员
pub const DEFAULT_AGENT_ID: &str = "DA001";

/// PlaceOrder action
#[derive(Debug, Clone)]
pub struct PlaceOrderAction {
    pub buyer_id: String,
    pub listing_id: String,
    pub quantity: i64,
    pub passcode: Secret,
}

#[async_trait]
impl CommandHandler for PlaceOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<EscrowEvent>, EscrowError> {
        let snapshot = ctx.snapshot();

        // 1. Validate quantity
        if self.quantity <= 0 {
            return Err(EscrowError::InvalidQuantity(self.quantity));
        }

        // 2. Passcode format
        if !is_valid_passcode(self.passcode.expose()) {
            return Err(EscrowError::InvalidPasscode);
        }

        // 3. Buyer must exist, and be the caller unless admin
        let buyer = snapshot
            .buyer(&self.buyer_id)
            .ok_or_else(|| EscrowError::BuyerNotFound(self.buyer_id.clone()))?;
        match metadata.actor.role {
            ActorRole::Admin => {}
            ActorRole::Buyer if metadata.actor.id == buyer.id => {}
            _ => {
                return Err(EscrowError::PermissionDenied(
                    "orders can only be placed by the buyer".to_string(),
                ));
            }
        }

        // 4. Re-check passcode
        if !verify_passcode(self.passcode.expose(), &buyer.passcode_hash) {
            crate::security_log!(
                "WARN",
                "order_passcode_failed",
                buyer_id = buyer.id.as_str(),
                listing_id = self.listing_id.as_str()
            );
            return Err(EscrowError::InvalidPasscode);
        }

        // 5. Listing must be available with enough stock
        let listing = snapshot
            .listing(&self.listing_id)
            .filter(|l| l.is_available())
            .ok_or_else(|| EscrowError::ListingUnavailable(self.listing_id.clone()))?;
        if self.quantity > listing.quantity {
            return Err(EscrowError::OutOfStock {
                requested: self.quantity,
                available: listing.quantity,
            });
        }

        // 6. Pricing
        let pricing = price_order(self.quantity, listing.price_per_unit)?;

        // 7. Codes: farmer code from listing, buyer code unique across orders
        let farmer_code = match &listing.farmer_code {
            Some(code) => code.clone(),
            None => random_code(ctx.rng()),
        };
        let buyer_code = unique_code(ctx.rng(), "buyer code", |c| snapshot.buyer_code_in_use(c))?;

        // 8. Delivery agent and expected window
        let agent_id = snapshot
            .delivery_agents
            .choose(ctx.rng())
            .map(|a| a.id.clone())
            .unwrap_or_else(|| DEFAULT_AGENT_ID.to_string());
        let min_days: u32 = ctx.rng().gen_range(1..=7);
        let max_days = min_days + ctx.rng().gen_range(1..=3);

        // 9. Ids
        let order_id = sequential_id("O", snapshot.orders.len(), |id| snapshot.order(id).is_some());
        let delivery_id = sequential_id("D", snapshot.deliveries.len(), |id| {
            snapshot.delivery(id).is_some()
        });
        let payment_id = sequential_id("P", snapshot.payments.len(), |id| {
            snapshot.payment(id).is_some()
        });

        let today = format_date(metadata.timestamp);
        let pickup_location = snapshot
            .farmer(&listing.farmer_id)
            .map(|f| f.location.clone())
            .unwrap_or_default();

        let order = Order {
            id: order_id.clone(),
            buyer_id: buyer.id.clone(),
            farmer_id: listing.farmer_id.clone(),
            listing_id: listing.id.clone(),
            crop: listing.crop.clone(),
            crop_en: listing.crop_en.clone(),
            quantity: self.quantity,
            unit: listing.unit.clone(),
            price_per_unit: listing.price_per_unit,
            base_price: pricing.base_price,
            delivery_fee: pricing.delivery_fee,
            platform_fee: pricing.platform_fee,
            total_price: pricing.total_price,
            date_ordered: today.clone(),
            expected_delivery_time: format!("{}-{} days", min_days, max_days),
            farmer_code,
            buyer_code,
            delivery_agent_id: Some(agent_id.clone()),
            codes_verified: false,
            payment_released: false,
            status: OrderStatus::WaitingForDelivery,
            delivery_timestamp: None,
            rated: false,
            refund_requested: false,
            refund_status: RefundStatus::None,
            refund_processed: false,
            refund_reason: None,
            refund_timestamp: None,
            refund_rejection_note: None,
        };

        let delivery = Delivery {
            id: delivery_id.clone(),
            order_id: order_id.clone(),
            farmer_id: listing.farmer_id.clone(),
            buyer_id: buyer.id.clone(),
            crop: listing.crop.clone(),
            crop_en: listing.crop_en.clone(),
            quantity: self.quantity,
            unit: listing.unit.clone(),
            pickup_location,
            dropoff_location: buyer.location.clone(),
            delivery_agent_id: Some(agent_id),
            status: DeliveryStatus::Pending,
            codes_verified: false,
            payment_released: false,
            date_created: today.clone(),
            date_delivered: None,
            time_delivered: None,
        };

        let payment = Payment {
            id: payment_id,
            order_id,
            delivery_id,
            buyer_id: buyer.id.clone(),
            farmer_id: listing.farmer_id.clone(),
            amount: pricing.total_price,
            status: PaymentStatus::PendingRelease,
            date_created: today,
            date_released: None,
            date_refunded: None,
        };

        // 10. Create event
        let seq = ctx.next_sequence();
        let event = EscrowEvent::new(
            seq,
            metadata.actor.id.clone(),
            metadata.actor.role,
            metadata.command_id.clone(),
            metadata.timestamp,
            EscrowEventType::OrderPlaced,
            EventPayload::OrderPlaced {
                order: Box::new(order),
                delivery: Box::new(delivery),
                payment: Box::new(payment),
            },
        );

        Ok(vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escrow::test_support::{
        TEST_BUYER_ID, TEST_BUYER_PASSCODE, buyer_actor, create_test_metadata, seeded_snapshot,
    };
    use crate::escrow::traits::EscrowPolicy;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use shared::escrow::{Actor, MarketplaceSnapshot};

    fn action(listing_id: &str, quantity: i64, passcode: &str) -> PlaceOrderAction {
        PlaceOrderAction {
            buyer_id: TEST_BUYER_ID.to_string(),
            listing_id: listing_id.to_string(),
            quantity,
            passcode: Secret::new(passcode),
        }
    }

    async fn run(
        snapshot: &MarketplaceSnapshot,
        action: &PlaceOrderAction,
        actor: Actor,
    ) -> Result<Vec<EscrowEvent>, EscrowError> {
        let policy = EscrowPolicy::default();
        let mut ctx =
            CommandContext::new(snapshot, &policy, 0).with_rng(StdRng::seed_from_u64(7));
        let metadata = create_test_metadata(actor);
        action.execute(&mut ctx, &metadata).await
    }

    #[tokio::test]
    async fn test_place_order_creates_triple() {
        let snapshot = seeded_snapshot();
        let events = run(&snapshot, &action("L002", 40, TEST_BUYER_PASSCODE), buyer_actor())
            .await
            .unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].sequence, 1);
        assert_eq!(events[0].event_type, EscrowEventType::OrderPlaced);

        if let EventPayload::OrderPlaced {
            order,
            delivery,
            payment,
        } = &events[0].payload
        {
            assert_eq!(order.id, "O001");
            assert_eq!(delivery.id, "D001");
            assert_eq!(payment.id, "P001");
            assert_eq!(order.base_price, 1200.0);
            assert_eq!(order.delivery_fee, 24.0);
            assert_eq!(order.platform_fee, 24.0);
            assert_eq!(order.total_price, 1248.0);
            assert_eq!(payment.amount, order.total_price);
            assert_eq!(payment.status, PaymentStatus::PendingRelease);

            let listing = snapshot.listing("L002").unwrap();
            assert_eq!(Some(&order.farmer_code), listing.farmer_code.as_ref());
            assert_eq!(order.buyer_code.len(), 4);
            assert_eq!(order.delivery_agent_id, delivery.delivery_agent_id);
            assert!(order.delivery_agent_id.as_deref().unwrap().starts_with("DA00"));
            assert!(order.expected_delivery_time.ends_with(" days"));

            assert_eq!(delivery.pickup_location, "አዲስ አበባ");
            assert_eq!(delivery.dropoff_location, snapshot.buyer(TEST_BUYER_ID).unwrap().location);
            assert_eq!(order.date_ordered, "2024-03-15");
        } else {
            panic!("Expected OrderPlaced payload");
        }
    }

    #[tokio::test]
    async fn test_place_order_expected_window_in_range() {
        let snapshot = seeded_snapshot();
        let events = run(&snapshot, &action("L003", 1, TEST_BUYER_PASSCODE), buyer_actor())
            .await
            .unwrap();
        let EventPayload::OrderPlaced { order, .. } = &events[0].payload else {
            panic!("Expected OrderPlaced payload");
        };
        let (min, max) = order
            .expected_delivery_time
            .trim_end_matches(" days")
            .split_once('-')
            .unwrap();
        let min: u32 = min.parse().unwrap();
        let max: u32 = max.parse().unwrap();
        assert!((1..=7).contains(&min));
        assert!((min + 1..=min + 3).contains(&max));
    }

    #[tokio::test]
    async fn test_place_order_rejects_non_positive_quantity() {
        let snapshot = seeded_snapshot();
        let result = run(&snapshot, &action("L002", 0, TEST_BUYER_PASSCODE), buyer_actor()).await;
        assert!(matches!(result, Err(EscrowError::InvalidQuantity(0))));

        let result = run(&snapshot, &action("L002", -3, TEST_BUYER_PASSCODE), buyer_actor()).await;
        assert!(matches!(result, Err(EscrowError::InvalidQuantity(-3))));
    }

    #[tokio::test]
    async fn test_place_order_rejects_malformed_passcode() {
        let snapshot = seeded_snapshot();
        let result = run(&snapshot, &action("L002", 1, "12a4"), buyer_actor()).await;
        assert!(matches!(result, Err(EscrowError::InvalidPasscode)));
    }

    #[tokio::test]
    async fn test_place_order_rejects_wrong_passcode() {
        let snapshot = seeded_snapshot();
        let result = run(&snapshot, &action("L002", 1, "9999"), buyer_actor()).await;
        assert!(matches!(result, Err(EscrowError::InvalidPasscode)));
    }

    #[tokio::test]
    async fn test_place_order_unknown_buyer() {
        let snapshot = seeded_snapshot();
        let mut act = action("L002", 1, TEST_BUYER_PASSCODE);
        act.buyer_id = "B0000".to_string();
        let result = run(&snapshot, &act, Actor::admin("admin")).await;
        assert!(matches!(result, Err(EscrowError::BuyerNotFound(_))));
    }

    #[tokio::test]
    async fn test_place_order_other_buyer_denied() {
        let snapshot = seeded_snapshot();
        let result = run(
            &snapshot,
            &action("L002", 1, TEST_BUYER_PASSCODE),
            Actor::new("B7777", ActorRole::Buyer),
        )
        .await;
        assert!(matches!(result, Err(EscrowError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn test_place_order_out_of_stock() {
        let snapshot = seeded_snapshot();
        let result = run(&snapshot, &action("L002", 201, TEST_BUYER_PASSCODE), buyer_actor()).await;
        assert!(matches!(
            result,
            Err(EscrowError::OutOfStock {
                requested: 201,
                available: 200
            })
        ));
    }

    #[tokio::test]
    async fn test_place_order_unpriceable_listing_rejected() {
        // 旧数据中超出范围的单价：拒绝而不是按 0 成交或溢出
        let mut snapshot = seeded_snapshot();
        snapshot.listing_mut("L002").unwrap().price_per_unit = 1e30;
        let result = run(&snapshot, &action("L002", 1, TEST_BUYER_PASSCODE), buyer_actor()).await;
        assert!(matches!(result, Err(EscrowError::InvalidPrice)));

        let listing = snapshot.listing_mut("L002").unwrap();
        listing.price_per_unit = 7.0e28;
        listing.quantity = 10;
        let result = run(&snapshot, &action("L002", 10, TEST_BUYER_PASSCODE), buyer_actor()).await;
        assert!(matches!(result, Err(EscrowError::InvalidPrice)));
    }

    #[tokio::test]
    async fn test_place_order_sold_listing_unavailable() {
        let mut snapshot = seeded_snapshot();
        let listing = snapshot.listing_mut("L002").unwrap();
        listing.quantity = 0;
        listing.status = shared::models::ListingStatus::Sold;

        let result = run(&snapshot, &action("L002", 1, TEST_BUYER_PASSCODE), buyer_actor()).await;
        assert!(matches!(result, Err(EscrowError::ListingUnavailable(_))));

        let result = run(&snapshot, &action("L999", 1, TEST_BUYER_PASSCODE), buyer_actor()).await;
        assert!(matches!(result, Err(EscrowError::ListingUnavailable(_))));
    }

    #[tokio::test]
    async fn test_place_order_legacy_listing_gets_farmer_code() {
        let mut snapshot = seeded_snapshot();
        snapshot.listing_mut("L004").unwrap().farmer_code = None;

        let events = run(&snapshot, &action("L004", 2, TEST_BUYER_PASSCODE), buyer_actor())
            .await
            .unwrap();
        let EventPayload::OrderPlaced { order, .. } = &events[0].payload else {
            panic!("Expected OrderPlaced payload");
        };
        let code: u32 = order.farmer_code.parse().unwrap();
        assert!((1000..=9999).contains(&code));
    }

    #[tokio::test]
    async fn test_place_order_without_agents_uses_default() {
        let mut snapshot = seeded_snapshot();
        snapshot.delivery_agents.clear();

        let events = run(&snapshot, &action("L002", 1, TEST_BUYER_PASSCODE), buyer_actor())
            .await
            .unwrap();
        let EventPayload::OrderPlaced { order, delivery, .. } = &events[0].payload else {
            panic!("Expected OrderPlaced payload");
        };
        assert_eq!(order.delivery_agent_id.as_deref(), Some(DEFAULT_AGENT_ID));
        assert_eq!(delivery.delivery_agent_id.as_deref(), Some(DEFAULT_AGENT_ID));
    }
}
