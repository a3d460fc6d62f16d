//! Shared fixtures for escrow unit tests

use super::appliers::replay;
use super::seed::demo_snapshot;
use super::traits::CommandMetadata;
use crate::auth::passcode::hash_passcode;
use shared::escrow::{Actor, ActorRole, EscrowEvent, MarketplaceSnapshot};
use shared::models::{
    Address, Buyer, Delivery, DeliveryStatus, Order, OrderStatus, Payment, PaymentStatus,
    RefundStatus,
};

/// 2024-03-15 08:30:05 UTC
pub const TEST_NOW: i64 = 1_710_491_405_000;

pub const TEST_BUYER_ID: &str = "B1001";
pub const TEST_BUYER_PASSCODE: &str = "4321";

pub fn create_test_metadata(actor: Actor) -> CommandMetadata {
    CommandMetadata {
        command_id: "cmd-1".to_string(),
        actor,
        timestamp: TEST_NOW,
    }
}

pub fn buyer_actor() -> Actor {
    Actor::new(TEST_BUYER_ID, ActorRole::Buyer)
}

pub fn test_buyer(id: &str, email: &str, passcode: &str) -> Buyer {
    let address = Address {
        street: "Bole Road 12".to_string(),
        city: "Addis Ababa".to_string(),
        state: "Addis Ababa".to_string(),
        postal_code: "1000".to_string(),
    };
    Buyer {
        id: id.to_string(),
        name: "Test Buyer".to_string(),
        email: email.to_string(),
        phone: "+251900000000".to_string(),
        location: address.one_line(),
        address,
        passcode_hash: hash_passcode(passcode).unwrap(),
        balance: 0.0,
        created_at: TEST_NOW,
    }
}

/// Demo dataset plus one registered buyer (`B1001` / `4321`)
pub fn seeded_snapshot() -> MarketplaceSnapshot {
    let mut snapshot = demo_snapshot(TEST_NOW).unwrap();
    snapshot
        .buyers
        .push(test_buyer(TEST_BUYER_ID, "buyer@example.com", TEST_BUYER_PASSCODE));
    snapshot
}

/// Apply events the way the manager does
pub fn apply_events(snapshot: &mut MarketplaceSnapshot, events: &[EscrowEvent]) {
    replay(snapshot, events);
}

/// Order O-xxx for B1001 / F001: 40 kg tomato @ 30, codes 7315 / 4821
pub fn order_fixture(id: &str) -> Order {
    Order {
        id: id.to_string(),
        buyer_id: TEST_BUYER_ID.to_string(),
        farmer_id: "F001".to_string(),
        listing_id: "L002".to_string(),
        crop: "ቲማቲም".to_string(),
        crop_en: "Tomato".to_string(),
        quantity: 40,
        unit: "kg".to_string(),
        price_per_unit: 30.0,
        base_price: 1200.0,
        delivery_fee: 24.0,
        platform_fee: 24.0,
        total_price: 1248.0,
        date_ordered: "2024-03-15".to_string(),
        expected_delivery_time: "2-4 days".to_string(),
        farmer_code: "7315".to_string(),
        buyer_code: "4821".to_string(),
        delivery_agent_id: Some("DA001".to_string()),
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
    }
}

pub fn delivery_fixture(id: &str, order_id: &str) -> Delivery {
    Delivery {
        id: id.to_string(),
        order_id: order_id.to_string(),
        farmer_id: "F001".to_string(),
        buyer_id: TEST_BUYER_ID.to_string(),
        crop: "ቲማቲም".to_string(),
        crop_en: "Tomato".to_string(),
        quantity: 40,
        unit: "kg".to_string(),
        pickup_location: "አዲስ አበባ".to_string(),
        dropoff_location: "Bole Road 12, Addis Ababa, Addis Ababa 1000".to_string(),
        delivery_agent_id: Some("DA001".to_string()),
        status: DeliveryStatus::Pending,
        codes_verified: false,
        payment_released: false,
        date_created: "2024-03-15".to_string(),
        date_delivered: None,
        time_delivered: None,
    }
}

pub fn payment_fixture(id: &str, order_id: &str, delivery_id: &str) -> Payment {
    Payment {
        id: id.to_string(),
        order_id: order_id.to_string(),
        delivery_id: delivery_id.to_string(),
        buyer_id: TEST_BUYER_ID.to_string(),
        farmer_id: "F001".to_string(),
        amount: 1248.0,
        status: PaymentStatus::PendingRelease,
        date_created: "2024-03-15".to_string(),
        date_released: None,
        date_refunded: None,
    }
}

/// Seeded snapshot with the O001/D001/P001 triple in place
pub fn snapshot_with_triple() -> MarketplaceSnapshot {
    let mut snapshot = seeded_snapshot();
    snapshot.orders.push(order_fixture("O001"));
    snapshot.deliveries.push(delivery_fixture("D001", "O001"));
    snapshot.payments.push(payment_fixture("P001", "O001", "D001"));
    snapshot
}

/// Same as [`snapshot_with_triple`], already delivered and paid out at `TEST_NOW`
pub fn delivered_snapshot() -> MarketplaceSnapshot {
    let mut snapshot = snapshot_with_triple();
    {
        let order = snapshot.order_mut("O001").unwrap();
        order.status = OrderStatus::Delivered;
        order.codes_verified = true;
        order.payment_released = true;
        order.delivery_timestamp = Some(TEST_NOW);
    }
    {
        let delivery = snapshot.delivery_mut("D001").unwrap();
        delivery.status = DeliveryStatus::Delivered;
        delivery.codes_verified = true;
        delivery.payment_released = true;
    }
    {
        let payment = snapshot.payment_mut("P001").unwrap();
        payment.status = PaymentStatus::Released;
        payment.date_released = Some("2024-03-15".to_string());
    }
    {
        let farmer = snapshot.farmer_mut("F001").unwrap();
        farmer.balance = 1248.0;
        farmer.total_earned = 1248.0;
    }
    snapshot
}
