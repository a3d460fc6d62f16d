use super::*;
use crate::escrow::test_support::{TEST_BUYER_ID, TEST_BUYER_PASSCODE, TEST_NOW, seeded_snapshot};
use shared::escrow::{Actor, ActorRole, CommandErrorCode, EscrowCommandPayload, Secret};

/// 一小时 (ms)
const HOUR: i64 = 60 * 60 * 1000;

fn create_test_manager() -> EscrowManager {
    create_test_manager_with_policy(EscrowPolicy::default())
}

fn create_test_manager_with_policy(policy: EscrowPolicy) -> EscrowManager {
    let storage = EscrowStorage::open_in_memory().unwrap();
    let manager = EscrowManager::with_storage(storage, policy);
    assert!(manager.seed_if_empty(|| Ok(seeded_snapshot())).unwrap());
    manager
}

fn buyer() -> Actor {
    Actor::new(TEST_BUYER_ID, ActorRole::Buyer)
}

fn admin() -> Actor {
    Actor::admin("admin")
}

fn place_order_cmd(listing_id: &str, quantity: i64, at: i64) -> EscrowCommand {
    EscrowCommand::new(
        buyer(),
        EscrowCommandPayload::PlaceOrder {
            buyer_id: TEST_BUYER_ID.to_string(),
            listing_id: listing_id.to_string(),
            quantity,
            passcode: Secret::new(TEST_BUYER_PASSCODE),
        },
    )
    .at(at)
}

/// Order placed through the manager
struct PlacedOrder {
    order_id: String,
    delivery_id: String,
    agent_id: String,
    farmer_code: String,
    buyer_code: String,
}

fn place_order(manager: &EscrowManager, listing_id: &str, quantity: i64, at: i64) -> PlacedOrder {
    let resp = manager.execute_command(place_order_cmd(listing_id, quantity, at));
    assert!(resp.success, "Failed to place order: {:?}", resp.error);
    let Some(CommandOutcome::OrderPlaced {
        order_id,
        delivery_id,
        buyer_code,
        ..
    }) = resp.outcome
    else {
        panic!("unexpected outcome: {:?}", resp.outcome);
    };

    let snapshot = manager.get_snapshot().unwrap();
    let order = snapshot.order(&order_id).unwrap();
    PlacedOrder {
        agent_id: order.delivery_agent_id.clone().unwrap(),
        farmer_code: order.farmer_code.clone(),
        order_id,
        delivery_id,
        buyer_code,
    }
}

fn confirm_cmd(placed: &PlacedOrder, farmer_code: &str, buyer_code: &str, at: i64) -> EscrowCommand {
    EscrowCommand::new(
        Actor::new(placed.agent_id.clone(), ActorRole::DeliveryAgent),
        EscrowCommandPayload::ConfirmDelivery {
            delivery_id: placed.delivery_id.clone(),
            delivery_agent_id: placed.agent_id.clone(),
            farmer_code: Secret::new(farmer_code),
            buyer_code: Secret::new(buyer_code),
        },
    )
    .at(at)
}

fn confirm_delivery(manager: &EscrowManager, placed: &PlacedOrder, at: i64) {
    let resp = manager.execute_command(confirm_cmd(
        placed,
        &placed.farmer_code,
        &placed.buyer_code,
        at,
    ));
    assert!(resp.success, "Failed to confirm delivery: {:?}", resp.error);
}

fn refund_cmd(order_id: &str, reason: Option<&str>, at: i64) -> EscrowCommand {
    EscrowCommand::new(
        buyer(),
        EscrowCommandPayload::RequestRefund {
            order_id: order_id.to_string(),
            passcode: Secret::new(TEST_BUYER_PASSCODE),
            reason: reason.map(str::to_string),
        },
    )
    .at(at)
}

fn admin_cmd(payload: EscrowCommandPayload, at: i64) -> EscrowCommand {
    EscrowCommand::new(admin(), payload).at(at)
}

fn error_code(resp: &CommandResponse) -> CommandErrorCode {
    assert!(!resp.success, "expected failure, got {:?}", resp.outcome);
    resp.error.as_ref().unwrap().code
}
