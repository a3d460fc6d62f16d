//! 托管并发测试 - 磁盘 redb + 多线程下单
//!
//! 多个线程同时从同一挂牌下单，验证：
//! - 库存守恒 (已售 + 剩余 = 初始库存)，不会超卖
//! - 每个成功订单恰好一条配送和一条托管付款
//! - 重新打开数据库后快照与事件序号保持不变
//! - 从种子快照重放事件得到相同状态

use std::sync::Arc;
use std::thread;

use agrilink_server::EscrowManager;
use agrilink_server::escrow::EscrowPolicy;
use agrilink_server::escrow::seed::demo_snapshot;
use argon2::password_hash::{PasswordHasher, SaltString, rand_core::OsRng};
use shared::escrow::{
    Actor, ActorRole, CommandErrorCode, CommandOutcome, EscrowCommand, EscrowCommandPayload,
    MarketplaceSnapshot, Secret,
};
use shared::models::{Address, Buyer, ListingStatus, PaymentStatus};

const THREADS: usize = 4;
const ORDERS_PER_THREAD: usize = 12;
const LISTING: &str = "L004";
const QUANTITY: i64 = 7;
const BUYER_ID: &str = "B4242";
const BUYER_PASSCODE: &str = "2468";

/// 低成本 argon2 哈希，保持测试快速
fn cheap_hash(passcode: &str) -> String {
    let params = argon2::Params::new(8, 1, 1, None).unwrap();
    let argon = argon2::Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);
    let salt = SaltString::generate(&mut OsRng);
    argon
        .hash_password(passcode.as_bytes(), &salt)
        .unwrap()
        .to_string()
}

fn seed() -> MarketplaceSnapshot {
    let now = shared::util::now_millis();
    let mut snapshot = demo_snapshot(now).unwrap();
    let address = Address {
        street: "Piassa 3".to_string(),
        city: "Gondar".to_string(),
        state: "Amhara".to_string(),
        postal_code: "6200".to_string(),
    };
    snapshot.buyers.push(Buyer {
        id: BUYER_ID.to_string(),
        name: "Stress Buyer".to_string(),
        email: "stress@example.com".to_string(),
        phone: "+251911000000".to_string(),
        location: address.one_line(),
        address,
        passcode_hash: cheap_hash(BUYER_PASSCODE),
        balance: 0.0,
        created_at: now,
    });
    snapshot
}

fn place_order_cmd() -> EscrowCommand {
    EscrowCommand::new(
        Actor::new(BUYER_ID, ActorRole::Buyer),
        EscrowCommandPayload::PlaceOrder {
            buyer_id: BUYER_ID.to_string(),
            listing_id: LISTING.to_string(),
            quantity: QUANTITY,
            passcode: Secret::new(BUYER_PASSCODE),
        },
    )
}

fn as_json(snapshot: &MarketplaceSnapshot) -> serde_json::Value {
    serde_json::to_value(snapshot).unwrap()
}

#[test]
fn test_concurrent_orders_conserve_stock_and_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("agrilink.redb");
    let base = seed();
    let initial_stock = base.listing(LISTING).unwrap().quantity;

    let manager = Arc::new(EscrowManager::new(&db_path, EscrowPolicy::default()).unwrap());
    assert!(manager.seed_if_empty(|| Ok(base.clone())).unwrap());

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let manager = manager.clone();
            thread::spawn(move || {
                let mut placed = Vec::new();
                let mut out_of_stock = 0usize;
                for _ in 0..ORDERS_PER_THREAD {
                    let resp = manager.execute_command(place_order_cmd());
                    match (resp.success, resp.outcome, resp.error) {
                        (true, Some(CommandOutcome::OrderPlaced { order_id, .. }), _) => {
                            placed.push(order_id)
                        }
                        (false, _, Some(err)) => {
                            assert!(
                                matches!(
                                    err.code,
                                    CommandErrorCode::OutOfStock
                                        | CommandErrorCode::ListingUnavailable
                                ),
                                "unexpected error: {:?}",
                                err
                            );
                            out_of_stock += 1;
                        }
                        other => panic!("unexpected response: {:?}", other),
                    }
                }
                (placed, out_of_stock)
            })
        })
        .collect();

    let mut order_ids = Vec::new();
    let mut rejected = 0;
    for handle in handles {
        let (placed, out_of_stock) = handle.join().unwrap();
        order_ids.extend(placed);
        rejected += out_of_stock;
    }

    let expected_orders = (initial_stock / QUANTITY) as usize;
    assert_eq!(order_ids.len(), expected_orders);
    assert_eq!(order_ids.len() + rejected, THREADS * ORDERS_PER_THREAD);

    // 订单号唯一
    let mut unique = order_ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), order_ids.len());

    let snapshot = manager.get_snapshot().unwrap();
    let listing = snapshot.listing(LISTING).unwrap();
    let sold: i64 = snapshot
        .orders
        .iter()
        .filter(|o| o.listing_id == LISTING)
        .map(|o| o.quantity)
        .sum();
    assert_eq!(sold + listing.quantity, initial_stock);
    assert_eq!(listing.quantity, initial_stock % QUANTITY);
    assert_eq!(listing.status, ListingStatus::Available);

    assert_eq!(snapshot.deliveries.len(), expected_orders);
    assert_eq!(snapshot.payments.len(), expected_orders);
    assert!(
        snapshot
            .payments
            .iter()
            .all(|p| p.status == PaymentStatus::PendingRelease)
    );

    // 重放事件得到相同快照
    let rebuilt = manager.rebuild_snapshot(base.clone()).unwrap();
    assert_eq!(as_json(&rebuilt), as_json(&snapshot));

    let sequence = manager.get_current_sequence().unwrap();
    let epoch = manager.epoch().to_string();
    drop(manager);

    // 重新打开
    let reopened = EscrowManager::new(&db_path, EscrowPolicy::default()).unwrap();
    assert_ne!(reopened.epoch(), epoch);
    assert_eq!(reopened.get_current_sequence().unwrap(), sequence);
    assert_eq!(as_json(&reopened.get_snapshot().unwrap()), as_json(&snapshot));
    assert!(!reopened.seed_if_empty(|| Ok(seed())).unwrap());
}

#[test]
fn test_duplicate_command_id_across_threads_applies_once() {
    let dir = tempfile::tempdir().unwrap();
    let manager = Arc::new(
        EscrowManager::new(dir.path().join("agrilink.redb"), EscrowPolicy::default()).unwrap(),
    );
    manager.seed_if_empty(|| Ok(seed())).unwrap();
    let before = manager.get_snapshot().unwrap().listing(LISTING).unwrap().quantity;

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let manager = manager.clone();
            thread::spawn(move || {
                manager.execute_command(place_order_cmd().with_command_id("shared-retry"))
            })
        })
        .collect();

    for handle in handles {
        let resp = handle.join().unwrap();
        assert!(resp.success, "duplicate should not fail: {:?}", resp.error);
        assert_eq!(resp.command_id, "shared-retry");
    }

    let snapshot = manager.get_snapshot().unwrap();
    assert_eq!(snapshot.orders.len(), 1);
    assert_eq!(snapshot.listing(LISTING).unwrap().quantity, before - QUANTITY);
}
