//! Read-side views over the marketplace snapshot
//!
//! 全部为纯函数：输入快照，输出 API 视图，不写任何状态。

use serde::{Deserialize, Serialize};
use shared::escrow::{Actor, ActorRole, MarketplaceSnapshot};
use shared::models::{
    AuditLogEntry, Delivery, DeliveryStatus, ListingView, Order, PaymentStatus, RefundStatus,
};

use super::auditor::find_exceptions;
use super::money::{to_decimal, to_f64};

/// Default audit page size
pub const AUDIT_PAGE_DEFAULT: usize = 50;
/// Largest audit page a client may request
pub const AUDIT_PAGE_MAX: usize = 500;
/// Crops shown in the market news headline
pub const TOP_CROPS: usize = 3;

// ============================================================================
// Admin summary
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSummary {
    pub total_farmers: usize,
    pub active_listings: usize,
    pub pending_deliveries: usize,
    pub payments_released: usize,
    pub exceptions_count: usize,
    pub pending_refunds: usize,
}

pub fn admin_summary(snapshot: &MarketplaceSnapshot) -> AdminSummary {
    AdminSummary {
        total_farmers: snapshot.farmers.len(),
        active_listings: snapshot.listings.iter().filter(|l| l.is_available()).count(),
        pending_deliveries: snapshot
            .deliveries
            .iter()
            .filter(|d| d.status == DeliveryStatus::Pending)
            .count(),
        payments_released: snapshot
            .payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Released)
            .count(),
        exceptions_count: find_exceptions(snapshot).count,
        pending_refunds: snapshot
            .orders
            .iter()
            .filter(|o| o.refund_status == RefundStatus::Pending)
            .count(),
    }
}

// ============================================================================
// Farmer statement
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerStatement {
    pub farmer_id: String,
    pub name: String,
    pub balance: f64,
    /// Sum of this farmer's payments currently in Released
    pub total_earned: f64,
    pub total_sold: i64,
    pub rating: f64,
    pub num_ratings: u32,
    pub successful_deliveries: u32,
}

/// Statement for one farmer, `None` if the farmer does not exist
pub fn farmer_statement(snapshot: &MarketplaceSnapshot, farmer_id: &str) -> Option<FarmerStatement> {
    let farmer = snapshot.farmer(farmer_id)?;

    let earned = snapshot
        .payments
        .iter()
        .filter(|p| p.farmer_id == farmer_id && p.status == PaymentStatus::Released)
        .map(|p| to_decimal(p.amount))
        .sum();
    let total_sold = snapshot
        .orders
        .iter()
        .filter(|o| o.farmer_id == farmer_id)
        .map(|o| o.quantity)
        .sum();

    Some(FarmerStatement {
        farmer_id: farmer.id.clone(),
        name: farmer.name.clone(),
        balance: farmer.balance,
        total_earned: to_f64(earned),
        total_sold,
        rating: farmer.rating,
        num_ratings: farmer.num_ratings,
        successful_deliveries: farmer.successful_deliveries,
    })
}

// ============================================================================
// Market news
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropDemand {
    pub crop: String,
    pub total_orders: u64,
    pub avg_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketNews {
    /// Most ordered crops, highest first
    pub top_crops: Vec<CropDemand>,
    /// Every crop with its average price, by name
    pub prices: Vec<CropDemand>,
}

pub fn market_news(snapshot: &MarketplaceSnapshot) -> MarketNews {
    let prices: Vec<CropDemand> = snapshot
        .demand_metrics
        .iter()
        .map(|(crop, m)| CropDemand {
            crop: crop.clone(),
            total_orders: m.total_orders,
            avg_price: m.avg_price,
        })
        .collect();

    let mut top_crops = prices.clone();
    // 同票按作物名排序 (BTreeMap 已有序，sort_by 稳定)
    top_crops.sort_by(|a, b| b.total_orders.cmp(&a.total_orders));
    top_crops.truncate(TOP_CROPS);

    MarketNews { top_crops, prices }
}

// ============================================================================
// Listings
// ============================================================================

/// Public listing views, farmer codes never included
///
/// `available_only` hides sold-out listings.
pub fn listing_views(snapshot: &MarketplaceSnapshot, available_only: bool) -> Vec<ListingView> {
    snapshot
        .listings
        .iter()
        .filter(|l| !available_only || l.is_available())
        .map(|l| {
            let farmer = snapshot.farmer(&l.farmer_id);
            ListingView {
                id: l.id.clone(),
                farmer_id: l.farmer_id.clone(),
                farmer_name: farmer.map(|f| f.name.clone()).unwrap_or_default(),
                farmer_location: farmer.map(|f| f.location.clone()).unwrap_or_default(),
                farmer_rating: farmer.map(|f| f.rating).unwrap_or_default(),
                crop: l.crop.clone(),
                crop_en: l.crop_en.clone(),
                quantity: l.quantity,
                price_per_unit: l.price_per_unit,
                unit: l.unit.clone(),
                date_listed: l.date_listed.clone(),
                status: l.status,
            }
        })
        .collect()
}

// ============================================================================
// Audit log
// ============================================================================

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct AuditQuery {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditPage {
    pub entries: Vec<AuditLogEntry>,
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}

/// One page of the audit log, newest first
pub fn audit_page(snapshot: &MarketplaceSnapshot, query: AuditQuery) -> AuditPage {
    let offset = query.offset.unwrap_or(0);
    let limit = query
        .limit
        .unwrap_or(AUDIT_PAGE_DEFAULT)
        .clamp(1, AUDIT_PAGE_MAX);

    let entries = snapshot
        .audit_log
        .iter()
        .rev()
        .skip(offset)
        .take(limit)
        .cloned()
        .collect();

    AuditPage {
        entries,
        total: snapshot.audit_log.len(),
        offset,
        limit,
    }
}

// ============================================================================
// Visibility
// ============================================================================

/// Orders the actor may see, with the other party's code blanked
///
/// 买家只看到自己的买家码，农户只看到农户码，管理员全部可见。
pub fn visible_orders(snapshot: &MarketplaceSnapshot, actor: &Actor) -> Vec<Order> {
    snapshot
        .orders
        .iter()
        .filter_map(|o| visible_order(o, actor))
        .collect()
}

/// One order as seen by `actor`, `None` if it is not theirs
pub fn visible_order(order: &Order, actor: &Actor) -> Option<Order> {
    match actor.role {
        ActorRole::Admin | ActorRole::System => Some(order.clone()),
        ActorRole::Buyer if order.buyer_id == actor.id => {
            let mut order = order.clone();
            order.farmer_code.clear();
            Some(order)
        }
        ActorRole::Farmer if order.farmer_id == actor.id => {
            let mut order = order.clone();
            order.buyer_code.clear();
            Some(order)
        }
        _ => None,
    }
}

/// Deliveries assigned to an agent (all of them for admin)
pub fn visible_deliveries(snapshot: &MarketplaceSnapshot, actor: &Actor) -> Vec<Delivery> {
    snapshot
        .deliveries
        .iter()
        .filter(|d| match actor.role {
            ActorRole::Admin | ActorRole::System => true,
            ActorRole::DeliveryAgent => d.delivery_agent_id.as_deref() == Some(actor.id.as_str()),
            ActorRole::Farmer => d.farmer_id == actor.id,
            ActorRole::Buyer => d.buyer_id == actor.id,
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escrow::test_support::{
        TEST_BUYER_ID, TEST_NOW, buyer_actor, delivered_snapshot, seeded_snapshot,
        snapshot_with_triple,
    };
    use shared::models::AuditAction;

    #[test]
    fn test_admin_summary_counts() {
        let mut snapshot = delivered_snapshot();
        snapshot.order_mut("O001").unwrap().refund_status = RefundStatus::Pending;

        let summary = admin_summary(&snapshot);
        assert_eq!(summary.total_farmers, 2);
        assert_eq!(summary.active_listings, 6);
        assert_eq!(summary.pending_deliveries, 0);
        assert_eq!(summary.payments_released, 1);
        assert_eq!(summary.exceptions_count, 0);
        assert_eq!(summary.pending_refunds, 1);

        let summary = admin_summary(&snapshot_with_triple());
        assert_eq!(summary.pending_deliveries, 1);
        assert_eq!(summary.payments_released, 0);
    }

    #[test]
    fn test_farmer_statement() {
        let statement = farmer_statement(&delivered_snapshot(), "F001").unwrap();
        assert_eq!(statement.balance, 1248.0);
        assert_eq!(statement.total_earned, 1248.0);
        assert_eq!(statement.total_sold, 40);
        assert_eq!(statement.successful_deliveries, 5);

        let statement = farmer_statement(&delivered_snapshot(), "F002").unwrap();
        assert_eq!(statement.total_earned, 0.0);
        assert_eq!(statement.total_sold, 0);

        assert!(farmer_statement(&seeded_snapshot(), "F404").is_none());
    }

    #[test]
    fn test_market_news_top_three() {
        let news = market_news(&seeded_snapshot());
        let top: Vec<&str> = news.top_crops.iter().map(|c| c.crop.as_str()).collect();
        // 8, 6, 5 orders
        assert_eq!(top, vec!["ቲማቲም", "ሽንኩርት", "ጤፍ"]);
        assert_eq!(news.prices.len(), 6);
    }

    #[test]
    fn test_listing_views_hide_sold() {
        let mut snapshot = seeded_snapshot();
        snapshot.listing_mut("L001").unwrap().quantity = 0;

        assert_eq!(listing_views(&snapshot, false).len(), 6);
        let available = listing_views(&snapshot, true);
        assert_eq!(available.len(), 5);
        assert_eq!(available[0].id, "L002");
        assert_eq!(available[0].farmer_name, "አበበ ተስፋዬ");
    }

    #[test]
    fn test_audit_page_newest_first_and_clamped() {
        let mut snapshot = seeded_snapshot();
        for i in 0..5 {
            snapshot.append_audit(TEST_NOW + i, AuditAction::OrderPlaced, "B1001", format!("#{i}"));
        }

        let page = audit_page(&snapshot, AuditQuery::default());
        assert_eq!(page.total, 5);
        assert_eq!(page.limit, AUDIT_PAGE_DEFAULT);
        assert_eq!(page.entries[0].id, "A005");

        let page = audit_page(
            &snapshot,
            AuditQuery {
                offset: Some(1),
                limit: Some(2),
            },
        );
        let ids: Vec<&str> = page.entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["A004", "A003"]);

        let page = audit_page(
            &snapshot,
            AuditQuery {
                offset: None,
                limit: Some(10_000),
            },
        );
        assert_eq!(page.limit, AUDIT_PAGE_MAX);
    }

    #[test]
    fn test_visibility_by_role() {
        let snapshot = snapshot_with_triple();

        let mine = visible_orders(&snapshot, &buyer_actor());
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].buyer_code, "4821");
        assert!(mine[0].farmer_code.is_empty());

        let farmer = Actor::new("F001", ActorRole::Farmer);
        let theirs = visible_orders(&snapshot, &farmer);
        assert_eq!(theirs[0].farmer_code, "7315");
        assert!(theirs[0].buyer_code.is_empty());

        let stranger = Actor::new("B9999", ActorRole::Buyer);
        assert!(visible_orders(&snapshot, &stranger).is_empty());

        let agent = Actor::new("DA001", ActorRole::DeliveryAgent);
        assert_eq!(visible_deliveries(&snapshot, &agent).len(), 1);
        let other_agent = Actor::new("DA002", ActorRole::DeliveryAgent);
        assert!(visible_deliveries(&snapshot, &other_agent).is_empty());
        assert!(visible_orders(&snapshot, &agent).is_empty());

        assert_eq!(
            visible_orders(&snapshot, &Actor::admin("admin"))[0].buyer_id,
            TEST_BUYER_ID
        );
    }
}
