//! Exception auditor
//!
//! Read-side scan over deliveries. A delivery is an exception when its
//! status flags contradict each other:
//!
//! | # | Condition | Issue |
//! |---|-----------|-------|
//! | a | Delivered ∧ ¬codesVerified | Codes not verified |
//! | b | ¬Delivered ∧ codesVerified | Status inconsistency |
//! | c | Delivered ∧ codesVerified ∧ ¬paymentReleased | Payment not released |
//!
//! 多条同时满足时取第一条。孤儿配送（订单不存在）跳过并记录错误日志。

use serde::Serialize;
use shared::escrow::MarketplaceSnapshot;
use shared::models::{Delivery, DeliveryStatus, Order};

/// Exception reason
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExceptionIssue {
    #[serde(rename = "Codes not verified")]
    CodesNotVerified,
    #[serde(rename = "Status inconsistency")]
    StatusInconsistency,
    #[serde(rename = "Payment not released")]
    PaymentNotReleased,
}

impl ExceptionIssue {
    pub fn label(&self) -> &'static str {
        match self {
            ExceptionIssue::CodesNotVerified => "Codes not verified",
            ExceptionIssue::StatusInconsistency => "Status inconsistency",
            ExceptionIssue::PaymentNotReleased => "Payment not released",
        }
    }

    /// What the problem is
    pub fn description(&self) -> &'static str {
        match self {
            ExceptionIssue::CodesNotVerified => {
                "Delivery marked as delivered but codes were not verified."
            }
            ExceptionIssue::StatusInconsistency => {
                "Codes verified but delivery status is not \"Delivered\"."
            }
            ExceptionIssue::PaymentNotReleased => {
                "Delivery completed and codes verified but payment not released."
            }
        }
    }

    /// What the state should have been
    pub fn expected(&self) -> &'static str {
        match self {
            ExceptionIssue::CodesNotVerified => {
                "Codes should be verified before delivery confirmation."
            }
            ExceptionIssue::StatusInconsistency => {
                "Delivery status should be \"Delivered\" when codes are verified."
            }
            ExceptionIssue::PaymentNotReleased => "Payment should be automatically released.",
        }
    }
}

/// Classify a delivery; `None` means consistent
pub fn classify(delivery: &Delivery) -> Option<ExceptionIssue> {
    let delivered = delivery.status == DeliveryStatus::Delivered;
    match (delivered, delivery.codes_verified, delivery.payment_released) {
        (true, false, _) => Some(ExceptionIssue::CodesNotVerified),
        (false, true, _) => Some(ExceptionIssue::StatusInconsistency),
        (true, true, false) => Some(ExceptionIssue::PaymentNotReleased),
        _ => None,
    }
}

/// One flagged delivery
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionRecord {
    pub delivery: Delivery,
    pub order: Order,
    pub issue: ExceptionIssue,
}

/// Auditor output
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionReport {
    pub exceptions: Vec<ExceptionRecord>,
    pub count: usize,
}

/// Scan all deliveries in storage order
pub fn find_exceptions(snapshot: &MarketplaceSnapshot) -> ExceptionReport {
    let mut exceptions = Vec::new();

    for delivery in &snapshot.deliveries {
        let Some(order) = snapshot.order(&delivery.order_id) else {
            tracing::error!(
                delivery_id = %delivery.id,
                order_id = %delivery.order_id,
                "Orphan delivery skipped by auditor"
            );
            continue;
        };
        if let Some(issue) = classify(delivery) {
            exceptions.push(ExceptionRecord {
                delivery: delivery.clone(),
                order: order.clone(),
                issue,
            });
        }
    }

    let count = exceptions.len();
    ExceptionReport { exceptions, count }
}

/// Codes section of an investigation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodesInfo {
    pub farmer_code: String,
    pub buyer_code: String,
    pub delivery_agent_id: Option<String>,
}

/// Structured investigation of one delivery
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestigationReport {
    pub delivery_id: String,
    pub order_id: String,
    pub crop: String,
    pub crop_en: String,
    pub quantity: i64,
    pub unit: String,
    pub farmer: String,
    pub buyer: String,
    pub delivery_status: DeliveryStatus,
    pub codes_verified: bool,
    pub payment_released: bool,
    pub issue: Option<ExceptionIssue>,
    pub description: Option<String>,
    pub expected: Option<String>,
    pub codes: CodesInfo,
}

/// Why an investigation could not be produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvestigateError {
    DeliveryNotFound(String),
    OrphanDelivery(String),
}

/// Build the investigation report for one delivery
///
/// Works for consistent deliveries too (`issue` is then `None`).
pub fn investigate(
    snapshot: &MarketplaceSnapshot,
    delivery_id: &str,
) -> Result<InvestigationReport, InvestigateError> {
    let delivery = snapshot
        .delivery(delivery_id)
        .ok_or_else(|| InvestigateError::DeliveryNotFound(delivery_id.to_string()))?;
    let order = snapshot
        .order(&delivery.order_id)
        .ok_or_else(|| InvestigateError::OrphanDelivery(delivery_id.to_string()))?;

    let farmer = snapshot
        .farmer(&delivery.farmer_id)
        .map(|f| f.name.clone())
        .unwrap_or_else(|| delivery.farmer_id.clone());
    let buyer = snapshot
        .buyer(&delivery.buyer_id)
        .map(|b| b.name.clone())
        .unwrap_or_else(|| delivery.buyer_id.clone());
    let issue = classify(delivery);

    Ok(InvestigationReport {
        delivery_id: delivery.id.clone(),
        order_id: order.id.clone(),
        crop: delivery.crop.clone(),
        crop_en: delivery.crop_en.clone(),
        quantity: delivery.quantity,
        unit: delivery.unit.clone(),
        farmer,
        buyer,
        delivery_status: delivery.status,
        codes_verified: delivery.codes_verified,
        payment_released: delivery.payment_released,
        issue,
        description: issue.map(|i| i.description().to_string()),
        expected: issue.map(|i| i.expected().to_string()),
        codes: CodesInfo {
            farmer_code: order.farmer_code.clone(),
            buyer_code: order.buyer_code.clone(),
            delivery_agent_id: delivery.delivery_agent_id.clone(),
        },
    })
}
