//! FarmerRated / RatingSkipped event appliers

use crate::escrow::money::running_average;
use crate::escrow::traits::EventApplier;
use shared::escrow::{EscrowEvent, EventPayload, MarketplaceSnapshot};
use shared::models::AuditAction;

/// FarmerRated applier
pub struct FarmerRatedApplier;

impl EventApplier for FarmerRatedApplier {
    fn apply(&self, snapshot: &mut MarketplaceSnapshot, event: &EscrowEvent) {
        if let EventPayload::FarmerRated {
            order_id,
            farmer_id,
            stars,
        } = &event.payload
        {
            if let Some(order) = snapshot.order_mut(order_id) {
                order.rated = true;
            }

            let mut farmer_name = farmer_id.clone();
            if let Some(farmer) = snapshot.farmer_mut(farmer_id) {
                farmer.rating = running_average(farmer.rating, farmer.num_ratings, f64::from(*stars));
                farmer.num_ratings += 1;
                farmer_name = farmer.name.clone();
            }

            snapshot.append_audit(
                event.timestamp,
                AuditAction::FarmerRated,
                event.actor_id.clone(),
                format!("Buyer rated farmer {} with {} stars", farmer_name, stars),
            );

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
        }
    }
}

/// RatingSkipped applier
pub struct RatingSkippedApplier;

impl EventApplier for RatingSkippedApplier {
    fn apply(&self, snapshot: &mut MarketplaceSnapshot, event: &EscrowEvent) {
        if let EventPayload::RatingSkipped { order_id } = &event.payload {
            if let Some(order) = snapshot.order_mut(order_id) {
                order.rated = true;
            }

            snapshot.append_audit(
                event.timestamp,
                AuditAction::RatingSkipped,
                event.actor_id.clone(),
                format!("Buyer skipped rating for order {}", order_id),
            );

            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escrow::test_support::{TEST_NOW, delivered_snapshot};
    use shared::escrow::{ActorRole, EscrowEventType};

    #[test]
    fn test_farmer_rated_updates_average() {
        let mut snapshot = delivered_snapshot();
        let event = EscrowEvent::new(
            5,
            "B1001".to_string(),
            ActorRole::Buyer,
            "cmd-5".to_string(),
            TEST_NOW,
            EscrowEventType::FarmerRated,
            EventPayload::FarmerRated {
                order_id: "O001".to_string(),
                farmer_id: "F001".to_string(),
                stars: 3,
            },
        );
        FarmerRatedApplier.apply(&mut snapshot, &event);

        // (4.5 * 2 + 3) / 3 = 4.0
        let farmer = snapshot.farmer("F001").unwrap();
        assert_eq!(farmer.rating, 4.0);
        assert_eq!(farmer.num_ratings, 3);
        assert_eq!(farmer.successful_deliveries, 5);
        assert!(snapshot.order("O001").unwrap().rated);
        assert_eq!(
            snapshot.audit_log[0].details,
            "Buyer rated farmer አበበ ተስፋዬ with 3 stars"
        );
    }

    #[test]
    fn test_rating_skipped_marks_rated_only() {
        let mut snapshot = delivered_snapshot();
        let event = EscrowEvent::new(
            6,
            "B1001".to_string(),
            ActorRole::Buyer,
            "cmd-6".to_string(),
            TEST_NOW,
            EscrowEventType::RatingSkipped,
            EventPayload::RatingSkipped {
                order_id: "O001".to_string(),
            },
        );
        RatingSkippedApplier.apply(&mut snapshot, &event);

        assert!(snapshot.order("O001").unwrap().rated);
        let farmer = snapshot.farmer("F001").unwrap();
        assert_eq!(farmer.rating, 4.5);
        assert_eq!(farmer.num_ratings, 2);
    }
}
