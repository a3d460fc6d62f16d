//! Command action implementations
//!
//! Each action implements the `CommandHandler` trait and handles
//! one specific command type. Actions read the snapshot and return
//! events; they never mutate state.

use async_trait::async_trait;

use crate::escrow::traits::{CommandContext, CommandHandler, CommandMetadata, EscrowError};
use shared::escrow::{EscrowCommand, EscrowCommandPayload, EscrowEvent};

mod approve_refund;
mod confirm_delivery;
mod create_listing;
mod manual_override;
pub mod place_order;
mod rate_farmer;
mod register_buyer;
pub mod request_refund;
mod reject_refund;

pub use approve_refund::ApproveRefundAction;
pub use confirm_delivery::ConfirmDeliveryAction;
pub use create_listing::CreateListingAction;
pub use manual_override::ManualOverrideAction;
pub use place_order::PlaceOrderAction;
pub use rate_farmer::{RateFarmerAction, SkipRatingAction};
pub use register_buyer::RegisterBuyerAction;
pub use reject_refund::RejectRefundAction;
pub use request_refund::RequestRefundAction;

/// CommandAction enum - dispatches to concrete action implementations
pub enum CommandAction {
    RegisterBuyer(RegisterBuyerAction),
    CreateListing(CreateListingAction),
    PlaceOrder(PlaceOrderAction),
    ConfirmDelivery(ConfirmDeliveryAction),
    RequestRefund(RequestRefundAction),
    ApproveRefund(ApproveRefundAction),
    RejectRefund(RejectRefundAction),
    ManualOverride(ManualOverrideAction),
    RateFarmer(RateFarmerAction),
    SkipRating(SkipRatingAction),
}

#[async_trait]
impl CommandHandler for CommandAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<EscrowEvent>, EscrowError> {
        match self {
            CommandAction::RegisterBuyer(action) => action.execute(ctx, metadata).await,
            CommandAction::CreateListing(action) => action.execute(ctx, metadata).await,
            CommandAction::PlaceOrder(action) => action.execute(ctx, metadata).await,
            CommandAction::ConfirmDelivery(action) => action.execute(ctx, metadata).await,
            CommandAction::RequestRefund(action) => action.execute(ctx, metadata).await,
            CommandAction::ApproveRefund(action) => action.execute(ctx, metadata).await,
            CommandAction::RejectRefund(action) => action.execute(ctx, metadata).await,
            CommandAction::ManualOverride(action) => action.execute(ctx, metadata).await,
            CommandAction::RateFarmer(action) => action.execute(ctx, metadata).await,
            CommandAction::SkipRating(action) => action.execute(ctx, metadata).await,
        }
    }
}

/// Convert EscrowCommand reference to CommandAction
///
/// This is the ONLY place with a match on EscrowCommandPayload.
impl From<&EscrowCommand> for CommandAction {
    fn from(cmd: &EscrowCommand) -> Self {
        match &cmd.payload {
            EscrowCommandPayload::RegisterBuyer {
                name,
                email,
                phone,
                address,
                passcode,
            } => CommandAction::RegisterBuyer(RegisterBuyerAction {
                name: name.clone(),
                email: email.clone(),
                phone: phone.clone(),
                address: address.clone(),
                passcode: passcode.clone(),
            }),
            EscrowCommandPayload::CreateListing {
                farmer_id,
                crop,
                crop_en,
                quantity,
                price_per_unit,
                unit,
            } => CommandAction::CreateListing(CreateListingAction {
                farmer_id: farmer_id.clone(),
                crop: crop.clone(),
                crop_en: crop_en.clone(),
                quantity: *quantity,
                price_per_unit: *price_per_unit,
                unit: unit.clone(),
            }),
            EscrowCommandPayload::PlaceOrder {
                buyer_id,
                listing_id,
                quantity,
                passcode,
            } => CommandAction::PlaceOrder(PlaceOrderAction {
                buyer_id: buyer_id.clone(),
                listing_id: listing_id.clone(),
                quantity: *quantity,
                passcode: passcode.clone(),
            }),
            EscrowCommandPayload::ConfirmDelivery {
                delivery_id,
                delivery_agent_id,
                farmer_code,
                buyer_code,
            } => CommandAction::ConfirmDelivery(ConfirmDeliveryAction {
                delivery_id: delivery_id.clone(),
                delivery_agent_id: delivery_agent_id.clone(),
                farmer_code: farmer_code.clone(),
                buyer_code: buyer_code.clone(),
            }),
            EscrowCommandPayload::RequestRefund {
                order_id,
                passcode,
                reason,
            } => CommandAction::RequestRefund(RequestRefundAction {
                order_id: order_id.clone(),
                passcode: passcode.clone(),
                reason: reason.clone(),
            }),
            EscrowCommandPayload::ApproveRefund { order_id } => {
                CommandAction::ApproveRefund(ApproveRefundAction {
                    order_id: order_id.clone(),
                })
            }
            EscrowCommandPayload::RejectRefund { order_id, note } => {
                CommandAction::RejectRefund(RejectRefundAction {
                    order_id: order_id.clone(),
                    note: note.clone(),
                })
            }
            EscrowCommandPayload::ManualOverride { delivery_id } => {
                CommandAction::ManualOverride(ManualOverrideAction {
                    delivery_id: delivery_id.clone(),
                })
            }
            EscrowCommandPayload::RateFarmer { order_id, stars } => {
                CommandAction::RateFarmer(RateFarmerAction {
                    order_id: order_id.clone(),
                    stars: *stars,
                })
            }
            EscrowCommandPayload::SkipRating { order_id } => {
                CommandAction::SkipRating(SkipRatingAction {
                    order_id: order_id.clone(),
                })
            }
        }
    }
}
