//! EscrowManager - Core command processing and event generation
//!
//! This module handles:
//! - Command validation and processing
//! - Event generation with global sequence numbers
//! - Persistence to redb (one write transaction per command)
//! - Snapshot updates
//! - Event broadcasting
//!
//! # Command Flow
//!
//! ```text
//! execute_command(cmd)
//!     ├─ 1. Idempotency check (command_id)
//!     ├─ 2. Begin write transaction (global single writer)
//!     ├─ 3. Load snapshot inside the transaction
//!     ├─ 4. Convert command to action and execute
//!     ├─ 5. Apply events to a copy of the snapshot via EventApplier
//!     ├─ 6. Persist events and snapshot
//!     ├─ 7. Mark command processed
//!     ├─ 8. Commit transaction
//!     ├─ 9. Emit audit lines, broadcast event(s)
//!     └─ 10. Return response
//! ```
//!
//! Any error before step 8 drops the transaction: nothing is committed.

mod error;
pub use error::*;

use super::actions::CommandAction;
use super::appliers::replay;
use super::storage::{EscrowStorage, StorageError, StorageStats};
use super::traits::{CommandContext, CommandHandler, CommandMetadata, EscrowPolicy};
use shared::escrow::{
    CommandOutcome, CommandResponse, EscrowCommand, EscrowEvent, EscrowEventType, EventPayload,
    MarketplaceSnapshot,
};
use std::path::Path;
use tokio::sync::broadcast;

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 65536;

/// EscrowManager for command processing
///
/// The `epoch` field is a unique identifier generated on each startup.
/// Clients use it to detect server restarts and trigger full resync.
pub struct EscrowManager {
    storage: EscrowStorage,
    event_tx: broadcast::Sender<EscrowEvent>,
    /// Server instance epoch - unique ID generated on startup
    epoch: String,
    policy: EscrowPolicy,
}

impl std::fmt::Debug for EscrowManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EscrowManager")
            .field("storage", &"<EscrowStorage>")
            .field("event_tx", &"<broadcast::Sender>")
            .field("epoch", &self.epoch)
            .field("policy", &self.policy)
            .finish()
    }
}

impl EscrowManager {
    /// Create a new EscrowManager with the given database path
    pub fn new(db_path: impl AsRef<Path>, policy: EscrowPolicy) -> ManagerResult<Self> {
        let storage = EscrowStorage::open(db_path)?;
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let epoch = uuid::Uuid::new_v4().to_string();
        tracing::info!(
            epoch = %epoch,
            refund_window_ms = policy.refund_window_ms,
            auto_approve_refunds = policy.auto_approve_refunds,
            "EscrowManager started with new epoch"
        );
        Ok(Self {
            storage,
            event_tx,
            epoch,
            policy,
        })
    }

    /// Create an EscrowManager with existing storage (for testing)
    #[cfg(test)]
    pub fn with_storage(storage: EscrowStorage, policy: EscrowPolicy) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let epoch = uuid::Uuid::new_v4().to_string();
        Self {
            storage,
            event_tx,
            epoch,
            policy,
        }
    }

    /// Get the server epoch (unique instance ID)
    pub fn epoch(&self) -> &str {
        &self.epoch
    }

    pub fn policy(&self) -> &EscrowPolicy {
        &self.policy
    }

    /// Subscribe to event broadcasts
    pub fn subscribe(&self) -> broadcast::Receiver<EscrowEvent> {
        self.event_tx.subscribe()
    }

    /// Get the underlying storage
    pub fn storage(&self) -> &EscrowStorage {
        &self.storage
    }

    /// Write an initial snapshot if the store holds none
    ///
    /// `build` is only called on first run. Returns whether a snapshot was written.
    pub fn seed_if_empty<F>(&self, build: F) -> ManagerResult<bool>
    where
        F: FnOnce() -> ManagerResult<MarketplaceSnapshot>,
    {
        let txn = self.storage.begin_write()?;
        if self.storage.load_snapshot_txn(&txn)?.is_some() {
            return Ok(false);
        }
        let snapshot = build()?;
        self.storage.store_snapshot(&txn, &snapshot)?;
        txn.commit().map_err(StorageError::from)?;
        tracing::info!(
            farmers = snapshot.farmers.len(),
            listings = snapshot.listings.len(),
            "Initial marketplace snapshot written"
        );
        Ok(true)
    }

    /// Execute a command and return the response
    pub fn execute_command(&self, cmd: EscrowCommand) -> CommandResponse {
        match self.process_command(cmd.clone()) {
            Ok((response, events)) => {
                // Broadcast events after successful commit
                for event in events {
                    if self.event_tx.send(event).is_err() {
                        tracing::debug!("Event broadcast skipped: no active receivers");
                        break;
                    }
                }
                response
            }
            Err(err) => {
                tracing::info!(
                    command_id = %cmd.command_id,
                    command = cmd.payload.kind(),
                    actor_id = %cmd.actor.id,
                    error = %err,
                    "Command rejected"
                );
                CommandResponse::error(cmd.command_id, err.into())
            }
        }
    }

    /// Process command and return response with events
    ///
    /// Uses the action-based architecture:
    /// 1. Convert command to CommandAction
    /// 2. Execute action to generate events
    /// 3. Apply events to the snapshot via EventApplier
    /// 4. Persist everything atomically
    fn process_command(
        &self,
        cmd: EscrowCommand,
    ) -> ManagerResult<(CommandResponse, Vec<EscrowEvent>)> {
        tracing::debug!(
            command_id = %cmd.command_id,
            command = cmd.payload.kind(),
            actor_id = %cmd.actor.id,
            "Processing command"
        );

        // 1. Idempotency check (before transaction)
        if self.storage.is_command_processed(&cmd.command_id)? {
            tracing::warn!(command_id = %cmd.command_id, "Duplicate command");
            return Ok((CommandResponse::duplicate(cmd.command_id), vec![]));
        }

        // 2. Begin write transaction
        let txn = self.storage.begin_write()?;

        // Double-check idempotency within transaction
        if self
            .storage
            .is_command_processed_txn(&txn, &cmd.command_id)?
        {
            return Ok((CommandResponse::duplicate(cmd.command_id), vec![]));
        }

        // 3. Load snapshot and sequence inside the transaction
        let current_sequence = self.storage.get_current_sequence_txn(&txn)?;
        let snapshot = self.storage.load_snapshot_txn(&txn)?.unwrap_or_default();

        // 4. Create context and metadata
        let mut ctx = CommandContext::new(&snapshot, &self.policy, current_sequence);
        let metadata = CommandMetadata {
            command_id: cmd.command_id.clone(),
            actor: cmd.actor.clone(),
            timestamp: cmd.timestamp,
        };

        // 5. Convert to action and execute
        let action: CommandAction = (&cmd).into();
        let events = futures::executor::block_on(action.execute(&mut ctx, &metadata))
            .map_err(ManagerError::from)?;

        if events.is_empty() {
            return Err(ManagerError::Internal(format!(
                "{} produced no events",
                cmd.payload.kind()
            )));
        }

        // 6. Apply events
        let audit_before = snapshot.audit_log.len();
        let mut updated = snapshot.clone();
        replay(&mut updated, &events);

        // 7. Persist events and snapshot
        for event in &events {
            self.storage.store_event(&txn, event)?;
        }
        self.storage.store_snapshot(&txn, &updated)?;

        let max_sequence = events.iter().map(|e| e.sequence).max().unwrap_or(current_sequence);
        if max_sequence > current_sequence {
            self.storage.set_sequence(&txn, max_sequence)?;
        }

        // 8. Mark processed and commit
        self.storage.mark_command_processed(&txn, &cmd.command_id)?;
        txn.commit().map_err(StorageError::from)?;

        // 9. Audit lines for the committed entries
        for entry in updated.audit_log.iter().skip(audit_before) {
            crate::audit_log!(
                entry.user_id.as_str(),
                entry.action.label(),
                entry.id.as_str(),
                entry.details.as_str()
            );
        }

        tracing::info!(
            command_id = %cmd.command_id,
            command = cmd.payload.kind(),
            event_count = events.len(),
            "Command processed successfully"
        );

        let outcome = outcome_of(&events);
        Ok((CommandResponse::success(cmd.command_id, outcome), events))
    }

    // ========== Public Query Methods ==========

    /// Latest committed snapshot (empty default on a fresh store)
    pub fn get_snapshot(&self) -> ManagerResult<MarketplaceSnapshot> {
        Ok(self.storage.load_snapshot()?.unwrap_or_default())
    }

    /// Get current sequence number
    pub fn get_current_sequence(&self) -> ManagerResult<u64> {
        Ok(self.storage.get_current_sequence()?)
    }

    /// Get events since a given sequence
    pub fn get_events_since(&self, since_sequence: u64) -> ManagerResult<Vec<EscrowEvent>> {
        Ok(self.storage.get_events_since(since_sequence)?)
    }

    /// Storage statistics
    pub fn get_stats(&self) -> ManagerResult<StorageStats> {
        Ok(self.storage.get_stats()?)
    }

    /// Rebuild a snapshot from events (for verification)
    ///
    /// Replays the whole journal onto `base`, which must be the snapshot the
    /// journal started from (the seed, or the empty default).
    pub fn rebuild_snapshot(&self, base: MarketplaceSnapshot) -> ManagerResult<MarketplaceSnapshot> {
        let events = self.storage.get_events_since(0)?;
        let mut snapshot = base;
        replay(&mut snapshot, &events);
        Ok(snapshot)
    }
}

/// Summarize what a command produced from its events
fn outcome_of(events: &[EscrowEvent]) -> Option<CommandOutcome> {
    let has = |t: EscrowEventType| events.iter().any(|e| e.event_type == t);

    let outcome = match &events.first()?.payload {
        EventPayload::BuyerRegistered { buyer } => CommandOutcome::BuyerRegistered {
            buyer_id: buyer.id.clone(),
        },
        EventPayload::ListingCreated { listing } => CommandOutcome::ListingCreated {
            listing_id: listing.id.clone(),
        },
        EventPayload::OrderPlaced {
            order,
            delivery,
            payment,
        } => CommandOutcome::OrderPlaced {
            order_id: order.id.clone(),
            delivery_id: delivery.id.clone(),
            payment_id: payment.id.clone(),
            buyer_code: order.buyer_code.clone(),
            total_price: order.total_price,
        },
        EventPayload::DeliveryConfirmed {
            delivery_id,
            order_id,
            ..
        } => CommandOutcome::DeliveryConfirmed {
            delivery_id: delivery_id.clone(),
            order_id: order_id.clone(),
            payment_released: has(EscrowEventType::PaymentReleased),
        },
        EventPayload::RefundRequested { order_id, .. } => CommandOutcome::RefundRequested {
            order_id: order_id.clone(),
            auto_approved: has(EscrowEventType::RefundApproved),
        },
        EventPayload::RefundApproved { order_id, .. } => CommandOutcome::RefundApproved {
            order_id: order_id.clone(),
        },
        EventPayload::RefundRejected { order_id, .. } => CommandOutcome::RefundRejected {
            order_id: order_id.clone(),
        },
        EventPayload::DeliveryOverridden {
            delivery_id,
            sync_payment_released,
            ..
        } => CommandOutcome::DeliveryOverridden {
            delivery_id: delivery_id.clone(),
            payment_released: *sync_payment_released || has(EscrowEventType::PaymentReleased),
        },
        EventPayload::FarmerRated { order_id, .. } | EventPayload::RatingSkipped { order_id } => {
            CommandOutcome::RatingRecorded {
                order_id: order_id.clone(),
            }
        }
        EventPayload::PaymentReleased { .. } | EventPayload::PaymentRefunded { .. } => {
            return None;
        }
    };
    Some(outcome)
}

#[cfg(test)]
mod tests;
