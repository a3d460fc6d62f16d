//! Escrow Event Sourcing Module for AgriLink Server
//!
//! This module implements the escrow state machine using event sourcing:
//!
//! - **manager**: Core EscrowManager for command processing and event generation
//! - **storage**: redb-based persistence for events, the snapshot, and processed commands
//! - **actions / appliers**: Command validation and event application
//! - **settlement**: Release and refund of escrowed payments
//! - **auditor**: Exception scan and investigation over deliveries
//! - **reports**: Read-side views (summary, statements, market news, audit log)
//!
//! # Architecture
//!
//! ```text
//! Command → EscrowManager → Event(s) → Storage (redb)
//!                 ↓                        ↓
//!              Broadcast            Snapshot Update
//!                 ↓
//!           All Subscribers
//! ```
//!
//! # Data Flow
//!
//! 1. HTTP handler builds an EscrowCommand for the authenticated actor
//! 2. EscrowManager validates and processes the command
//! 3. EscrowEvent(s) are generated with global sequence numbers
//! 4. Events and the new snapshot are persisted in one redb transaction
//! 5. Events are broadcast to all subscribers
//! 6. CommandResponse is returned to the handler

pub mod actions;
pub mod appliers;
pub mod auditor;
pub mod codes;
pub mod manager;
pub mod money;
pub mod reports;
pub mod seed;
pub mod settlement;
pub mod storage;
pub mod traits;

#[cfg(test)]
pub mod test_support;

// Re-exports
pub use auditor::{ExceptionIssue, ExceptionReport, InvestigationReport, find_exceptions, investigate};
pub use manager::{EscrowManager, ManagerError, ManagerResult};
pub use storage::{EscrowStorage, StorageError};
pub use traits::{EscrowError, EscrowPolicy};

// Re-export shared types for convenience
pub use shared::escrow::{
    Actor, ActorRole, CommandError, CommandErrorCode, CommandOutcome, CommandResponse,
    EscrowCommand, EscrowCommandPayload, EscrowEvent, EscrowEventType, MarketplaceSnapshot,
};
