//! Escrow event sourcing types
//!
//! This module provides types for the escrow state machine:
//! - Commands: Requests from principals to mutate the marketplace
//! - Events: Immutable facts recorded after command processing
//! - Snapshot: The marketplace document computed by applying events

pub mod command;
pub mod event;
pub mod snapshot;
pub mod types;

// Re-exports
pub use command::{EscrowCommand, EscrowCommandPayload};
pub use event::{EscrowEvent, EscrowEventType, EventPayload};
pub use snapshot::MarketplaceSnapshot;
pub use types::*;
