//! Marketplace data models
//!
//! Shared between agrilink-server and clients (via API).
//! All IDs are opaque strings (`F001`, `B4821`, `O001` ...); JSON uses camelCase.

pub mod audit;
pub mod buyer;
pub mod delivery;
pub mod delivery_agent;
pub mod demand;
pub mod farmer;
pub mod listing;
pub mod order;
pub mod payment;

// Re-exports
pub use audit::*;
pub use buyer::*;
pub use delivery::*;
pub use delivery_agent::*;
pub use demand::*;
pub use farmer::*;
pub use listing::*;
pub use order::*;
pub use payment::*;
