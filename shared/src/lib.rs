//! Shared types for AgriLink
//!
//! Common types used by the server and its clients: error codes and
//! response envelopes, marketplace entities, and the escrow command/event
//! model.

pub mod client;
pub mod error;
pub mod escrow;
pub mod models;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};
