//! Shared types for the front-desk system
//!
//! Data models exchanged between desk-server, the remote hotel API and the
//! admin dashboard. No business logic lives here.

pub mod models;

// Re-exports
pub use serde::{Deserialize, Serialize};
