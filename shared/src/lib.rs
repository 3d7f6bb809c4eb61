//! Shared types for the shipment tracking core
//!
//! Data models and small utilities used by the engine crate and by any
//! presentation layer embedding it. DB row derives are feature-gated so the
//! models stay usable without the database stack.

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
