//! Data models
//!
//! Shared between the engine crate and the presentation layer.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All internal IDs are `i64` (SQLite INTEGER PRIMARY KEY); timestamps are
//! millisecond UTC.

pub mod owner;
pub mod report;
pub mod shipment;

// Re-exports
pub use owner::*;
pub use report::*;
pub use shipment::*;
