//! Shipment Tracking Engine
//!
//! Core library for cross-border parcel tracking: the shipment record
//! store, the status transition engine, query/aggregation, and track code
//! generation. Invoked by an external conversational presentation layer —
//! this crate has no wire protocol of its own.
//!
//! # Module structure
//!
//! ```text
//! track-engine/src/
//! ├── config.rs      # Engine configuration, admin roster
//! ├── db/            # SQLite pool, migrations, repositories
//! ├── services/      # Track codes, registration, transitions, statistics, export
//! └── utils/         # Logging setup
//! ```

pub mod config;
pub mod db;
pub mod services;
pub mod utils;

// Re-export public types
pub use config::{AdminRoster, EngineConfig};
pub use db::repository::{RepoError, RepoResult};
pub use db::DbService;

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
