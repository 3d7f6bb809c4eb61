//! Service Layer
//!
//! Business rules on top of the repository: identifier generation and
//! registration, the status transition engine, statistics, and export.

pub mod export;
pub mod registration;
pub mod statistics;
pub mod track_code;
pub mod transition;
