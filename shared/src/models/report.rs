//! Report Models
//!
//! Aggregate rows produced by the statistics queries.

use serde::{Deserialize, Serialize};

/// Delivery statistics for one calendar month of created shipments
///
/// `pending` counts an explicit status list (created, origin warehouse,
/// ready for pickup, problem) — cancelled and completed shipments are in
/// `total` but in no other bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DeliveryStats {
    pub total: i64,
    pub delivered: i64,
    /// At the destination warehouse
    pub arrived: i64,
    pub in_transit: i64,
    pub pending: i64,
}

/// Raw financial totals for one time window
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct FinancialTotals {
    pub total_value: f64,
    pub total_quantity: i64,
    /// Shipments with a non-null declared value
    pub shipment_count: i64,
}

/// Financial summary for one calendar month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyFinancials {
    /// "MM.YYYY"
    pub period: String,
    pub total_value: f64,
    pub total_quantity: i64,
    pub shipment_count: i64,
    /// total_value / shipment_count, 0.0 for an empty window
    pub average_value: f64,
}

/// Outcome of a bulk status transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkUpdateOutcome {
    pub updated_count: usize,
    pub updated_codes: Vec<String>,
}
