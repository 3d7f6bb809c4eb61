//! Tabular Export
//!
//! Flat row-per-shipment projection for spreadsheet consumption. Null
//! optional fields render as blanks or zeroes — a single sparse shipment
//! never fails the export. Column labels and ordering are not a
//! compatibility contract.

use crate::db::repository::{RepoError, RepoResult};
use serde::Serialize;
use shared::models::Shipment;

/// One export row
#[derive(Debug, Clone, Serialize)]
pub struct ExportRow {
    pub track_code: String,
    pub product_name: String,
    pub category: String,
    pub status: String,
    pub weight_kg: f64,
    pub total_value_usd: f64,
    pub quantity: i64,
    pub created_at: String,
    pub updated_at: String,
    pub arrival_date: String,
    pub special_properties: String,
}

fn format_datetime(millis: Option<i64>) -> String {
    millis
        .and_then(chrono::DateTime::from_timestamp_millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

fn format_date(millis: Option<i64>) -> String {
    millis
        .and_then(chrono::DateTime::from_timestamp_millis)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn special_properties(shipment: &Shipment) -> String {
    let mut properties = Vec::new();
    if shipment.fragile {
        properties.push("Fragile");
    }
    if shipment.has_battery {
        properties.push("Battery");
    }
    if shipment.is_liquid {
        properties.push("Liquid");
    }
    if properties.is_empty() {
        "None".to_string()
    } else {
        properties.join(", ")
    }
}

fn row(shipment: &Shipment) -> ExportRow {
    ExportRow {
        track_code: shipment.track_code.clone(),
        product_name: shipment.product_name.clone().unwrap_or_default(),
        category: shipment
            .category
            .map(|c| c.as_str().to_string())
            .unwrap_or_default(),
        status: shipment.status.as_str().to_string(),
        weight_kg: shipment.weight_kg.unwrap_or(0.0),
        total_value_usd: shipment.total_value_usd,
        quantity: shipment.quantity,
        created_at: format_datetime(Some(shipment.created_at)),
        updated_at: format_datetime(Some(shipment.updated_at)),
        arrival_date: format_date(shipment.arrival_date),
        special_properties: special_properties(shipment),
    }
}

/// Project shipments into export rows
pub fn rows(shipments: &[Shipment]) -> Vec<ExportRow> {
    shipments.iter().map(row).collect()
}

/// Serialize shipments as CSV bytes (header row included)
pub fn to_csv(shipments: &[Shipment]) -> RepoResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for shipment in shipments {
        writer
            .serialize(row(shipment))
            .map_err(|e| RepoError::Database(format!("Export failed: {e}")))?;
    }
    writer
        .into_inner()
        .map_err(|e| RepoError::Database(format!("Export failed: {e}")))
}
