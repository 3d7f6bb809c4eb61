//! Shipment Model

use serde::{Deserialize, Serialize};

/// Shipment pipeline status
///
/// `Completed` and `Cancelled` are terminal; the transition engine refuses
/// to move a shipment out of them. `Cancelled` and `Problem` are reachable
/// from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ShipmentStatus {
    #[default]
    Created,
    OriginWarehouse,
    InTransit,
    DestinationWarehouse,
    ReadyForPickup,
    Delivered,
    Completed,
    Cancelled,
    Problem,
}

impl ShipmentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ShipmentStatus::Completed | ShipmentStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShipmentStatus::Created => "CREATED",
            ShipmentStatus::OriginWarehouse => "ORIGIN_WAREHOUSE",
            ShipmentStatus::InTransit => "IN_TRANSIT",
            ShipmentStatus::DestinationWarehouse => "DESTINATION_WAREHOUSE",
            ShipmentStatus::ReadyForPickup => "READY_FOR_PICKUP",
            ShipmentStatus::Delivered => "DELIVERED",
            ShipmentStatus::Completed => "COMPLETED",
            ShipmentStatus::Cancelled => "CANCELLED",
            ShipmentStatus::Problem => "PROBLEM",
        }
    }
}

impl std::str::FromStr for ShipmentStatus {
    type Err = ();

    /// Strict decode — unknown strings are rejected, never stored as free text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATED" => Ok(ShipmentStatus::Created),
            "ORIGIN_WAREHOUSE" => Ok(ShipmentStatus::OriginWarehouse),
            "IN_TRANSIT" => Ok(ShipmentStatus::InTransit),
            "DESTINATION_WAREHOUSE" => Ok(ShipmentStatus::DestinationWarehouse),
            "READY_FOR_PICKUP" => Ok(ShipmentStatus::ReadyForPickup),
            "DELIVERED" => Ok(ShipmentStatus::Delivered),
            "COMPLETED" => Ok(ShipmentStatus::Completed),
            "CANCELLED" => Ok(ShipmentStatus::Cancelled),
            "PROBLEM" => Ok(ShipmentStatus::Problem),
            _ => Err(()),
        }
    }
}

/// Last-mile / door delivery sub-status, independent of the main status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum DoorDeliveryStatus {
    #[default]
    Pending,
    Delivered,
    Cancelled,
}

/// Product category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum Category {
    Electronics,
    Clothing,
    Shoes,
    HomeAppliances,
    Beauty,
    Toys,
    Automotive,
    Sports,
    Other,
}

impl Category {
    /// 2-letter code used inside track codes
    pub fn code(self) -> &'static str {
        match self {
            Category::Electronics => "EL",
            Category::Clothing => "CL",
            Category::Shoes => "SH",
            Category::HomeAppliances => "HM",
            Category::Beauty => "BT",
            Category::Toys => "TY",
            Category::Automotive => "AU",
            Category::Sports => "SP",
            Category::Other => "OT",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Electronics => "electronics",
            Category::Clothing => "clothing",
            Category::Shoes => "shoes",
            Category::HomeAppliances => "home_appliances",
            Category::Beauty => "beauty",
            Category::Toys => "toys",
            Category::Automotive => "automotive",
            Category::Sports => "sports",
            Category::Other => "other",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "electronics" => Ok(Category::Electronics),
            "clothing" => Ok(Category::Clothing),
            "shoes" => Ok(Category::Shoes),
            "home_appliances" => Ok(Category::HomeAppliances),
            "beauty" => Ok(Category::Beauty),
            "toys" => Ok(Category::Toys),
            "automotive" => Ok(Category::Automotive),
            "sports" => Ok(Category::Sports),
            "other" => Ok(Category::Other),
            _ => Err(()),
        }
    }
}

/// Shipment entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Shipment {
    pub id: i64,
    /// Generated track code (unique, immutable once assigned)
    pub track_code: String,
    /// Owner reference
    pub owner_id: i64,
    pub product_name: Option<String>,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub quantity: i64,
    pub unit_price_usd: f64,
    /// Computed projection: quantity × unit price. Never directly settable.
    pub total_value_usd: f64,
    pub weight_kg: Option<f64>,
    pub length_cm: Option<f64>,
    pub width_cm: Option<f64>,
    pub height_cm: Option<f64>,
    pub fragile: bool,
    pub has_battery: bool,
    pub is_liquid: bool,
    pub status: ShipmentStatus,
    pub country_from: Option<String>,
    /// Declared delivery mode, free text
    pub delivery_type: Option<String>,
    pub send_date: Option<i64>,
    /// Operator-entered, not computed
    pub expected_delivery_date: Option<i64>,
    /// Set when the shipment reaches the destination warehouse
    pub arrival_date: Option<i64>,
    pub door_delivery_status: DoorDeliveryStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Descriptive fields shared by the create payloads
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShipmentDraft {
    pub product_name: Option<String>,
    pub category: Option<Category>,
    pub description: Option<String>,
    /// Defaults to 1
    pub quantity: Option<i64>,
    /// Defaults to 0.0
    pub unit_price_usd: Option<f64>,
    pub weight_kg: Option<f64>,
    pub length_cm: Option<f64>,
    pub width_cm: Option<f64>,
    pub height_cm: Option<f64>,
    pub fragile: Option<bool>,
    pub has_battery: Option<bool>,
    pub is_liquid: Option<bool>,
    pub country_from: Option<String>,
    pub delivery_type: Option<String>,
    pub send_date: Option<i64>,
    pub expected_delivery_date: Option<i64>,
}

/// Create shipment payload (track code already allocated)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentCreate {
    pub track_code: String,
    pub owner_id: i64,
    #[serde(flatten)]
    pub fields: ShipmentDraft,
}

/// Update shipment payload
///
/// Partial-update semantics: only present fields are applied. Status,
/// arrival date and total value are deliberately absent — status and
/// arrival move through the transition engine, total value is recomputed
/// from quantity and unit price.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShipmentUpdate {
    pub product_name: Option<String>,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub quantity: Option<i64>,
    pub unit_price_usd: Option<f64>,
    pub weight_kg: Option<f64>,
    pub length_cm: Option<f64>,
    pub width_cm: Option<f64>,
    pub height_cm: Option<f64>,
    pub fragile: Option<bool>,
    pub has_battery: Option<bool>,
    pub is_liquid: Option<bool>,
    pub country_from: Option<String>,
    pub delivery_type: Option<String>,
    pub send_date: Option<i64>,
    pub expected_delivery_date: Option<i64>,
}

impl ShipmentUpdate {
    /// Patch restricted to the purely descriptive fields an owner may touch
    /// after dispatch.
    pub fn descriptive_only(self) -> Self {
        Self {
            product_name: self.product_name,
            description: self.description,
            ..Self::default()
        }
    }
}

/// Shipment with owner info (for admin detail views)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ShipmentDetail {
    pub id: i64,
    pub track_code: String,
    pub owner_id: i64,
    pub product_name: Option<String>,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub quantity: i64,
    pub unit_price_usd: f64,
    pub total_value_usd: f64,
    pub weight_kg: Option<f64>,
    pub status: ShipmentStatus,
    pub arrival_date: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    pub owner_account_id: i64,
    pub owner_name: Option<String>,
    pub owner_phone: Option<String>,
    pub owner_region: Option<String>,
}
