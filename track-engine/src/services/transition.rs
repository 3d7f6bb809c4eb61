//! Transition Engine
//!
//! Validates and applies status changes. Role gating (only administrators
//! move shipments) and state gating (terminal states, post-dispatch edit
//! restrictions) live here; the repository only executes the writes.

use crate::db::repository::{shipment, RepoError, RepoResult};
use shared::models::{
    BulkUpdateOutcome, DoorDeliveryStatus, Owner, Role, Shipment, ShipmentStatus, ShipmentUpdate,
};
use sqlx::SqlitePool;

fn require_admin(role: Role) -> RepoResult<()> {
    if !role.is_admin() {
        return Err(RepoError::Forbidden(
            "Only administrators may change shipment status".into(),
        ));
    }
    Ok(())
}

/// Log storage faults with operation context before propagating.
/// Not-found and validation outcomes pass through silently — they are
/// control flow, not faults.
fn trace_storage_failure(op: &str, track_codes: &[&str], err: RepoError) -> RepoError {
    if matches!(err, RepoError::Database(_)) {
        tracing::error!(operation = op, codes = ?track_codes, error = %err, "Storage failure");
    }
    err
}

/// Resolve the arrival timestamp for a transition.
///
/// Entering the destination warehouse records an arrival date: the supplied
/// timestamp, or now as the documented default. Every other transition
/// leaves `arrival_date` untouched.
fn arrival_for(status: ShipmentStatus, supplied: Option<i64>) -> Option<i64> {
    if status == ShipmentStatus::DestinationWarehouse {
        Some(supplied.unwrap_or_else(shared::util::now_millis))
    } else {
        None
    }
}

/// Apply a status change to a single shipment
pub async fn set_status(
    pool: &SqlitePool,
    actor_role: Role,
    track_code: &str,
    new_status: ShipmentStatus,
    arrival_date: Option<i64>,
) -> RepoResult<Shipment> {
    require_admin(actor_role)?;

    let arrival = arrival_for(new_status, arrival_date);
    let affected = shipment::update_status(pool, track_code, new_status, arrival)
        .await
        .map_err(|e| trace_storage_failure("set_status", &[track_code], e))?;

    if affected == 0 {
        // Missing row and terminal row both leave zero rows affected
        return match shipment::find_by_track_code(pool, track_code).await? {
            Some(existing) => Err(RepoError::Validation(format!(
                "Shipment {track_code} is already {} and cannot change status",
                existing.status.as_str()
            ))),
            None => Err(RepoError::NotFound(format!(
                "Shipment {track_code} not found"
            ))),
        };
    }

    shipment::find_by_track_code(pool, track_code)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Shipment {track_code} not found")))
}

/// Apply one status change to a set of shipments as a single logical
/// operation
///
/// Returns the count and codes actually updated; codes that are missing or
/// already terminal are silently excluded. Storage failures abort the whole
/// batch.
pub async fn set_status_bulk(
    pool: &SqlitePool,
    actor_role: Role,
    track_codes: &[String],
    new_status: ShipmentStatus,
    arrival_date: Option<i64>,
) -> RepoResult<BulkUpdateOutcome> {
    require_admin(actor_role)?;

    let arrival = arrival_for(new_status, arrival_date);
    shipment::bulk_update_status(pool, track_codes, new_status, arrival)
        .await
        .map_err(|e| {
            let codes: Vec<&str> = track_codes.iter().map(String::as_str).collect();
            trace_storage_failure("set_status_bulk", &codes, e)
        })
}

/// Bulk transition scoped to a dispatch day
///
/// Selects every shipment whose `send_date` falls within the full calendar
/// day `[D 00:00, D+1 00:00)` — never an exact timestamp match.
pub async fn set_status_for_dispatch_date(
    pool: &SqlitePool,
    actor_role: Role,
    date: chrono::NaiveDate,
    new_status: ShipmentStatus,
    arrival_date: Option<i64>,
) -> RepoResult<BulkUpdateOutcome> {
    require_admin(actor_role)?;

    let next_day = date
        .checked_add_days(chrono::Days::new(1))
        .ok_or_else(|| RepoError::Validation(format!("Date out of range: {date}")))?;
    let start = date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp_millis();
    let end = next_day
        .and_time(chrono::NaiveTime::MIN)
        .and_utc()
        .timestamp_millis();

    let codes = shipment::find_codes_by_send_date(pool, start, end).await?;
    set_status_bulk(pool, actor_role, &codes, new_status, arrival_date).await
}

/// Owner-initiated edit of a shipment's descriptive fields
///
/// Owners never set status. Once the shipment has left the pre-dispatch
/// states, the patch is silently narrowed to name and description; other
/// fields are dropped, not rejected.
pub async fn edit_own_shipment(
    pool: &SqlitePool,
    owner: &Owner,
    track_code: &str,
    patch: ShipmentUpdate,
) -> RepoResult<Shipment> {
    let existing = shipment::find_by_track_code(pool, track_code)
        .await?
        .filter(|s| s.owner_id == owner.id)
        .ok_or_else(|| RepoError::NotFound(format!("Shipment {track_code} not found")))?;

    let editable = matches!(
        existing.status,
        ShipmentStatus::Created | ShipmentStatus::OriginWarehouse
    );
    let patch = if editable { patch } else { patch.descriptive_only() };

    shipment::update_fields_for_owner(pool, track_code, owner.id, patch)
        .await
        .map_err(|e| trace_storage_failure("edit_own_shipment", &[track_code], e))
}

/// Administrator edit without the post-dispatch field restriction
pub async fn edit_shipment(
    pool: &SqlitePool,
    actor_role: Role,
    track_code: &str,
    patch: ShipmentUpdate,
) -> RepoResult<Shipment> {
    require_admin(actor_role)?;
    shipment::update_fields(pool, track_code, patch)
        .await
        .map_err(|e| trace_storage_failure("edit_shipment", &[track_code], e))
}

/// Set the door-delivery sub-status, independent of the main status
pub async fn set_door_delivery(
    pool: &SqlitePool,
    actor_role: Role,
    track_code: &str,
    status: DoorDeliveryStatus,
) -> RepoResult<Shipment> {
    require_admin(actor_role)?;
    shipment::update_door_delivery(pool, track_code, status)
        .await
        .map_err(|e| trace_storage_failure("set_door_delivery", &[track_code], e))
}
