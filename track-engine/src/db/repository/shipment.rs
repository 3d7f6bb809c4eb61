//! Shipment Repository

use super::{RepoError, RepoResult};
use shared::models::{
    BulkUpdateOutcome, DeliveryStats, DoorDeliveryStatus, FinancialTotals, Shipment,
    ShipmentCreate, ShipmentDetail, ShipmentStatus, ShipmentUpdate,
};
use sqlx::SqlitePool;

const SHIPMENT_SELECT: &str = "SELECT id, track_code, owner_id, product_name, category, description, quantity, unit_price_usd, total_value_usd, weight_kg, length_cm, width_cm, height_cm, fragile, has_battery, is_liquid, status, country_from, delivery_type, send_date, expected_delivery_date, arrival_date, door_delivery_status, created_at, updated_at FROM shipment";

fn validate_quantity(quantity: i64) -> RepoResult<()> {
    if quantity < 1 {
        return Err(RepoError::Validation(format!(
            "Quantity must be at least 1: {quantity}"
        )));
    }
    Ok(())
}

fn validate_unit_price(price: f64) -> RepoResult<()> {
    if price < 0.0 {
        return Err(RepoError::Validation(format!(
            "Unit price cannot be negative: {price}"
        )));
    }
    Ok(())
}

fn validate_weight(weight: f64) -> RepoResult<()> {
    if weight <= 0.0 {
        return Err(RepoError::Validation(format!(
            "Weight must be positive: {weight}"
        )));
    }
    Ok(())
}

fn validate_patch(data: &ShipmentUpdate) -> RepoResult<()> {
    if let Some(q) = data.quantity {
        validate_quantity(q)?;
    }
    if let Some(p) = data.unit_price_usd {
        validate_unit_price(p)?;
    }
    if let Some(w) = data.weight_kg {
        validate_weight(w)?;
    }
    Ok(())
}

pub async fn find_by_track_code(pool: &SqlitePool, track_code: &str) -> RepoResult<Option<Shipment>> {
    let sql = format!("{SHIPMENT_SELECT} WHERE track_code = ?");
    let shipment = sqlx::query_as::<_, Shipment>(&sql)
        .bind(track_code)
        .fetch_optional(pool)
        .await?;
    Ok(shipment)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Shipment>> {
    let sql = format!("{SHIPMENT_SELECT} WHERE id = ?");
    let shipment = sqlx::query_as::<_, Shipment>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(shipment)
}

pub async fn find_by_owner(
    pool: &SqlitePool,
    owner_id: i64,
    limit: i32,
    offset: i32,
) -> RepoResult<Vec<Shipment>> {
    let sql = format!("{SHIPMENT_SELECT} WHERE owner_id = ? ORDER BY created_at DESC LIMIT ? OFFSET ?");
    let shipments = sqlx::query_as::<_, Shipment>(&sql)
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    Ok(shipments)
}

pub async fn find_by_status(
    pool: &SqlitePool,
    status: ShipmentStatus,
    limit: i32,
    offset: i32,
) -> RepoResult<Vec<Shipment>> {
    let sql = format!("{SHIPMENT_SELECT} WHERE status = ? ORDER BY created_at DESC LIMIT ? OFFSET ?");
    let shipments = sqlx::query_as::<_, Shipment>(&sql)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    Ok(shipments)
}

/// Create a new shipment
///
/// Rejects an already-used track code with `Duplicate` — the generator's
/// uniqueness is probabilistic, the store is the source of truth.
pub async fn create(pool: &SqlitePool, data: ShipmentCreate) -> RepoResult<Shipment> {
    if find_by_track_code(pool, &data.track_code).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Track code '{}' already exists",
            data.track_code
        )));
    }

    let f = data.fields;
    let quantity = f.quantity.unwrap_or(1);
    let unit_price = f.unit_price_usd.unwrap_or(0.0);
    validate_quantity(quantity)?;
    validate_unit_price(unit_price)?;
    if let Some(w) = f.weight_kg {
        validate_weight(w)?;
    }
    let total_value = unit_price * quantity as f64;
    let now = shared::util::now_millis();

    sqlx::query(
        "INSERT INTO shipment (track_code, owner_id, product_name, category, description, quantity, unit_price_usd, total_value_usd, weight_kg, length_cm, width_cm, height_cm, fragile, has_battery, is_liquid, status, country_from, delivery_type, send_date, expected_delivery_date, door_delivery_status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?22)",
    )
    .bind(&data.track_code)
    .bind(data.owner_id)
    .bind(f.product_name)
    .bind(f.category)
    .bind(f.description)
    .bind(quantity)
    .bind(unit_price)
    .bind(total_value)
    .bind(f.weight_kg)
    .bind(f.length_cm)
    .bind(f.width_cm)
    .bind(f.height_cm)
    .bind(f.fragile.unwrap_or(false))
    .bind(f.has_battery.unwrap_or(false))
    .bind(f.is_liquid.unwrap_or(false))
    .bind(ShipmentStatus::Created)
    .bind(f.country_from)
    .bind(f.delivery_type)
    .bind(f.send_date)
    .bind(f.expected_delivery_date)
    .bind(DoorDeliveryStatus::Pending)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_track_code(pool, &data.track_code)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create shipment".into()))
}

/// Partial update by track code
///
/// Only present fields are applied; `updated_at` is always refreshed. The
/// total value is recomputed in-statement whenever quantity or unit price
/// is part of the patch, so the two can never drift apart.
pub async fn update_fields(
    pool: &SqlitePool,
    track_code: &str,
    data: ShipmentUpdate,
) -> RepoResult<Shipment> {
    validate_patch(&data)?;
    let now = shared::util::now_millis();

    let rows = sqlx::query(
        "UPDATE shipment SET \
            product_name = COALESCE(?1, product_name), \
            category = COALESCE(?2, category), \
            description = COALESCE(?3, description), \
            quantity = COALESCE(?4, quantity), \
            unit_price_usd = COALESCE(?5, unit_price_usd), \
            total_value_usd = CASE WHEN ?4 IS NOT NULL OR ?5 IS NOT NULL THEN COALESCE(?4, quantity) * COALESCE(?5, unit_price_usd) ELSE total_value_usd END, \
            weight_kg = COALESCE(?6, weight_kg), \
            length_cm = COALESCE(?7, length_cm), \
            width_cm = COALESCE(?8, width_cm), \
            height_cm = COALESCE(?9, height_cm), \
            fragile = COALESCE(?10, fragile), \
            has_battery = COALESCE(?11, has_battery), \
            is_liquid = COALESCE(?12, is_liquid), \
            country_from = COALESCE(?13, country_from), \
            delivery_type = COALESCE(?14, delivery_type), \
            send_date = COALESCE(?15, send_date), \
            expected_delivery_date = COALESCE(?16, expected_delivery_date), \
            updated_at = ?17 \
        WHERE track_code = ?18",
    )
    .bind(data.product_name)
    .bind(data.category)
    .bind(data.description)
    .bind(data.quantity)
    .bind(data.unit_price_usd)
    .bind(data.weight_kg)
    .bind(data.length_cm)
    .bind(data.width_cm)
    .bind(data.height_cm)
    .bind(data.fragile)
    .bind(data.has_battery)
    .bind(data.is_liquid)
    .bind(data.country_from)
    .bind(data.delivery_type)
    .bind(data.send_date)
    .bind(data.expected_delivery_date)
    .bind(now)
    .bind(track_code)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Shipment {track_code} not found"
        )));
    }
    find_by_track_code(pool, track_code)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Shipment {track_code} not found")))
}

/// Partial update by internal row id
pub async fn update_fields_by_id(
    pool: &SqlitePool,
    id: i64,
    data: ShipmentUpdate,
) -> RepoResult<Shipment> {
    let track_code = sqlx::query_scalar::<_, String>("SELECT track_code FROM shipment WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Shipment {id} not found")))?;
    update_fields(pool, &track_code, data).await
}

/// Owner-scoped partial update
///
/// Billing-relevant fields are additionally gated in-statement: once the
/// shipment has left the pre-dispatch states they stay untouched no matter
/// what the patch carries, so a stale status read can never let them slip
/// through.
pub async fn update_fields_for_owner(
    pool: &SqlitePool,
    track_code: &str,
    owner_id: i64,
    data: ShipmentUpdate,
) -> RepoResult<Shipment> {
    validate_patch(&data)?;
    let now = shared::util::now_millis();

    let rows = sqlx::query(
        "UPDATE shipment SET \
            product_name = COALESCE(?1, product_name), \
            description = COALESCE(?3, description), \
            category = CASE WHEN status IN ('CREATED', 'ORIGIN_WAREHOUSE') THEN COALESCE(?2, category) ELSE category END, \
            quantity = CASE WHEN status IN ('CREATED', 'ORIGIN_WAREHOUSE') THEN COALESCE(?4, quantity) ELSE quantity END, \
            unit_price_usd = CASE WHEN status IN ('CREATED', 'ORIGIN_WAREHOUSE') THEN COALESCE(?5, unit_price_usd) ELSE unit_price_usd END, \
            total_value_usd = CASE WHEN status IN ('CREATED', 'ORIGIN_WAREHOUSE') AND (?4 IS NOT NULL OR ?5 IS NOT NULL) THEN COALESCE(?4, quantity) * COALESCE(?5, unit_price_usd) ELSE total_value_usd END, \
            weight_kg = CASE WHEN status IN ('CREATED', 'ORIGIN_WAREHOUSE') THEN COALESCE(?6, weight_kg) ELSE weight_kg END, \
            length_cm = CASE WHEN status IN ('CREATED', 'ORIGIN_WAREHOUSE') THEN COALESCE(?7, length_cm) ELSE length_cm END, \
            width_cm = CASE WHEN status IN ('CREATED', 'ORIGIN_WAREHOUSE') THEN COALESCE(?8, width_cm) ELSE width_cm END, \
            height_cm = CASE WHEN status IN ('CREATED', 'ORIGIN_WAREHOUSE') THEN COALESCE(?9, height_cm) ELSE height_cm END, \
            fragile = CASE WHEN status IN ('CREATED', 'ORIGIN_WAREHOUSE') THEN COALESCE(?10, fragile) ELSE fragile END, \
            has_battery = CASE WHEN status IN ('CREATED', 'ORIGIN_WAREHOUSE') THEN COALESCE(?11, has_battery) ELSE has_battery END, \
            is_liquid = CASE WHEN status IN ('CREATED', 'ORIGIN_WAREHOUSE') THEN COALESCE(?12, is_liquid) ELSE is_liquid END, \
            country_from = CASE WHEN status IN ('CREATED', 'ORIGIN_WAREHOUSE') THEN COALESCE(?13, country_from) ELSE country_from END, \
            delivery_type = CASE WHEN status IN ('CREATED', 'ORIGIN_WAREHOUSE') THEN COALESCE(?14, delivery_type) ELSE delivery_type END, \
            send_date = CASE WHEN status IN ('CREATED', 'ORIGIN_WAREHOUSE') THEN COALESCE(?15, send_date) ELSE send_date END, \
            expected_delivery_date = CASE WHEN status IN ('CREATED', 'ORIGIN_WAREHOUSE') THEN COALESCE(?16, expected_delivery_date) ELSE expected_delivery_date END, \
            updated_at = ?17 \
        WHERE track_code = ?18 AND owner_id = ?19",
    )
    .bind(data.product_name)
    .bind(data.category)
    .bind(data.description)
    .bind(data.quantity)
    .bind(data.unit_price_usd)
    .bind(data.weight_kg)
    .bind(data.length_cm)
    .bind(data.width_cm)
    .bind(data.height_cm)
    .bind(data.fragile)
    .bind(data.has_battery)
    .bind(data.is_liquid)
    .bind(data.country_from)
    .bind(data.delivery_type)
    .bind(data.send_date)
    .bind(data.expected_delivery_date)
    .bind(now)
    .bind(track_code)
    .bind(owner_id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Shipment {track_code} not found"
        )));
    }
    find_by_track_code(pool, track_code)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Shipment {track_code} not found")))
}

/// Apply a status change to one shipment
///
/// Terminal rows are excluded in-statement; zero rows affected means the
/// shipment is missing or already terminal — the caller disambiguates.
/// `arrival_date` is written only when a timestamp is supplied.
pub async fn update_status(
    pool: &SqlitePool,
    track_code: &str,
    status: ShipmentStatus,
    arrival_date: Option<i64>,
) -> RepoResult<u64> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE shipment SET status = ?1, arrival_date = COALESCE(?2, arrival_date), updated_at = ?3 WHERE track_code = ?4 AND status NOT IN ('COMPLETED', 'CANCELLED')",
    )
    .bind(status)
    .bind(arrival_date)
    .bind(now)
    .bind(track_code)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected())
}

/// Bulk status change inside one transaction
///
/// Codes that match no row (or a terminal row) are skipped; a storage
/// failure rolls the whole batch back.
pub async fn bulk_update_status(
    pool: &SqlitePool,
    track_codes: &[String],
    status: ShipmentStatus,
    arrival_date: Option<i64>,
) -> RepoResult<BulkUpdateOutcome> {
    if track_codes.is_empty() {
        return Ok(BulkUpdateOutcome {
            updated_count: 0,
            updated_codes: Vec::new(),
        });
    }

    let placeholders = vec!["?"; track_codes.len()].join(", ");
    let mut tx = pool.begin().await?;

    let select_sql = format!(
        "SELECT track_code FROM shipment WHERE track_code IN ({placeholders}) AND status NOT IN ('COMPLETED', 'CANCELLED')"
    );
    let mut select = sqlx::query_scalar::<_, String>(&select_sql);
    for code in track_codes {
        select = select.bind(code);
    }
    let matched: Vec<String> = select.fetch_all(&mut *tx).await?;

    if matched.is_empty() {
        tx.commit().await?;
        return Ok(BulkUpdateOutcome {
            updated_count: 0,
            updated_codes: Vec::new(),
        });
    }

    let now = shared::util::now_millis();
    let matched_placeholders = vec!["?"; matched.len()].join(", ");
    let update_sql = format!(
        "UPDATE shipment SET status = ?, arrival_date = COALESCE(?, arrival_date), updated_at = ? WHERE track_code IN ({matched_placeholders})"
    );
    let mut update = sqlx::query(&update_sql)
        .bind(status)
        .bind(arrival_date)
        .bind(now);
    for code in &matched {
        update = update.bind(code);
    }
    update.execute(&mut *tx).await?;

    tx.commit().await?;

    Ok(BulkUpdateOutcome {
        updated_count: matched.len(),
        updated_codes: matched,
    })
}

pub async fn update_door_delivery(
    pool: &SqlitePool,
    track_code: &str,
    status: DoorDeliveryStatus,
) -> RepoResult<Shipment> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE shipment SET door_delivery_status = ?1, updated_at = ?2 WHERE track_code = ?3",
    )
    .bind(status)
    .bind(now)
    .bind(track_code)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Shipment {track_code} not found"
        )));
    }
    find_by_track_code(pool, track_code)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Shipment {track_code} not found")))
}

/// Substring search on track code, name or description, newest first
pub async fn search(
    pool: &SqlitePool,
    term: &str,
    owner_id: Option<i64>,
) -> RepoResult<Vec<Shipment>> {
    let pattern = format!("%{term}%");
    let shipments = match owner_id {
        Some(oid) => {
            let sql = format!(
                "{SHIPMENT_SELECT} WHERE owner_id = ?2 AND (track_code LIKE ?1 OR product_name LIKE ?1 OR description LIKE ?1) ORDER BY created_at DESC"
            );
            sqlx::query_as::<_, Shipment>(&sql)
                .bind(&pattern)
                .bind(oid)
                .fetch_all(pool)
                .await?
        }
        None => {
            let sql = format!(
                "{SHIPMENT_SELECT} WHERE track_code LIKE ?1 OR product_name LIKE ?1 OR description LIKE ?1 ORDER BY created_at DESC"
            );
            sqlx::query_as::<_, Shipment>(&sql)
                .bind(&pattern)
                .fetch_all(pool)
                .await?
        }
    };
    Ok(shipments)
}

/// Shipments created within `[start, end)`, optionally filtered by status
pub async fn find_by_created_range(
    pool: &SqlitePool,
    start_millis: i64,
    end_millis: i64,
    status: Option<ShipmentStatus>,
) -> RepoResult<Vec<Shipment>> {
    let shipments = match status {
        Some(s) => {
            let sql = format!(
                "{SHIPMENT_SELECT} WHERE created_at >= ? AND created_at < ? AND status = ? ORDER BY created_at DESC"
            );
            sqlx::query_as::<_, Shipment>(&sql)
                .bind(start_millis)
                .bind(end_millis)
                .bind(s)
                .fetch_all(pool)
                .await?
        }
        None => {
            let sql = format!(
                "{SHIPMENT_SELECT} WHERE created_at >= ? AND created_at < ? ORDER BY created_at DESC"
            );
            sqlx::query_as::<_, Shipment>(&sql)
                .bind(start_millis)
                .bind(end_millis)
                .fetch_all(pool)
                .await?
        }
    };
    Ok(shipments)
}

/// Track codes of shipments dispatched within `[start, end)`
pub async fn find_codes_by_send_date(
    pool: &SqlitePool,
    start_millis: i64,
    end_millis: i64,
) -> RepoResult<Vec<String>> {
    let codes = sqlx::query_scalar::<_, String>(
        "SELECT track_code FROM shipment WHERE send_date >= ? AND send_date < ? ORDER BY created_at DESC",
    )
    .bind(start_millis)
    .bind(end_millis)
    .fetch_all(pool)
    .await?;
    Ok(codes)
}

/// Shipment joined with its owner, for admin detail views
pub async fn find_detailed(pool: &SqlitePool, track_code: &str) -> RepoResult<Option<ShipmentDetail>> {
    let detail = sqlx::query_as::<_, ShipmentDetail>(
        "SELECT s.id, s.track_code, s.owner_id, s.product_name, s.category, s.description, s.quantity, s.unit_price_usd, s.total_value_usd, s.weight_kg, s.status, s.arrival_date, s.created_at, s.updated_at, o.account_id AS owner_account_id, o.full_name AS owner_name, o.phone AS owner_phone, o.region AS owner_region FROM shipment s JOIN owner o ON s.owner_id = o.id WHERE s.track_code = ?",
    )
    .bind(track_code)
    .fetch_optional(pool)
    .await?;
    Ok(detail)
}

/// Delivery statistics over one creation window
///
/// `pending` is an explicit status list, not a subtraction — cancelled and
/// completed shipments count toward `total` only.
pub async fn delivery_statistics(
    pool: &SqlitePool,
    start_millis: i64,
    end_millis: i64,
) -> RepoResult<DeliveryStats> {
    let stats = sqlx::query_as::<_, DeliveryStats>(
        "SELECT COUNT(*) AS total, \
            COALESCE(SUM(CASE WHEN status = 'DELIVERED' THEN 1 ELSE 0 END), 0) AS delivered, \
            COALESCE(SUM(CASE WHEN status = 'DESTINATION_WAREHOUSE' THEN 1 ELSE 0 END), 0) AS arrived, \
            COALESCE(SUM(CASE WHEN status = 'IN_TRANSIT' THEN 1 ELSE 0 END), 0) AS in_transit, \
            COALESCE(SUM(CASE WHEN status IN ('CREATED', 'ORIGIN_WAREHOUSE', 'READY_FOR_PICKUP', 'PROBLEM') THEN 1 ELSE 0 END), 0) AS pending \
        FROM shipment WHERE created_at >= ? AND created_at < ?",
    )
    .bind(start_millis)
    .bind(end_millis)
    .fetch_one(pool)
    .await?;
    Ok(stats)
}

/// Financial totals over one creation window
pub async fn financial_totals(
    pool: &SqlitePool,
    start_millis: i64,
    end_millis: i64,
) -> RepoResult<FinancialTotals> {
    let totals = sqlx::query_as::<_, FinancialTotals>(
        "SELECT COALESCE(SUM(total_value_usd), 0.0) AS total_value, \
            COALESCE(SUM(quantity), 0) AS total_quantity, \
            COUNT(id) AS shipment_count \
        FROM shipment WHERE created_at >= ? AND created_at < ?",
    )
    .bind(start_millis)
    .bind(end_millis)
    .fetch_one(pool)
    .await?;
    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::memory_pool;
    use shared::models::{Category, ShipmentDraft};

    async fn seed_owner(pool: &SqlitePool, account_id: i64) -> i64 {
        sqlx::query("INSERT INTO owner (account_id, language, role, created_at) VALUES (?, 'ru', 'client', 0)")
            .bind(account_id)
            .execute(pool)
            .await
            .unwrap();
        sqlx::query_scalar::<_, i64>("SELECT id FROM owner WHERE account_id = ?")
            .bind(account_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    fn shipment_create(track_code: &str, owner_id: i64) -> ShipmentCreate {
        ShipmentCreate {
            track_code: track_code.into(),
            owner_id,
            fields: ShipmentDraft {
                product_name: Some("Phone".into()),
                category: Some(Category::Electronics),
                quantity: Some(3),
                unit_price_usd: Some(10.0),
                weight_kg: Some(0.5),
                ..ShipmentDraft::default()
            },
        }
    }

    async fn force_status(pool: &SqlitePool, track_code: &str, status: &str) {
        sqlx::query("UPDATE shipment SET status = ? WHERE track_code = ?")
            .bind(status)
            .bind(track_code)
            .execute(pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_computes_total_value() {
        let pool = memory_pool().await;
        let owner = seed_owner(&pool, 1).await;
        let s = create(&pool, shipment_create("EL2501010001ELAAAA", owner))
            .await
            .unwrap();
        assert_eq!(s.status, ShipmentStatus::Created);
        assert_eq!(s.quantity, 3);
        assert_eq!(s.total_value_usd, 30.0);
        assert!(s.arrival_date.is_none());
        assert_eq!(s.created_at, s.updated_at);
    }

    #[tokio::test]
    async fn test_create_duplicate_track_code_rejected() {
        let pool = memory_pool().await;
        let owner = seed_owner(&pool, 1).await;
        create(&pool, shipment_create("EL2501010001ELAAAA", owner))
            .await
            .unwrap();
        let err = create(&pool, shipment_create("EL2501010001ELAAAA", owner))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_impossible_values() {
        let pool = memory_pool().await;
        let owner = seed_owner(&pool, 1).await;

        let mut bad = shipment_create("EL2501010001ELBBBB", owner);
        bad.fields.quantity = Some(0);
        assert!(matches!(
            create(&pool, bad).await.unwrap_err(),
            RepoError::Validation(_)
        ));

        let mut bad = shipment_create("EL2501010001ELCCCC", owner);
        bad.fields.unit_price_usd = Some(-1.0);
        assert!(matches!(
            create(&pool, bad).await.unwrap_err(),
            RepoError::Validation(_)
        ));

        let mut bad = shipment_create("EL2501010001ELDDDD", owner);
        bad.fields.weight_kg = Some(0.0);
        assert!(matches!(
            create(&pool, bad).await.unwrap_err(),
            RepoError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_update_recomputes_total_from_either_input() {
        let pool = memory_pool().await;
        let owner = seed_owner(&pool, 1).await;
        create(&pool, shipment_create("EL2501010001ELAAAA", owner))
            .await
            .unwrap();

        let s = update_fields(
            &pool,
            "EL2501010001ELAAAA",
            ShipmentUpdate {
                quantity: Some(5),
                ..ShipmentUpdate::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(s.total_value_usd, 50.0);

        let s = update_fields(
            &pool,
            "EL2501010001ELAAAA",
            ShipmentUpdate {
                unit_price_usd: Some(2.5),
                ..ShipmentUpdate::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(s.total_value_usd, 12.5);
    }

    #[tokio::test]
    async fn test_empty_patch_refreshes_only_updated_at() {
        let pool = memory_pool().await;
        let owner = seed_owner(&pool, 1).await;
        let before = create(&pool, shipment_create("EL2501010001ELAAAA", owner))
            .await
            .unwrap();
        // Pin updated_at in the past so the refresh is observable
        sqlx::query("UPDATE shipment SET updated_at = 1000 WHERE track_code = ?")
            .bind("EL2501010001ELAAAA")
            .execute(&pool)
            .await
            .unwrap();

        let after = update_fields(&pool, "EL2501010001ELAAAA", ShipmentUpdate::default())
            .await
            .unwrap();

        assert!(after.updated_at > 1000);
        assert_eq!(after.product_name, before.product_name);
        assert_eq!(after.quantity, before.quantity);
        assert_eq!(after.unit_price_usd, before.unit_price_usd);
        assert_eq!(after.total_value_usd, before.total_value_usd);
        assert_eq!(after.status, before.status);
    }

    #[tokio::test]
    async fn test_update_missing_shipment_is_not_found() {
        let pool = memory_pool().await;
        let err = update_fields(&pool, "NOPE", ShipmentUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_owner_update_filters_billing_fields_in_flight() {
        let pool = memory_pool().await;
        let owner = seed_owner(&pool, 1).await;
        create(&pool, shipment_create("EL2501010001ELAAAA", owner))
            .await
            .unwrap();
        force_status(&pool, "EL2501010001ELAAAA", "IN_TRANSIT").await;

        let s = update_fields_for_owner(
            &pool,
            "EL2501010001ELAAAA",
            owner,
            ShipmentUpdate {
                product_name: Some("Renamed".into()),
                weight_kg: Some(9.9),
                quantity: Some(7),
                ..ShipmentUpdate::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(s.product_name.as_deref(), Some("Renamed"));
        assert_eq!(s.weight_kg, Some(0.5));
        assert_eq!(s.quantity, 3);
        assert_eq!(s.total_value_usd, 30.0);
    }

    #[tokio::test]
    async fn test_owner_update_applies_everything_before_dispatch() {
        let pool = memory_pool().await;
        let owner = seed_owner(&pool, 1).await;
        create(&pool, shipment_create("EL2501010001ELAAAA", owner))
            .await
            .unwrap();

        let s = update_fields_for_owner(
            &pool,
            "EL2501010001ELAAAA",
            owner,
            ShipmentUpdate {
                quantity: Some(4),
                unit_price_usd: Some(2.0),
                ..ShipmentUpdate::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(s.quantity, 4);
        assert_eq!(s.total_value_usd, 8.0);
    }

    #[tokio::test]
    async fn test_owner_update_scoped_to_owner() {
        let pool = memory_pool().await;
        let owner = seed_owner(&pool, 1).await;
        let stranger = seed_owner(&pool, 2).await;
        create(&pool, shipment_create("EL2501010001ELAAAA", owner))
            .await
            .unwrap();

        let err = update_fields_for_owner(
            &pool,
            "EL2501010001ELAAAA",
            stranger,
            ShipmentUpdate {
                product_name: Some("Hijack".into()),
                ..ShipmentUpdate::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_bulk_update_skips_missing_codes() {
        let pool = memory_pool().await;
        let owner = seed_owner(&pool, 1).await;
        create(&pool, shipment_create("EL2501010001ELAAAA", owner))
            .await
            .unwrap();
        create(&pool, shipment_create("EL2501010001ELBBBB", owner))
            .await
            .unwrap();

        let outcome = bulk_update_status(
            &pool,
            &[
                "EL2501010001ELAAAA".to_string(),
                "EL2501010001ELBBBB".to_string(),
                "EL2501010001ELXXXX".to_string(),
            ],
            ShipmentStatus::Delivered,
            None,
        )
        .await
        .unwrap();

        assert_eq!(outcome.updated_count, 2);
        assert_eq!(outcome.updated_codes.len(), 2);
        assert!(!outcome
            .updated_codes
            .contains(&"EL2501010001ELXXXX".to_string()));

        let s = find_by_track_code(&pool, "EL2501010001ELAAAA")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(s.status, ShipmentStatus::Delivered);
    }

    #[tokio::test]
    async fn test_bulk_update_skips_terminal_rows() {
        let pool = memory_pool().await;
        let owner = seed_owner(&pool, 1).await;
        create(&pool, shipment_create("EL2501010001ELAAAA", owner))
            .await
            .unwrap();
        create(&pool, shipment_create("EL2501010001ELBBBB", owner))
            .await
            .unwrap();
        force_status(&pool, "EL2501010001ELBBBB", "COMPLETED").await;

        let outcome = bulk_update_status(
            &pool,
            &[
                "EL2501010001ELAAAA".to_string(),
                "EL2501010001ELBBBB".to_string(),
            ],
            ShipmentStatus::InTransit,
            None,
        )
        .await
        .unwrap();

        assert_eq!(outcome.updated_count, 1);
        assert_eq!(outcome.updated_codes, vec!["EL2501010001ELAAAA".to_string()]);
    }

    #[tokio::test]
    async fn test_search_matches_code_name_description() {
        let pool = memory_pool().await;
        let owner = seed_owner(&pool, 1).await;
        let mut a = shipment_create("EL2501010001ELAAAA", owner);
        a.fields.product_name = Some("Winter jacket".into());
        create(&pool, a).await.unwrap();
        let mut b = shipment_create("CL2501010001CLBBBB", owner);
        b.fields.product_name = Some("Phone case".into());
        b.fields.description = Some("black, magnetic".into());
        create(&pool, b).await.unwrap();

        let by_code = search(&pool, "CL2501", None).await.unwrap();
        assert_eq!(by_code.len(), 1);

        // Case-insensitive name match
        let by_name = search(&pool, "JACKET", None).await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].track_code, "EL2501010001ELAAAA");

        let by_desc = search(&pool, "magnetic", None).await.unwrap();
        assert_eq!(by_desc.len(), 1);

        let none = search(&pool, "zzz", None).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_search_scoped_to_owner() {
        let pool = memory_pool().await;
        let alice = seed_owner(&pool, 1).await;
        let bob = seed_owner(&pool, 2).await;
        create(&pool, shipment_create("EL2501010001ELAAAA", alice))
            .await
            .unwrap();
        create(&pool, shipment_create("EL2501010002ELBBBB", bob))
            .await
            .unwrap();

        let scoped = search(&pool, "EL2501", Some(alice)).await.unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].owner_id, alice);
    }

    #[tokio::test]
    async fn test_find_by_owner_paginates_newest_first() {
        let pool = memory_pool().await;
        let owner = seed_owner(&pool, 1).await;
        for (i, code) in ["EL2501010001ELAAAA", "EL2501010001ELBBBB", "EL2501010001ELCCCC"]
            .iter()
            .enumerate()
        {
            create(&pool, shipment_create(code, owner)).await.unwrap();
            // Spread creation times so ordering is deterministic
            sqlx::query("UPDATE shipment SET created_at = ? WHERE track_code = ?")
                .bind((i as i64 + 1) * 1000)
                .bind(code)
                .execute(&pool)
                .await
                .unwrap();
        }

        let page = find_by_owner(&pool, owner, 2, 0).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].track_code, "EL2501010001ELCCCC");

        let rest = find_by_owner(&pool, owner, 2, 2).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].track_code, "EL2501010001ELAAAA");
    }

    #[tokio::test]
    async fn test_created_range_half_open() {
        let pool = memory_pool().await;
        let owner = seed_owner(&pool, 1).await;
        for (code, ts) in [
            ("EL2501010001ELAAAA", 1000_i64),
            ("EL2501010001ELBBBB", 2000),
            ("EL2501010001ELCCCC", 3000),
        ] {
            create(&pool, shipment_create(code, owner)).await.unwrap();
            sqlx::query("UPDATE shipment SET created_at = ? WHERE track_code = ?")
                .bind(ts)
                .bind(code)
                .execute(&pool)
                .await
                .unwrap();
        }

        let window = find_by_created_range(&pool, 1000, 3000, None).await.unwrap();
        assert_eq!(window.len(), 2);

        force_status(&pool, "EL2501010001ELAAAA", "IN_TRANSIT").await;
        let filtered =
            find_by_created_range(&pool, 1000, 3000, Some(ShipmentStatus::InTransit))
                .await
                .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].track_code, "EL2501010001ELAAAA");
    }

    #[tokio::test]
    async fn test_find_detailed_joins_owner() {
        let pool = memory_pool().await;
        sqlx::query(
            "INSERT INTO owner (account_id, full_name, phone, language, role, created_at) VALUES (7, 'Bob', '+992', 'ru', 'client', 0)",
        )
        .execute(&pool)
        .await
        .unwrap();
        let owner_id = sqlx::query_scalar::<_, i64>("SELECT id FROM owner WHERE account_id = 7")
            .fetch_one(&pool)
            .await
            .unwrap();
        create(&pool, shipment_create("EL2501010007ELAAAA", owner_id))
            .await
            .unwrap();

        let detail = find_detailed(&pool, "EL2501010007ELAAAA")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(detail.owner_account_id, 7);
        assert_eq!(detail.owner_name.as_deref(), Some("Bob"));

        assert!(find_detailed(&pool, "NOPE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delivery_statistics_explicit_pending() {
        let pool = memory_pool().await;
        let owner = seed_owner(&pool, 1).await;
        let codes: Vec<String> = (0..10).map(|i| format!("EL2501010001EL{i:04}")).collect();
        for code in &codes {
            create(&pool, shipment_create(code, owner)).await.unwrap();
            sqlx::query("UPDATE shipment SET created_at = 5000 WHERE track_code = ?")
                .bind(code)
                .execute(&pool)
                .await
                .unwrap();
        }
        for code in &codes[0..4] {
            force_status(&pool, code, "DELIVERED").await;
        }
        for code in &codes[4..6] {
            force_status(&pool, code, "DESTINATION_WAREHOUSE").await;
        }
        force_status(&pool, &codes[6], "IN_TRANSIT").await;
        // 7..10 stay CREATED

        let stats = delivery_statistics(&pool, 0, 10_000).await.unwrap();
        assert_eq!(stats.total, 10);
        assert_eq!(stats.delivered, 4);
        assert_eq!(stats.arrived, 2);
        assert_eq!(stats.in_transit, 1);
        assert_eq!(stats.pending, 3);
    }

    #[tokio::test]
    async fn test_delivery_statistics_pending_excludes_cancelled() {
        let pool = memory_pool().await;
        let owner = seed_owner(&pool, 1).await;
        for code in ["EL2501010001ELAAAA", "EL2501010001ELBBBB"] {
            create(&pool, shipment_create(code, owner)).await.unwrap();
            sqlx::query("UPDATE shipment SET created_at = 5000 WHERE track_code = ?")
                .bind(code)
                .execute(&pool)
                .await
                .unwrap();
        }
        force_status(&pool, "EL2501010001ELBBBB", "CANCELLED").await;

        let stats = delivery_statistics(&pool, 0, 10_000).await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.pending, 1);
    }

    #[tokio::test]
    async fn test_financial_totals_empty_window() {
        let pool = memory_pool().await;
        let totals = financial_totals(&pool, 0, 10_000).await.unwrap();
        assert_eq!(totals.shipment_count, 0);
        assert_eq!(totals.total_quantity, 0);
        assert_eq!(totals.total_value, 0.0);
    }
}
