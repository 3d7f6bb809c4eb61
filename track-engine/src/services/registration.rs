//! Shipment Registration
//!
//! Creation is a generate → uniqueness-check retry loop: the generator's
//! codes are only probabilistically unique, so a `Duplicate` from the store
//! triggers regeneration.

use crate::db::repository::{shipment, RepoError, RepoResult};
use crate::services::track_code;
use shared::models::{Owner, Shipment, ShipmentCreate, ShipmentDraft};
use sqlx::SqlitePool;

const MAX_CODE_ATTEMPTS: usize = 5;

/// Register one shipment for an owner, allocating a fresh track code
pub async fn register_shipment(
    pool: &SqlitePool,
    owner: &Owner,
    draft: ShipmentDraft,
) -> RepoResult<Shipment> {
    for _ in 0..MAX_CODE_ATTEMPTS {
        let code = track_code::generate(owner.account_id, draft.category);
        match shipment::create(
            pool,
            ShipmentCreate {
                track_code: code,
                owner_id: owner.id,
                fields: draft.clone(),
            },
        )
        .await
        {
            Err(RepoError::Duplicate(_)) => continue,
            other => return other,
        }
    }
    Err(RepoError::Database(format!(
        "Could not allocate a unique track code after {MAX_CODE_ATTEMPTS} attempts"
    )))
}

/// Register a batch of identical shipments (e.g. a warehouse intake of N
/// parcels), each with its own track code
pub async fn register_bulk(
    pool: &SqlitePool,
    owner: &Owner,
    count: usize,
    draft: ShipmentDraft,
) -> RepoResult<Vec<Shipment>> {
    let mut created = Vec::with_capacity(count);
    for _ in 0..count {
        created.push(register_shipment(pool, owner, draft.clone()).await?);
    }
    Ok(created)
}
