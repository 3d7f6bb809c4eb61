//! Owner Repository

use super::{RepoError, RepoResult};
use crate::config::AdminRoster;
use shared::models::{Owner, OwnerCreate, OwnerUpdate};
use sqlx::SqlitePool;

const OWNER_SELECT: &str =
    "SELECT id, account_id, full_name, phone, region, language, role, created_at FROM owner";

pub async fn find_by_account_id(pool: &SqlitePool, account_id: i64) -> RepoResult<Option<Owner>> {
    let sql = format!("{OWNER_SELECT} WHERE account_id = ?");
    let owner = sqlx::query_as::<_, Owner>(&sql)
        .bind(account_id)
        .fetch_optional(pool)
        .await?;
    Ok(owner)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Owner>> {
    let sql = format!("{OWNER_SELECT} WHERE id = ?");
    let owner = sqlx::query_as::<_, Owner>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(owner)
}

/// Create a new owner
///
/// The role is resolved from the roster passed in, never from ambient
/// process state.
pub async fn create(pool: &SqlitePool, data: OwnerCreate, roster: &AdminRoster) -> RepoResult<Owner> {
    if find_by_account_id(pool, data.account_id).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Owner with account id {} already exists",
            data.account_id
        )));
    }

    let role = roster.role_for(data.account_id);
    let language = data.language.unwrap_or_else(|| "ru".to_string());
    let now = shared::util::now_millis();

    sqlx::query(
        "INSERT INTO owner (account_id, full_name, phone, region, language, role, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(data.account_id)
    .bind(data.full_name)
    .bind(data.phone)
    .bind(data.region)
    .bind(language)
    .bind(role)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_account_id(pool, data.account_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create owner".into()))
}

pub async fn update_profile(
    pool: &SqlitePool,
    account_id: i64,
    data: OwnerUpdate,
) -> RepoResult<Owner> {
    let rows = sqlx::query(
        "UPDATE owner SET full_name = COALESCE(?1, full_name), phone = COALESCE(?2, phone), region = COALESCE(?3, region), language = COALESCE(?4, language) WHERE account_id = ?5",
    )
    .bind(data.full_name)
    .bind(data.phone)
    .bind(data.region)
    .bind(data.language)
    .bind(account_id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Owner {account_id} not found")));
    }
    find_by_account_id(pool, account_id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Owner {account_id} not found")))
}

pub async fn update_language(
    pool: &SqlitePool,
    account_id: i64,
    language: &str,
) -> RepoResult<Owner> {
    update_profile(
        pool,
        account_id,
        OwnerUpdate {
            language: Some(language.to_string()),
            ..OwnerUpdate::default()
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::memory_pool;
    use shared::models::Role;

    fn roster() -> AdminRoster {
        "100:admin_origin,200:admin_destination".parse().unwrap()
    }

    fn owner_create(account_id: i64) -> OwnerCreate {
        OwnerCreate {
            account_id,
            full_name: Some("Alice".into()),
            phone: None,
            region: None,
            language: None,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_role_from_roster() {
        let pool = memory_pool().await;
        let r = roster();

        let client = create(&pool, owner_create(1), &r).await.unwrap();
        assert_eq!(client.role, Role::Client);
        assert_eq!(client.language, "ru");

        let admin = create(&pool, owner_create(100), &r).await.unwrap();
        assert_eq!(admin.role, Role::AdminOrigin);

        let admin = create(&pool, owner_create(200), &r).await.unwrap();
        assert_eq!(admin.role, Role::AdminDestination);
    }

    #[tokio::test]
    async fn test_create_duplicate_account_rejected() {
        let pool = memory_pool().await;
        let r = roster();
        create(&pool, owner_create(1), &r).await.unwrap();
        let err = create(&pool, owner_create(1), &r).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_update_profile_partial() {
        let pool = memory_pool().await;
        let r = roster();
        create(&pool, owner_create(1), &r).await.unwrap();

        let updated = update_profile(
            &pool,
            1,
            OwnerUpdate {
                phone: Some("+992900000000".into()),
                ..OwnerUpdate::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.phone.as_deref(), Some("+992900000000"));
        // Untouched field survives
        assert_eq!(updated.full_name.as_deref(), Some("Alice"));
    }

    #[tokio::test]
    async fn test_update_missing_owner_is_not_found() {
        let pool = memory_pool().await;
        let err = update_language(&pool, 42, "tj").await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }
}
