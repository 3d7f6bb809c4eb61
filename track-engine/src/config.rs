//! Engine Configuration
//!
//! Explicit configuration passed into the engine at startup. The admin
//! roster drives role assignment at owner creation — it is handed to the
//! creation operation directly rather than queried from a process-wide
//! singleton.

use shared::models::Role;
use std::collections::HashMap;
use std::str::FromStr;

/// Account ids of administrators and their roles
#[derive(Debug, Clone, Default)]
pub struct AdminRoster {
    admins: HashMap<i64, Role>,
}

impl AdminRoster {
    pub fn new(admins: HashMap<i64, Role>) -> Self {
        Self { admins }
    }

    /// Role for an account id; unknown accounts are clients
    pub fn role_for(&self, account_id: i64) -> Role {
        self.admins.get(&account_id).copied().unwrap_or(Role::Client)
    }

    pub fn is_admin(&self, account_id: i64) -> bool {
        self.admins.contains_key(&account_id)
    }

    pub fn len(&self) -> usize {
        self.admins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.admins.is_empty()
    }
}

impl FromStr for AdminRoster {
    type Err = std::convert::Infallible;

    /// Parse `"1929084151:admin_origin,1929084152:admin_destination"`.
    ///
    /// An id without a role defaults to `admin_origin`; malformed entries
    /// are skipped with a warning.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut admins = HashMap::new();
        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (id_part, role) = match part.split_once(':') {
                Some((id, role)) => match Role::from_str(role.trim()) {
                    Ok(role) if role.is_admin() => (id.trim(), role),
                    _ => {
                        tracing::warn!(entry = part, "Skipping admin entry with unknown role");
                        continue;
                    }
                },
                None => (part, Role::AdminOrigin),
            };
            match id_part.parse::<i64>() {
                Ok(id) => {
                    admins.insert(id, role);
                }
                Err(_) => {
                    tracing::warn!(entry = part, "Skipping admin entry with invalid account id");
                }
            }
        }
        Ok(Self { admins })
    }
}

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub database_path: String,
    pub log_level: String,
    pub admins: AdminRoster,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let roster = std::env::var("ADMIN_IDS").unwrap_or_default();
        Self {
            database_path: std::env::var("DB_PATH").unwrap_or_else(|_| "tracking.db".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            // Infallible: malformed entries are skipped, not fatal
            admins: roster.parse().unwrap_or_default(),
        }
    }
}
