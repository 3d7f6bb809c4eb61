//! Owner Model

use serde::{Deserialize, Serialize};

/// Owner role
///
/// Assigned once at creation from the admin roster; this core never changes
/// it afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum Role {
    #[default]
    Client,
    AdminOrigin,
    AdminDestination,
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Role::AdminOrigin | Role::AdminDestination)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::AdminOrigin => "admin_origin",
            Role::AdminDestination => "admin_destination",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Role::Client),
            "admin_origin" => Ok(Role::AdminOrigin),
            "admin_destination" => Ok(Role::AdminDestination),
            _ => Err(()),
        }
    }
}

/// Owner entity (registered actor — end customer or administrator)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Owner {
    pub id: i64,
    /// Externally-assigned numeric account id (unique, immutable)
    pub account_id: i64,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub region: Option<String>,
    /// Language preference tag, e.g. "ru" or "tj"
    pub language: String,
    pub role: Role,
    pub created_at: i64,
}

/// Create owner payload
///
/// The role is not part of the payload — it is resolved from the admin
/// roster at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerCreate {
    pub account_id: i64,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub region: Option<String>,
    pub language: Option<String>,
}

/// Update owner profile payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwnerUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub region: Option<String>,
    pub language: Option<String>,
}
