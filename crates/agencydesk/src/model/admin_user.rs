//! Admin console accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Record;

/// What an admin may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Full access, including user management.
    Owner,
    /// Content and lead management only.
    #[default]
    Editor,
}

impl std::fmt::Display for AdminRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::Editor => write!(f, "editor"),
        }
    }
}

/// An admin account as stored in `admin_users.csv`.
///
/// `password_hash` never leaves the storage layer; use [`AdminProfile`] for
/// anything user-facing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Login email, lowercased and unique.
    pub email: String,
    /// Encoded password hash.
    pub password_hash: String,
    /// Access level.
    pub role: AdminRole,
    /// Disabled accounts cannot log in.
    pub active: bool,
    /// Most recent successful login.
    pub last_login_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Record for AdminUser {
    const COLLECTION: &'static str = "admin_users";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "email",
        "password_hash",
        "role",
        "active",
        "last_login_at",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }
}

impl AdminUser {
    /// Whether this account can manage other accounts.
    #[must_use]
    pub fn is_active_owner(&self) -> bool {
        self.active && self.role == AdminRole::Owner
    }

    /// The public projection of this account.
    #[must_use]
    pub fn profile(&self) -> AdminProfile {
        AdminProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            active: self.active,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
        }
    }
}

/// An admin account without credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminProfile {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Access level.
    pub role: AdminRole,
    /// Whether the account can log in.
    pub active: bool,
    /// Most recent successful login.
    pub last_login_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl AdminProfile {
    /// CSV header for exports, in struct field order.
    pub const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "email",
        "role",
        "active",
        "last_login_at",
        "created_at",
    ];
}

/// Request to create an admin account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAdminUser {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Plain-text password; hashed before storage.
    pub password: String,
    /// Access level (defaults to editor).
    #[serde(default)]
    pub role: AdminRole,
}

/// Partial update to an admin account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminUserPatch {
    /// New display name.
    pub name: Option<String>,
    /// New login email.
    pub email: Option<String>,
    /// New password.
    pub password: Option<String>,
    /// New access level.
    pub role: Option<AdminRole>,
    /// Enable or disable the account.
    pub active: Option<bool>,
}
