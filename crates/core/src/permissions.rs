//! Permission names used by the role-based access checks.
//!
//! These must match the seed data in `20260301000002_create_rbac_tables.sql`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A single named capability granted to a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "admin:access")]
    AdminAccess,
    #[serde(rename = "templates:read")]
    TemplatesRead,
    #[serde(rename = "templates:write")]
    TemplatesWrite,
    #[serde(rename = "templates:delete")]
    TemplatesDelete,
    #[serde(rename = "source_maps:read")]
    SourceMapsRead,
    #[serde(rename = "source_maps:write")]
    SourceMapsWrite,
    #[serde(rename = "source_maps:delete")]
    SourceMapsDelete,
    #[serde(rename = "audit:read")]
    AuditRead,
    #[serde(rename = "users:read")]
    UsersRead,
    #[serde(rename = "users:write")]
    UsersWrite,
    #[serde(rename = "roles:read")]
    RolesRead,
    #[serde(rename = "roles:write")]
    RolesWrite,
}

/// Every known permission, in declaration order.
pub const ALL_PERMISSIONS: &[Permission] = &[
    Permission::AdminAccess,
    Permission::TemplatesRead,
    Permission::TemplatesWrite,
    Permission::TemplatesDelete,
    Permission::SourceMapsRead,
    Permission::SourceMapsWrite,
    Permission::SourceMapsDelete,
    Permission::AuditRead,
    Permission::UsersRead,
    Permission::UsersWrite,
    Permission::RolesRead,
    Permission::RolesWrite,
];

impl Permission {
    /// The canonical `resource:action` name stored in the `permissions` table.
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::AdminAccess => "admin:access",
            Permission::TemplatesRead => "templates:read",
            Permission::TemplatesWrite => "templates:write",
            Permission::TemplatesDelete => "templates:delete",
            Permission::SourceMapsRead => "source_maps:read",
            Permission::SourceMapsWrite => "source_maps:write",
            Permission::SourceMapsDelete => "source_maps:delete",
            Permission::AuditRead => "audit:read",
            Permission::UsersRead => "users:read",
            Permission::UsersWrite => "users:write",
            Permission::RolesRead => "roles:read",
            Permission::RolesWrite => "roles:write",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a permission name from storage is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown permission: {0}")]
pub struct UnknownPermission(pub String);

impl FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_PERMISSIONS
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPermission(s.to_string()))
    }
}
