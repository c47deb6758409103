// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Prefix applied to a role name to form its granted authority.
pub const AUTHORITY_PREFIX: &str = "ROLE_";

/// User roles for authorization.
///
/// ## Role Hierarchy
///
/// - `Admin` - Catalog management (create, update, delete, restock) plus
///   everything a user can do
/// - `User` - Browse, search and purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Regular shopper
    User,
    /// Catalog administrator
    Admin,
}

impl Role {
    /// Check if this role has at least the privileges of the required role.
    pub fn has_privilege(&self, required: Role) -> bool {
        match (self, required) {
            (Role::Admin, _) => true,
            (Role::User, Role::User) => true,
            _ => false,
        }
    }

    /// Upper-case role name as exposed over the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    /// The single granted authority for this role, e.g. `ROLE_ADMIN`.
    pub fn authority(&self) -> String {
        format!("{AUTHORITY_PREFIX}{}", self.as_str())
    }

    /// Parse role from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Role> {
        match s.to_ascii_uppercase().as_str() {
            "USER" => Some(Role::User),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Inverse of [`Role::authority`].
    pub fn from_authority(authority: &str) -> Option<Role> {
        authority.strip_prefix(AUTHORITY_PREFIX).and_then(Role::parse)
    }
}

impl Default for Role {
    /// Registrations without an explicit role get least privilege.
    fn default() -> Self {
        Role::User
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
