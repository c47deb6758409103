// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authenticated principal representation.

use serde::Serialize;
use utoipa::ToSchema;

use super::{roles::Role, AuthError};
use crate::accounts::UserDetails;

/// Authenticated user information reconstructed for each request.
///
/// This is the primary type used by handlers to represent the caller.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Username (token subject)
    pub username: String,

    /// User's role
    pub role: Role,

    /// Granted authorities (`ROLE_<ROLE>`)
    pub authorities: Vec<String>,
}

impl AuthenticatedUser {
    /// Build the principal from the account details loaded for a token subject.
    pub fn from_details(details: UserDetails) -> Self {
        Self {
            username: details.username,
            role: details.role,
            authorities: details.authorities,
        }
    }

    /// Check if the user has the required role.
    pub fn has_role(&self, required: Role) -> bool {
        self.authorities
            .iter()
            .filter_map(|authority| Role::from_authority(authority))
            .any(|granted| granted.has_privilege(required))
    }

    /// Capability check used by route guards.
    pub fn require(&self, required: Role) -> Result<(), AuthError> {
        if self.has_role(required) {
            Ok(())
        } else {
            Err(AuthError::InsufficientPermissions)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role) -> AuthenticatedUser {
        AuthenticatedUser::from_details(UserDetails {
            username: "alice".to_string(),
            password_hash: "hash".to_string(),
            role,
            authorities: vec![role.authority()],
        })
    }

    #[test]
    fn from_details_copies_identity() {
        let user = principal(Role::User);
        assert_eq!(user.username, "alice");
        assert_eq!(user.authorities, vec!["ROLE_USER".to_string()]);
    }

    #[test]
    fn admin_passes_every_guard() {
        let admin = principal(Role::Admin);
        assert!(admin.has_role(Role::Admin));
        assert!(admin.require(Role::Admin).is_ok());
        assert!(admin.require(Role::User).is_ok());
    }

    #[test]
    fn user_fails_admin_guard() {
        let user = principal(Role::User);
        assert!(!user.has_role(Role::Admin));
        assert!(user.require(Role::User).is_ok());
        assert!(matches!(
            user.require(Role::Admin),
            Err(AuthError::InsufficientPermissions)
        ));
    }

    #[test]
    fn unknown_authorities_grant_nothing() {
        let mut user = principal(Role::User);
        user.authorities = vec!["SCOPE_read".to_string()];
        assert!(!user.has_role(Role::User));
    }
}
