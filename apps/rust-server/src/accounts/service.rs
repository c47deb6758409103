// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account registration and authentication.

use std::sync::Arc;

use super::{AccountError, CredentialStore, NewUser, Registration, User, UserDetails};
use crate::auth::PasswordEncoder;

pub struct AccountService {
    store: Arc<dyn CredentialStore>,
    passwords: PasswordEncoder,
}

impl AccountService {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            passwords: PasswordEncoder::new(),
        }
    }

    /// Create a new account after uniqueness checks (username first, then
    /// email). The role defaults to `USER`.
    pub fn register(&self, registration: Registration) -> Result<User, AccountError> {
        if self.store.exists_by_username(&registration.username)? {
            return Err(AccountError::DuplicateUsername);
        }
        if self.store.exists_by_email(&registration.email)? {
            return Err(AccountError::DuplicateEmail);
        }

        let password_hash = self
            .passwords
            .encode(&registration.password)
            .map_err(|e| AccountError::PasswordHash(e.to_string()))?;

        let user = self.store.insert_user(NewUser {
            username: registration.username,
            email: registration.email,
            password_hash,
            role: registration.role.unwrap_or_default(),
        })?;

        tracing::info!(
            user_id = user.id,
            username = %user.username,
            role = %user.role,
            "Registered new account"
        );
        Ok(user)
    }

    /// Verify credentials. `username_or_email` is matched against both
    /// columns in a single lookup.
    pub fn authenticate(&self, username_or_email: &str, password: &str) -> Result<User, AccountError> {
        let user = self
            .store
            .find_by_username_or_email(username_or_email, username_or_email)?
            .ok_or(AccountError::UserNotFound)?;

        if !self.passwords.matches(password, &user.password_hash) {
            tracing::warn!(username = %user.username, "Rejected login with wrong password");
            return Err(AccountError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Load the details the request guard needs to rebuild a principal.
    pub fn load_for_authorization(&self, username: &str) -> Result<UserDetails, AccountError> {
        self.store
            .find_by_username_or_email(username, username)?
            .map(UserDetails::from)
            .ok_or(AccountError::UserNotFound)
    }
}
