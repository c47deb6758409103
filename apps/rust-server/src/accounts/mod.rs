// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Accounts
//!
//! User records, the credential store interface and the account service
//! (registration, login, per-request principal loading).
//!
//! Usernames and emails are each globally unique. Accounts are immutable
//! once created.

use serde::{Deserialize, Serialize};

use crate::auth::Role;
use crate::storage::StoreError;

pub mod service;

pub use service::AccountService;

/// Store-assigned user identifier.
pub type UserId = u64;

/// A persisted account. Holds the password hash, never the raw password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// An account about to be inserted (no id yet).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Registration input as received from the API layer.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
}

/// What the request guard needs to rebuild a principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDetails {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    /// Exactly one entry: the role's authority (`ROLE_USER` / `ROLE_ADMIN`).
    pub authorities: Vec<String>,
}

impl From<User> for UserDetails {
    fn from(user: User) -> Self {
        Self {
            authorities: vec![user.role.authority()],
            username: user.username,
            password_hash: user.password_hash,
            role: user.role,
        }
    }
}

/// Errors raised by the account service and credential stores.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("Username already taken")]
    DuplicateUsername,
    #[error("Email already registered")]
    DuplicateEmail,
    #[error("User not found")]
    UserNotFound,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Failed to hash password: {0}")]
    PasswordHash(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Persistence capability required by [`AccountService`].
///
/// `insert_user` must re-check both uniqueness constraints atomically with
/// the write and report violations as [`AccountError::DuplicateUsername`]
/// (checked first) or [`AccountError::DuplicateEmail`].
pub trait CredentialStore: Send + Sync {
    fn exists_by_username(&self, username: &str) -> Result<bool, StoreError>;

    fn exists_by_email(&self, email: &str) -> Result<bool, StoreError>;

    /// Find the user whose username equals `username`, or failing that,
    /// whose email equals `email`.
    fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, StoreError>;

    fn insert_user(&self, user: NewUser) -> Result<User, AccountError>;
}
