// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Salted one-way password hashing (Argon2id, PHC string format).

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hashes raw passwords for storage and verifies them at login.
#[derive(Default)]
pub struct PasswordEncoder {
    argon2: Argon2<'static>,
}

impl PasswordEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash a raw password with a fresh random salt.
    pub fn encode(&self, raw_password: &str) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self.argon2.hash_password(raw_password.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    /// Check a raw password against a stored hash.
    ///
    /// A stored hash that cannot be parsed never matches.
    pub fn matches(&self, raw_password: &str, stored_hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(stored_hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        self.argon2
            .verify_password(raw_password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}
