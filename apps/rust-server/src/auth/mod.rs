// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Stateless bearer-token authentication for the shop API.
//!
//! ## Auth Flow
//!
//! 1. Client registers or logs in via `/api/auth/*` and receives a signed token
//! 2. Client sends `Authorization: Bearer <token>` on every protected call
//! 3. Server:
//!    - Verifies the HS256 signature and expiry (no clock-skew leeway)
//!    - Loads the account named by `sub`
//!    - Derives the caller's authorities from the account's role
//!
//! ## Security
//!
//! - Passwords are stored as salted Argon2 hashes only
//! - Tokens are not stored server-side and cannot be revoked early
//! - Admin routes additionally require `ROLE_ADMIN`

pub mod claims;
pub mod error;
pub mod extractor;
pub mod password;
pub mod roles;
pub mod token;

pub use claims::AuthenticatedUser;
pub use error::AuthError;
pub use extractor::{AdminOnly, Auth};
pub use password::PasswordEncoder;
pub use roles::Role;
pub use token::{TokenClaims, TokenService};
