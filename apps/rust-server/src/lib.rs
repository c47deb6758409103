// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sweet Shop - Inventory Management Service
//!
//! REST service for a sweets catalog. Users register and log in to obtain a
//! bearer token; any authenticated user can browse, search and purchase,
//! while admins create, update, delete and restock items.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Tokens, password hashing, roles and request guards
//! - `accounts` - User registration and credential checks
//! - `catalog` - Catalog items, search and stock mutations
//! - `storage` - redb and in-memory store backends

pub mod accounts;
pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod money;
pub mod state;
pub mod storage;
pub mod telemetry;
pub mod validation;
