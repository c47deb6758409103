// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Backends implementing the account and catalog store interfaces.
//!
//! - [`ShopDatabase`]: embedded redb file, the production backend
//! - [`InMemoryStore`]: process-local maps, used by tests and `STORE_BACKEND=memory`
//!
//! Both guarantee that a catalog read-modify-write is atomic with respect
//! to every other write.

use std::sync::Arc;

use crate::accounts::CredentialStore;
use crate::catalog::CatalogStore;
use crate::config::{AppConfig, StoreBackend};

pub mod database;
pub mod error;
pub mod memory;

pub use database::ShopDatabase;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryStore;

/// A backend that can serve both services.
pub trait ShopStore: CredentialStore + CatalogStore {
    /// Short backend name for logs and the readiness probe.
    fn backend(&self) -> &'static str;

    fn health_check(&self) -> StoreResult<()>;
}

impl ShopStore for ShopDatabase {
    fn backend(&self) -> &'static str {
        "redb"
    }

    fn health_check(&self) -> StoreResult<()> {
        ShopDatabase::health_check(self)
    }
}

impl ShopStore for InMemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Open the backend selected by `config`.
pub fn open(config: &AppConfig) -> StoreResult<Arc<dyn ShopStore>> {
    match config.store_backend {
        StoreBackend::Redb => Ok(Arc::new(ShopDatabase::open(&config.database_path)?)),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on shutdown");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}
