// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::accounts::AccountService;
use crate::auth::TokenService;
use crate::catalog::CatalogService;
use crate::storage::ShopStore;

/// Shared handler state. Cloning is cheap; every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub catalog: Arc<CatalogService>,
    pub tokens: Arc<TokenService>,
    pub store: Arc<dyn ShopStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn ShopStore>, tokens: TokenService) -> Self {
        Self {
            accounts: Arc::new(AccountService::new(store.clone())),
            catalog: Arc::new(CatalogService::new(store.clone())),
            tokens: Arc::new(tokens),
            store,
        }
    }

    /// State over a fresh in-memory store.
    #[cfg(test)]
    pub(crate) fn in_memory(tokens: TokenService) -> Self {
        Self::new(Arc::new(crate::storage::InMemoryStore::new()), tokens)
    }
}
