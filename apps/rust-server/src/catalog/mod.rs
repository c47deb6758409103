// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Catalog
//!
//! Catalog items, search criteria, the catalog store interface and the
//! catalog service.
//!
//! ## Invariants
//!
//! - `quantity` is never negative (it is unsigned, and purchase refuses to
//!   go below zero)
//! - `price` is strictly positive
//! - every read-modify-write runs inside one store transaction
//!   ([`CatalogStore::modify_item`])

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::storage::StoreError;

pub mod service;

pub use service::CatalogService;

/// Store-assigned item identifier. Never reused after deletion.
pub type ItemId = u64;

/// A sellable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    pub price: Money,
    pub quantity: u32,
}

/// The mutable fields of an item, already validated by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFields {
    pub name: String,
    pub category: String,
    pub price: Money,
    pub quantity: u32,
}

impl CatalogItem {
    pub fn new(id: ItemId, fields: ItemFields) -> Self {
        Self {
            id,
            name: fields.name,
            category: fields.category,
            price: fields.price,
            quantity: fields.quantity,
        }
    }

    /// Full replace of the mutable fields.
    pub fn replace(&mut self, fields: ItemFields) {
        self.name = fields.name;
        self.category = fields.category;
        self.price = fields.price;
        self.quantity = fields.quantity;
    }
}

/// Normalized search filters. All present filters are ANDed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    name: Option<String>,
    category: Option<String>,
    min_price: Option<Money>,
    max_price: Option<Money>,
}

impl SearchCriteria {
    /// Build criteria, treating blank name/category as absent and trimming
    /// the rest.
    pub fn new(
        name: Option<String>,
        category: Option<String>,
        min_price: Option<Money>,
        max_price: Option<Money>,
    ) -> Self {
        Self {
            name: sanitize(name),
            category: sanitize(category),
            min_price,
            max_price,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
    }

    /// Whether `item` satisfies every present filter.
    ///
    /// Name is a case-insensitive substring match; category is exact.
    pub fn matches(&self, item: &CatalogItem) -> bool {
        let name_ok = self.name.as_ref().is_none_or(|needle| {
            item.name.to_lowercase().contains(&needle.to_lowercase())
        });
        let category_ok = self
            .category
            .as_ref()
            .is_none_or(|category| &item.category == category);
        let min_ok = self.min_price.is_none_or(|min| item.price >= min);
        let max_ok = self.max_price.is_none_or(|max| item.price <= max);

        name_ok && category_ok && min_ok && max_ok
    }
}

fn sanitize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Errors raised by the catalog service and catalog stores.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Sweet not found")]
    ItemNotFound(ItemId),
    #[error("Out of stock")]
    OutOfStock(ItemId),
    #[error("Quantity must be positive")]
    InvalidQuantity,
    #[error("Quantity would exceed the maximum stock level")]
    QuantityOverflow,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Mutation applied to an item inside a store transaction. Returning an
/// error aborts the transaction and leaves the stored item untouched.
pub type ItemMutation<'a> = dyn FnMut(&mut CatalogItem) -> Result<(), CatalogError> + 'a;

/// Persistence capability required by [`CatalogService`].
pub trait CatalogStore: Send + Sync {
    /// Persist a new item, assigning the next id.
    fn insert_item(&self, fields: ItemFields) -> Result<CatalogItem, StoreError>;

    fn find_item(&self, id: ItemId) -> Result<Option<CatalogItem>, StoreError>;

    /// Every item, ordered by id.
    fn list_items(&self) -> Result<Vec<CatalogItem>, StoreError>;

    /// Items matching `criteria`, ordered by id.
    fn search_items(&self, criteria: &SearchCriteria) -> Result<Vec<CatalogItem>, StoreError>;

    /// Remove an item. Returns whether it existed.
    fn delete_item(&self, id: ItemId) -> Result<bool, StoreError>;

    /// Atomically read, mutate and write back one item.
    ///
    /// Returns `Ok(None)` without calling `mutate` if the item is absent.
    fn modify_item(
        &self,
        id: ItemId,
        mutate: &mut ItemMutation<'_>,
    ) -> Result<Option<CatalogItem>, CatalogError>;
}
