// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Catalog CRUD plus purchase and restock.

use std::sync::Arc;

use super::{CatalogError, CatalogItem, CatalogStore, ItemFields, ItemId, SearchCriteria};

pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub fn create(&self, fields: ItemFields) -> Result<CatalogItem, CatalogError> {
        let item = self.store.insert_item(fields)?;
        tracing::info!(item_id = item.id, name = %item.name, "Created catalog item");
        Ok(item)
    }

    pub fn list_all(&self) -> Result<Vec<CatalogItem>, CatalogError> {
        Ok(self.store.list_items()?)
    }

    pub fn search(&self, criteria: &SearchCriteria) -> Result<Vec<CatalogItem>, CatalogError> {
        if criteria.is_empty() {
            return self.list_all();
        }
        Ok(self.store.search_items(criteria)?)
    }

    /// Full replace of the item's mutable fields.
    pub fn update(&self, id: ItemId, fields: ItemFields) -> Result<CatalogItem, CatalogError> {
        let mut fields = Some(fields);
        let item = self
            .store
            .modify_item(id, &mut |item: &mut CatalogItem| {
                if let Some(fields) = fields.take() {
                    item.replace(fields);
                }
                Ok(())
            })?
            .ok_or(CatalogError::ItemNotFound(id))?;

        tracing::info!(item_id = id, "Updated catalog item");
        Ok(item)
    }

    /// Hard delete.
    pub fn delete(&self, id: ItemId) -> Result<(), CatalogError> {
        let item = self
            .store
            .find_item(id)?
            .ok_or(CatalogError::ItemNotFound(id))?;
        if !self.store.delete_item(id)? {
            // Removed concurrently between the lookup and the delete.
            return Err(CatalogError::ItemNotFound(id));
        }

        tracing::info!(item_id = id, name = %item.name, "Deleted catalog item");
        Ok(())
    }

    /// Sell one unit.
    pub fn purchase(&self, id: ItemId) -> Result<CatalogItem, CatalogError> {
        let item = self
            .store
            .modify_item(id, &mut |item: &mut CatalogItem| {
                if item.quantity == 0 {
                    return Err(CatalogError::OutOfStock(item.id));
                }
                item.quantity -= 1;
                Ok(())
            })?
            .ok_or(CatalogError::ItemNotFound(id))?;

        tracing::info!(item_id = id, remaining = item.quantity, "Purchased catalog item");
        Ok(item)
    }

    /// Add `qty` units. `qty` must be positive; it is checked before the
    /// item is looked up.
    pub fn restock(&self, id: ItemId, qty: i64) -> Result<CatalogItem, CatalogError> {
        if qty <= 0 {
            return Err(CatalogError::InvalidQuantity);
        }
        let added = u32::try_from(qty).map_err(|_| CatalogError::QuantityOverflow)?;

        let item = self
            .store
            .modify_item(id, &mut |item: &mut CatalogItem| {
                item.quantity = item
                    .quantity
                    .checked_add(added)
                    .ok_or(CatalogError::QuantityOverflow)?;
                Ok(())
            })?
            .ok_or(CatalogError::ItemNotFound(id))?;

        tracing::info!(item_id = id, added, quantity = item.quantity, "Restocked catalog item");
        Ok(item)
    }
}
