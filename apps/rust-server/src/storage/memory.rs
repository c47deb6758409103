// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory store for tests and ephemeral runs.
//!
//! A single mutex guards all state; holding it for the whole of
//! [`CatalogStore::modify_item`] gives the same atomicity as a database
//! write transaction.

use std::collections::BTreeMap;

use parking_lot::Mutex;

use super::{StoreError, StoreResult};
use crate::accounts::{AccountError, CredentialStore, NewUser, User, UserId};
use crate::catalog::{
    CatalogError, CatalogItem, CatalogStore, ItemFields, ItemId, ItemMutation, SearchCriteria,
};

#[derive(Default)]
struct Inner {
    items: BTreeMap<ItemId, CatalogItem>,
    users: BTreeMap<UserId, User>,
    last_item_id: ItemId,
    last_user_id: UserId,
}

#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for InMemoryStore {
    fn exists_by_username(&self, username: &str) -> StoreResult<bool> {
        let inner = self.inner.lock();
        Ok(inner.users.values().any(|u| u.username == username))
    }

    fn exists_by_email(&self, email: &str) -> StoreResult<bool> {
        let inner = self.inner.lock();
        Ok(inner.users.values().any(|u| u.email == email))
    }

    fn find_by_username_or_email(&self, username: &str, email: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.lock();
        let found = inner
            .users
            .values()
            .find(|u| u.username == username)
            .or_else(|| inner.users.values().find(|u| u.email == email));
        Ok(found.cloned())
    }

    fn insert_user(&self, user: NewUser) -> Result<User, AccountError> {
        let mut inner = self.inner.lock();
        if inner.users.values().any(|u| u.username == user.username) {
            return Err(AccountError::DuplicateUsername);
        }
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(AccountError::DuplicateEmail);
        }

        let id = inner
            .last_user_id
            .checked_add(1)
            .ok_or(StoreError::SequenceExhausted("users"))?;
        inner.last_user_id = id;

        let stored = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
        };
        inner.users.insert(id, stored.clone());
        Ok(stored)
    }
}

impl CatalogStore for InMemoryStore {
    fn insert_item(&self, fields: ItemFields) -> StoreResult<CatalogItem> {
        let mut inner = self.inner.lock();
        let id = inner
            .last_item_id
            .checked_add(1)
            .ok_or(StoreError::SequenceExhausted("sweets"))?;
        inner.last_item_id = id;

        let item = CatalogItem::new(id, fields);
        inner.items.insert(id, item.clone());
        Ok(item)
    }

    fn find_item(&self, id: ItemId) -> StoreResult<Option<CatalogItem>> {
        Ok(self.inner.lock().items.get(&id).cloned())
    }

    fn list_items(&self) -> StoreResult<Vec<CatalogItem>> {
        Ok(self.inner.lock().items.values().cloned().collect())
    }

    fn search_items(&self, criteria: &SearchCriteria) -> StoreResult<Vec<CatalogItem>> {
        Ok(self
            .inner
            .lock()
            .items
            .values()
            .filter(|item| criteria.matches(item))
            .cloned()
            .collect())
    }

    fn delete_item(&self, id: ItemId) -> StoreResult<bool> {
        Ok(self.inner.lock().items.remove(&id).is_some())
    }

    fn modify_item(
        &self,
        id: ItemId,
        mutate: &mut ItemMutation<'_>,
    ) -> Result<Option<CatalogItem>, CatalogError> {
        let mut inner = self.inner.lock();
        let Some(current) = inner.items.get(&id) else {
            return Ok(None);
        };

        // Mutate a copy so a rejected change leaves the stored item intact.
        let mut updated = current.clone();
        mutate(&mut updated)?;
        inner.items.insert(id, updated.clone());
        Ok(Some(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::money::Money;
    use std::sync::Arc;
    use std::thread;

    fn fields(name: &str, quantity: u32) -> ItemFields {
        ItemFields {
            name: name.to_string(),
            category: "Indian".to_string(),
            price: Money::from_cents(1250),
            quantity,
        }
    }

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "HASH".to_string(),
            role: Role::User,
        }
    }

    #[test]
    fn ids_are_sequential_and_not_reused() {
        let store = InMemoryStore::new();
        let first = store.insert_item(fields("Ladoo", 1)).unwrap();
        let second = store.insert_item(fields("Barfi", 1)).unwrap();
        assert_eq!((first.id, second.id), (1, 2));

        assert!(store.delete_item(second.id).unwrap());
        let third = store.insert_item(fields("Jalebi", 1)).unwrap();
        assert_eq!(third.id, 3);
    }

    #[test]
    fn rejected_mutation_leaves_item_unchanged() {
        let store = InMemoryStore::new();
        let item = store.insert_item(fields("Ladoo", 3)).unwrap();

        let result = store.modify_item(item.id, &mut |item: &mut CatalogItem| {
            item.quantity = 0;
            Err(CatalogError::InvalidQuantity)
        });
        assert!(matches!(result, Err(CatalogError::InvalidQuantity)));
        assert_eq!(store.find_item(item.id).unwrap().unwrap().quantity, 3);
    }

    #[test]
    fn modify_missing_item_returns_none() {
        let store = InMemoryStore::new();
        let mut called = false;
        let result = store
            .modify_item(9, &mut |_: &mut CatalogItem| {
                called = true;
                Ok(())
            })
            .unwrap();
        assert!(result.is_none());
        assert!(!called);
    }

    #[test]
    fn concurrent_decrements_are_not_lost() {
        let store = Arc::new(InMemoryStore::new());
        let item = store.insert_item(fields("Ladoo", 100)).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..10 {
                        store
                            .modify_item(item.id, &mut |item: &mut CatalogItem| {
                                item.quantity -= 1;
                                Ok(())
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.find_item(item.id).unwrap().unwrap().quantity, 20);
    }

    #[test]
    fn insert_user_enforces_uniqueness() {
        let store = InMemoryStore::new();
        store.insert_user(new_user("alice", "a@x.com")).unwrap();

        assert!(matches!(
            store.insert_user(new_user("alice", "b@x.com")),
            Err(AccountError::DuplicateUsername)
        ));
        assert!(matches!(
            store.insert_user(new_user("bob", "a@x.com")),
            Err(AccountError::DuplicateEmail)
        ));
    }

    #[test]
    fn lookup_prefers_username_then_email() {
        let store = InMemoryStore::new();
        let alice = store.insert_user(new_user("alice", "a@x.com")).unwrap();

        let by_email = store.find_by_username_or_email("a@x.com", "a@x.com").unwrap();
        assert_eq!(by_email, Some(alice.clone()));
        let by_name = store.find_by_username_or_email("alice", "alice").unwrap();
        assert_eq!(by_name, Some(alice));
        assert!(store.find_by_username_or_email("x", "x").unwrap().is_none());
    }
}
