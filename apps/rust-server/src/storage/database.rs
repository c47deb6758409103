// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded shop database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `sweets`: item id → serialized CatalogItem (JSON bytes)
//! - `users`: user id → serialized User (JSON bytes)
//! - `usernames`: username → user id
//! - `emails`: email → user id
//! - `sequences`: sequence name → last id handed out
//!
//! redb serializes write transactions, so every read-modify-write below
//! happens inside a single write transaction and is never interleaved with
//! another writer.

use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{StoreError, StoreResult};
use crate::accounts::{AccountError, CredentialStore, NewUser, User, UserId};
use crate::catalog::{
    CatalogError, CatalogItem, CatalogStore, ItemFields, ItemId, ItemMutation, SearchCriteria,
};

// =============================================================================
// Table Definitions
// =============================================================================

const SWEETS: TableDefinition<u64, &[u8]> = TableDefinition::new("sweets");

const USERS: TableDefinition<u64, &[u8]> = TableDefinition::new("users");

/// Unique index: username → user id.
const USERNAMES: TableDefinition<&str, u64> = TableDefinition::new("usernames");

/// Unique index: email → user id.
const EMAILS: TableDefinition<&str, u64> = TableDefinition::new("emails");

/// Monotonic id sequences. Ids are never reused, even after deletes.
const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

const SWEETS_SEQUENCE: &str = "sweets";
const USERS_SEQUENCE: &str = "users";

// =============================================================================
// Helpers
// =============================================================================

fn read_json<T: DeserializeOwned>(
    table: &impl ReadableTable<u64, &'static [u8]>,
    id: u64,
) -> StoreResult<Option<T>> {
    match table.get(id)? {
        Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
        None => Ok(None),
    }
}

fn read_all_json<T: DeserializeOwned>(
    table: &impl ReadableTable<u64, &'static [u8]>,
) -> StoreResult<Vec<T>> {
    let mut out = Vec::new();
    for entry in table.iter()? {
        let (_, value) = entry?;
        out.push(serde_json::from_slice(value.value())?);
    }
    Ok(out)
}

fn to_json<T: Serialize>(value: &T) -> StoreResult<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

/// Advance the named sequence inside `txn` and return the new id.
fn next_id(txn: &WriteTransaction, sequence: &'static str) -> StoreResult<u64> {
    let mut table = txn.open_table(SEQUENCES)?;
    let last = table.get(sequence)?.map(|v| v.value()).unwrap_or(0);
    let next = last
        .checked_add(1)
        .ok_or(StoreError::SequenceExhausted(sequence))?;
    table.insert(sequence, next)?;
    Ok(next)
}

// =============================================================================
// ShopDatabase
// =============================================================================

/// Embedded ACID store for users and catalog items.
pub struct ShopDatabase {
    db: Database,
}

impl ShopDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(SWEETS)?;
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(USERNAMES)?;
            let _ = write_txn.open_table(EMAILS)?;
            let _ = write_txn.open_table(SEQUENCES)?;
        }
        write_txn.commit()?;

        tracing::info!(path = %path.display(), "Opened shop database");
        Ok(Self { db })
    }

    /// Cheap round trip used by the readiness probe.
    pub fn health_check(&self) -> StoreResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(SWEETS)?;
        Ok(())
    }

    fn lookup_user_id(&self, username: &str, email: &str) -> StoreResult<Option<UserId>> {
        let read_txn = self.db.begin_read()?;
        let usernames = read_txn.open_table(USERNAMES)?;
        if let Some(id) = usernames.get(username)? {
            return Ok(Some(id.value()));
        }
        let emails = read_txn.open_table(EMAILS)?;
        let id = emails.get(email)?.map(|id| id.value());
        Ok(id)
    }
}

impl CredentialStore for ShopDatabase {
    fn exists_by_username(&self, username: &str) -> StoreResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERNAMES)?;
        let found = table.get(username)?.is_some();
        Ok(found)
    }

    fn exists_by_email(&self, email: &str) -> StoreResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EMAILS)?;
        let found = table.get(email)?.is_some();
        Ok(found)
    }

    fn find_by_username_or_email(&self, username: &str, email: &str) -> StoreResult<Option<User>> {
        let Some(id) = self.lookup_user_id(username, email)? else {
            return Ok(None);
        };
        let read_txn = self.db.begin_read()?;
        let users = read_txn.open_table(USERS)?;
        let user = read_json::<User>(&users, id)?.ok_or(StoreError::DanglingIndex {
            index: "usernames",
            id,
        })?;
        Ok(Some(user))
    }

    fn insert_user(&self, user: NewUser) -> Result<User, AccountError> {
        let write_txn = self.db.begin_write().map_err(StoreError::from)?;
        let stored = {
            let mut usernames = write_txn.open_table(USERNAMES).map_err(StoreError::from)?;
            let mut emails = write_txn.open_table(EMAILS).map_err(StoreError::from)?;

            // Re-checked here because the service's pre-checks ran outside
            // this transaction.
            if usernames
                .get(user.username.as_str())
                .map_err(StoreError::from)?
                .is_some()
            {
                return Err(AccountError::DuplicateUsername);
            }
            if emails
                .get(user.email.as_str())
                .map_err(StoreError::from)?
                .is_some()
            {
                return Err(AccountError::DuplicateEmail);
            }

            let id = next_id(&write_txn, USERS_SEQUENCE)?;
            let stored = User {
                id,
                username: user.username,
                email: user.email,
                password_hash: user.password_hash,
                role: user.role,
            };

            let json = to_json(&stored)?;
            let mut users = write_txn.open_table(USERS).map_err(StoreError::from)?;
            users
                .insert(id, json.as_slice())
                .map_err(StoreError::from)?;
            usernames
                .insert(stored.username.as_str(), id)
                .map_err(StoreError::from)?;
            emails
                .insert(stored.email.as_str(), id)
                .map_err(StoreError::from)?;
            stored
        };
        write_txn.commit().map_err(StoreError::from)?;
        Ok(stored)
    }
}

impl CatalogStore for ShopDatabase {
    fn insert_item(&self, fields: ItemFields) -> StoreResult<CatalogItem> {
        let write_txn = self.db.begin_write()?;
        let item = {
            let id = next_id(&write_txn, SWEETS_SEQUENCE)?;
            let item = CatalogItem::new(id, fields);
            let json = to_json(&item)?;
            let mut table = write_txn.open_table(SWEETS)?;
            table.insert(id, json.as_slice())?;
            item
        };
        write_txn.commit()?;
        Ok(item)
    }

    fn find_item(&self, id: ItemId) -> StoreResult<Option<CatalogItem>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SWEETS)?;
        read_json(&table, id)
    }

    fn list_items(&self) -> StoreResult<Vec<CatalogItem>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SWEETS)?;
        read_all_json(&table)
    }

    fn search_items(&self, criteria: &SearchCriteria) -> StoreResult<Vec<CatalogItem>> {
        let mut items = self.list_items()?;
        items.retain(|item| criteria.matches(item));
        Ok(items)
    }

    fn delete_item(&self, id: ItemId) -> StoreResult<bool> {
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut table = write_txn.open_table(SWEETS)?;
            let removed = table.remove(id)?.is_some();
            removed
        };
        write_txn.commit()?;
        Ok(existed)
    }

    fn modify_item(
        &self,
        id: ItemId,
        mutate: &mut ItemMutation<'_>,
    ) -> Result<Option<CatalogItem>, CatalogError> {
        let write_txn = self.db.begin_write().map_err(StoreError::from)?;
        let updated = {
            let mut table = write_txn.open_table(SWEETS).map_err(StoreError::from)?;
            let Some(mut item) = read_json::<CatalogItem>(&table, id)? else {
                return Ok(None);
            };

            // An error here drops the transaction uncommitted.
            mutate(&mut item)?;

            let json = to_json(&item)?;
            table
                .insert(id, json.as_slice())
                .map_err(StoreError::from)?;
            item
        };
        write_txn.commit().map_err(StoreError::from)?;
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

    fn open_temp() -> (ShopDatabase, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = ShopDatabase::open(&dir.path().join("shop.redb")).unwrap();
        (db, dir)
    }

    fn fields(name: &str, category: &str, cents: i64, quantity: u32) -> ItemFields {
        ItemFields {
            name: name.to_string(),
            category: category.to_string(),
            price: Money::from_cents(cents),
            quantity,
        }
    }

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            role: Role::Admin,
        }
    }

    #[test]
    fn open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("shop.redb");
        let db = ShopDatabase::open(&path).unwrap();
        assert!(path.exists());
        db.health_check().unwrap();
    }

    #[test]
    fn item_round_trip_and_listing_order() {
        let (db, _dir) = open_temp();
        let ladoo = db.insert_item(fields("Ladoo", "Indian", 1250, 5)).unwrap();
        let fudge = db.insert_item(fields("Fudge", "British", 399, 2)).unwrap();

        assert_eq!(db.find_item(ladoo.id).unwrap(), Some(ladoo.clone()));
        assert_eq!(db.list_items().unwrap(), vec![ladoo, fudge]);
        assert!(db.find_item(99).unwrap().is_none());
    }

    #[test]
    fn ids_survive_delete_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.redb");

        {
            let db = ShopDatabase::open(&path).unwrap();
            db.insert_item(fields("Ladoo", "Indian", 1250, 5)).unwrap();
            let second = db.insert_item(fields("Barfi", "Indian", 900, 1)).unwrap();
            assert!(db.delete_item(second.id).unwrap());
            assert!(!db.delete_item(second.id).unwrap());
        }

        let db = ShopDatabase::open(&path).unwrap();
        let items = db.list_items().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].price, Money::from_cents(1250));

        let third = db.insert_item(fields("Jalebi", "Indian", 500, 3)).unwrap();
        assert_eq!(third.id, 3);
    }

    #[test]
    fn failed_mutation_is_rolled_back() {
        let (db, _dir) = open_temp();
        let item = db.insert_item(fields("Ladoo", "Indian", 1250, 0)).unwrap();

        let result = db.modify_item(item.id, &mut |item: &mut CatalogItem| {
            item.name = "changed".to_string();
            Err(CatalogError::OutOfStock(item.id))
        });
        assert!(matches!(result, Err(CatalogError::OutOfStock(_))));
        assert_eq!(db.find_item(item.id).unwrap().unwrap().name, "Ladoo");
    }

    #[test]
    fn modify_missing_item_returns_none() {
        let (db, _dir) = open_temp();
        let result = db
            .modify_item(5, &mut |_: &mut CatalogItem| Ok(()))
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn concurrent_purchases_never_oversell() {
        let (db, _dir) = open_temp();
        let db = Arc::new(db);
        let item = db.insert_item(fields("Ladoo", "Indian", 1250, 10)).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let db = Arc::clone(&db);
                thread::spawn(move || {
                    let mut sold = 0u32;
                    for _ in 0..5 {
                        let result = db.modify_item(item.id, &mut |item: &mut CatalogItem| {
                            if item.quantity == 0 {
                                return Err(CatalogError::OutOfStock(item.id));
                            }
                            item.quantity -= 1;
                            Ok(())
                        });
                        if result.is_ok() {
                            sold += 1;
                        }
                    }
                    sold
                })
            })
            .collect();

        let sold: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(sold, 10);
        assert_eq!(db.find_item(item.id).unwrap().unwrap().quantity, 0);
    }

    #[test]
    fn search_filters_in_id_order() {
        let (db, _dir) = open_temp();
        db.insert_item(fields("Kaju Barfi", "Indian", 2000, 1)).unwrap();
        db.insert_item(fields("Fudge", "British", 300, 1)).unwrap();
        db.insert_item(fields("Besan Barfi", "Indian", 1500, 1)).unwrap();

        let criteria = SearchCriteria::new(Some("BARFI".into()), Some("Indian".into()), None, None);
        let names: Vec<_> = db
            .search_items(&criteria)
            .unwrap()
            .into_iter()
            .map(|item| item.name)
            .collect();
        assert_eq!(names, vec!["Kaju Barfi", "Besan Barfi"]);
    }

    #[test]
    fn users_are_indexed_by_username_and_email() {
        let (db, _dir) = open_temp();
        let user = db.insert_user(new_user("root", "root@example.com")).unwrap();
        assert_eq!(user.id, 1);

        assert!(db.exists_by_username("root").unwrap());
        assert!(db.exists_by_email("root@example.com").unwrap());
        assert!(!db.exists_by_username("root@example.com").unwrap());

        let found = db
            .find_by_username_or_email("root@example.com", "root@example.com")
            .unwrap();
        assert_eq!(found, Some(user));
    }

    #[test]
    fn insert_user_rechecks_uniqueness() {
        let (db, _dir) = open_temp();
        db.insert_user(new_user("root", "root@example.com")).unwrap();

        assert!(matches!(
            db.insert_user(new_user("root", "other@example.com")),
            Err(AccountError::DuplicateUsername)
        ));
        assert!(matches!(
            db.insert_user(new_user("other", "root@example.com")),
            Err(AccountError::DuplicateEmail)
        ));
        // The rejected inserts must not have consumed ids.
        let next = db.insert_user(new_user("third", "third@example.com")).unwrap();
        assert_eq!(next.id, 2);
    }
}
