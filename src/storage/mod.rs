//! # Storage Module - Data Persistence Layer
//!
//! Sled-backed persistence for wishbot's two record families: users and wishes.
//!
//! ## Layout
//!
//! Four trees inside one sled database:
//!
//! - `users` - `id (big-endian i64)` → bincode [`UserRecord`]
//! - `usernames` - `lowercase username` → big-endian id (exact-lookup index)
//! - `wishes` - `wish id (16-char token)` → bincode [`WishRecord`]
//! - `wish_order` - `owner:created:id` → wish id (creation-ordered owner index)
//!
//! ## Contract
//!
//! A missing user or username resolves to [`StorageError::NotFound`] so callers
//! can distinguish it from infrastructure failures and answer with a non-fatal
//! reply. Inserting a wish whose id already exists is a benign duplicate and
//! returns success without writing. Deleting a user cascades to every wish the
//! user owns.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sled::IVec;
use thiserror::Error;

const TREE_USERS: &str = "users";
const TREE_USERNAMES: &str = "usernames";
const TREE_WISHES: &str = "wishes";
const TREE_WISH_ORDER: &str = "wish_order";

/// Errors that can arise while interacting with the storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around bincode serialization and deserialization errors.
    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Wrapper around IO errors (directory creation, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Returned when fetching a record that is not present.
    #[error("record not found: {0}")]
    NotFound(String),
}

impl StorageError {
    /// True when this error is the distinguished not-found condition rather
    /// than an infrastructure failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

/// Durable user account. The chat identity is externally assigned and
/// immutable; the display name is synced from the transport on each session
/// creation. `password_hash` is a salted argon2 PHC string and is never empty:
/// a user without an explicit password carries a hash of their own display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub password_hash: String,
}

/// Single wishlist entry. The id is a 16-character random token unique across
/// the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishRecord {
    pub id: String,
    pub content: String,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
}

fn created_nanos(at: &DateTime<Utc>) -> i64 {
    at.timestamp_nanos_opt()
        .unwrap_or_else(|| at.timestamp_micros() * 1000)
}

/// Helper builder so tests can easily create throwaway stores with custom paths.
pub struct StoreBuilder {
    path: PathBuf,
}

impl StoreBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn open(self) -> Result<Store, StorageError> {
        Store::open(self.path)
    }
}

/// Sled-backed persistence for user accounts and wishes.
pub struct Store {
    db: sled::Db,
    users: sled::Tree,
    usernames: sled::Tree,
    wishes: sled::Tree,
    wish_order: sled::Tree,
}

impl Store {
    /// Open (or create) the store rooted at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let users = db.open_tree(TREE_USERS)?;
        let usernames = db.open_tree(TREE_USERNAMES)?;
        let wishes = db.open_tree(TREE_WISHES)?;
        let wish_order = db.open_tree(TREE_WISH_ORDER)?;
        Ok(Self {
            db,
            users,
            usernames,
            wishes,
            wish_order,
        })
    }

    fn user_key(id: i64) -> [u8; 8] {
        id.to_be_bytes()
    }

    fn username_key(name: &str) -> Vec<u8> {
        name.to_lowercase().into_bytes()
    }

    // Keys under one owner sort by creation time, so a prefix scan yields the
    // wishlist in insertion order.
    fn order_key(owner_id: i64, created_at: &DateTime<Utc>, wish_id: &str) -> Vec<u8> {
        format!(
            "{:016x}:{:020}:{}",
            owner_id as u64,
            created_nanos(created_at),
            wish_id
        )
        .into_bytes()
    }

    fn owner_prefix(owner_id: i64) -> Vec<u8> {
        format!("{:016x}:", owner_id as u64).into_bytes()
    }

    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, StorageError> {
        Ok(bincode::serialize(value)?)
    }

    fn deserialize<T: serde::de::DeserializeOwned>(bytes: IVec) -> Result<T, StorageError> {
        Ok(bincode::deserialize::<T>(&bytes)?)
    }

    /// Fetch a user record by chat identity.
    pub fn get_user_by_id(&self, id: i64) -> Result<UserRecord, StorageError> {
        let Some(bytes) = self.users.get(Self::user_key(id))? else {
            return Err(StorageError::NotFound(format!("user: {}", id)));
        };
        Self::deserialize(bytes)
    }

    /// Fetch a user record by display name (case-insensitive exact match).
    pub fn get_user_by_username(&self, username: &str) -> Result<UserRecord, StorageError> {
        let Some(id_bytes) = self.usernames.get(Self::username_key(username))? else {
            return Err(StorageError::NotFound(format!("username: {}", username)));
        };
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&id_bytes);
        self.get_user_by_id(i64::from_be_bytes(raw))
    }

    /// Insert a new user record, indexing it by username.
    pub fn insert_user(&self, user: &UserRecord) -> Result<(), StorageError> {
        let bytes = Self::serialize(user)?;
        self.users.insert(Self::user_key(user.id), bytes)?;
        self.usernames
            .insert(Self::username_key(&user.name), &Self::user_key(user.id))?;
        self.users.flush()?;
        Ok(())
    }

    /// Replace a user's password hash.
    pub fn update_user_password(&self, id: i64, hash: &str) -> Result<(), StorageError> {
        let mut user = self.get_user_by_id(id)?;
        user.password_hash = hash.to_string();
        self.users
            .insert(Self::user_key(id), Self::serialize(&user)?)?;
        self.users.flush()?;
        Ok(())
    }

    /// Replace a user's display name, reindexing the username lookup.
    pub fn update_username(&self, id: i64, username: &str) -> Result<(), StorageError> {
        let mut user = self.get_user_by_id(id)?;
        self.usernames.remove(Self::username_key(&user.name))?;
        user.name = username.to_string();
        self.users
            .insert(Self::user_key(id), Self::serialize(&user)?)?;
        self.usernames
            .insert(Self::username_key(username), &Self::user_key(id))?;
        self.users.flush()?;
        Ok(())
    }

    /// Insert a wish. An id collision is a benign duplicate: nothing is
    /// written and the call succeeds.
    pub fn insert_wish(&self, wish: &WishRecord) -> Result<(), StorageError> {
        if self.wishes.contains_key(wish.id.as_bytes())? {
            return Ok(());
        }
        self.wishes
            .insert(wish.id.as_bytes(), Self::serialize(wish)?)?;
        self.wish_order.insert(
            Self::order_key(wish.owner_id, &wish.created_at, &wish.id),
            wish.id.as_bytes(),
        )?;
        self.wishes.flush()?;
        Ok(())
    }

    /// List an owner's wishes in creation order.
    pub fn list_wishes_by_owner(&self, owner_id: i64) -> Result<Vec<WishRecord>, StorageError> {
        let mut list = Vec::new();
        for entry in self.wish_order.scan_prefix(Self::owner_prefix(owner_id)) {
            let (_, id_bytes) = entry?;
            if let Some(bytes) = self.wishes.get(&id_bytes)? {
                list.push(Self::deserialize(bytes)?);
            }
        }
        Ok(list)
    }

    /// Delete wishes by id in one batch. Ids that no longer exist are skipped.
    pub fn delete_wishes_by_ids(&self, ids: &[String]) -> Result<(), StorageError> {
        for id in ids {
            let Some(bytes) = self.wishes.get(id.as_bytes())? else {
                continue;
            };
            let wish: WishRecord = Self::deserialize(bytes)?;
            self.wish_order
                .remove(Self::order_key(wish.owner_id, &wish.created_at, &wish.id))?;
            self.wishes.remove(id.as_bytes())?;
        }
        self.wishes.flush()?;
        Ok(())
    }

    /// Delete a user and cascade to every wish the user owns.
    pub fn delete_user(&self, id: i64) -> Result<(), StorageError> {
        let user = self.get_user_by_id(id)?;
        let owned: Vec<String> = self
            .list_wishes_by_owner(id)?
            .into_iter()
            .map(|w| w.id)
            .collect();
        self.delete_wishes_by_ids(&owned)?;
        self.usernames.remove(Self::username_key(&user.name))?;
        self.users.remove(Self::user_key(id))?;
        self.users.flush()?;
        Ok(())
    }

    /// Number of stored users.
    pub fn count_users(&self) -> usize {
        self.users.len()
    }

    /// Number of stored wishes.
    pub fn count_wishes(&self) -> usize {
        self.wishes.len()
    }

    /// Flush all trees to disk. Called on shutdown.
    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }
}
