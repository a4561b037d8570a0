//! Wishlist service: a thin transactional façade over the store.
//!
//! The service owns no state beyond the store handle. Every method forwards to
//! the storage contract and propagates its errors unchanged; the only logic
//! here is shape conversion (id generation for new wishes, the empty-batch
//! guard on deletion) and the argon2 password helpers shared by the handlers
//! and the session manager.

use argon2::Argon2;
use chrono::Utc;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use rand::Rng;

use crate::storage::{StorageError, Store, UserRecord, WishRecord};

const WISH_ID_LEN: usize = 16;
const WISH_ID_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Hash a password into a salted argon2id PHC string. The stored hash is
/// bounded in size regardless of the input length.
pub fn hash_password(plain: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let hash = Argon2::default().hash_password(plain.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC string. Argon2 verification is
/// resistant to timing comparison; a corrupt stored hash verifies as false.
pub fn verify_password(stored: &str, plain: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Generate a random 16-character wish id.
pub fn generate_wish_id() -> String {
    let mut rng = rand::thread_rng();
    (0..WISH_ID_LEN)
        .map(|_| WISH_ID_CHARSET[rng.gen_range(0..WISH_ID_CHARSET.len())] as char)
        .collect()
}

pub struct WishlistService {
    store: Store,
}

impl WishlistService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Store a new wish with a freshly generated id. Returns the record as
    /// persisted.
    pub async fn add_wish(&self, owner_id: i64, content: &str) -> Result<WishRecord, StorageError> {
        let wish = WishRecord {
            id: generate_wish_id(),
            content: content.to_string(),
            owner_id,
            created_at: Utc::now(),
        };
        self.store.insert_wish(&wish)?;
        Ok(wish)
    }

    /// Delete wishes by durable id. An empty batch is a no-op; the store is
    /// never asked to delete nothing.
    pub async fn delete_wishes(&self, ids: &[String]) -> Result<(), StorageError> {
        if ids.is_empty() {
            return Ok(());
        }
        self.store.delete_wishes_by_ids(ids)
    }

    pub async fn get_user(&self, id: i64) -> Result<UserRecord, StorageError> {
        self.store.get_user_by_id(id)
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<UserRecord, StorageError> {
        self.store.get_user_by_username(username)
    }

    pub async fn add_user(&self, user: &UserRecord) -> Result<(), StorageError> {
        self.store.insert_user(user)
    }

    pub async fn update_username(&self, id: i64, username: &str) -> Result<(), StorageError> {
        self.store.update_username(id, username)
    }

    pub async fn update_password(&self, id: i64, hash: &str) -> Result<(), StorageError> {
        self.store.update_user_password(id, hash)
    }

    /// Fetch a user's wishes in creation order.
    pub async fn wishlist_by_id(&self, owner_id: i64) -> Result<Vec<WishRecord>, StorageError> {
        self.store.list_wishes_by_owner(owner_id)
    }

    pub fn store(&self) -> &Store {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoreBuilder;
    use tempfile::TempDir;

    #[test]
    fn wish_ids_are_sixteen_letters() {
        for _ in 0..32 {
            let id = generate_wish_id();
            assert_eq!(id.len(), WISH_ID_LEN);
            assert!(id.bytes().all(|b| b.is_ascii_alphabetic()));
        }
    }

    #[test]
    fn password_round_trip() {
        let hash = hash_password("s3cret").expect("hash");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "s3cret"));
        assert!(!verify_password(&hash, "wrong"));
        assert!(!verify_password("not-a-phc-string", "s3cret"));
    }

    #[tokio::test]
    async fn empty_delete_batch_is_noop() {
        let dir = TempDir::new().expect("tempdir");
        let service = WishlistService::new(StoreBuilder::new(dir.path()).open().expect("store"));
        service.delete_wishes(&[]).await.expect("noop");
    }

    #[tokio::test]
    async fn add_wish_persists_content_and_owner() {
        let dir = TempDir::new().expect("tempdir");
        let service = WishlistService::new(StoreBuilder::new(dir.path()).open().expect("store"));
        let wish = service.add_wish(42, "Bicycle").await.expect("add");
        assert_eq!(wish.owner_id, 42);
        let list = service.wishlist_by_id(42).await.expect("list");
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].content, "Bicycle");
        assert_eq!(list[0].id, wish.id);
    }
}
