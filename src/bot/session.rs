//! # Session Management
//!
//! Ephemeral per-user conversational context. A session carries the pending
//! action that decides how the next free-text message is interpreted, and the
//! index map translating 1-based positions of the last rendered list into
//! durable wish ids. Sessions live in process memory only.
//!
//! ## Lifecycle
//!
//! A session is created lazily on the first event from an identity, after the
//! durable user record has been consulted (and created or renamed if needed).
//! It expires after the configured idle period; every lookup refreshes the
//! deadline, so the timeout really is an *idle* timeout. Expiry is a lazily
//! checked timestamp: an expired entry found during lookup counts as absent
//! and is recreated on the next event, which also resolves the race between
//! eviction and a concurrent lookup. A background sweep (driven by the
//! server) clears entries nobody looks up again.
//!
//! ## Locking
//!
//! The identity→session map sits behind one std `Mutex` held only across
//! lookup/insert/delete. Each session is wrapped in its own `tokio::sync::Mutex`
//! so two racing events from the same identity (a stray double-tap) cannot
//! interleave index-map mutation with a delete that reads it; handler
//! execution never holds the map lock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use log::debug;
use tokio::sync::Mutex as AsyncMutex;

use crate::bot::error::BotError;
use crate::bot::router::Action;
use crate::logutil::escape_log;
use crate::service::{hash_password, WishlistService};
use crate::storage::UserRecord;

/// Per-user conversational context.
#[derive(Debug)]
pub struct Session {
    /// Chat identity; equals the durable user id.
    pub id: i64,
    /// Cached display name.
    pub name: String,
    /// Which interpreter the next free-text message is routed to.
    pub pending: Action,
    /// Raw text/data of the current event; overwritten every event.
    pub last_request: String,
    /// Wish ids in the order of the last list rendered to this user. The
    /// session is the sole owner of this mapping.
    pub index_map: Vec<String>,
}

impl Session {
    fn new(id: i64, name: &str) -> Self {
        Session {
            id,
            name: name.to_string(),
            pending: Action::Default,
            last_request: String::new(),
            index_map: Vec::new(),
        }
    }
}

struct Entry {
    session: Arc<AsyncMutex<Session>>,
    expires_at: Instant,
}

/// Process-wide identity → session mapping with idle expiry.
pub struct SessionManager {
    entries: Mutex<HashMap<i64, Entry>>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Look up a live session. Refreshes the idle deadline on hit; an expired
    /// entry is evicted and reported as absent.
    pub fn get(&self, id: i64) -> Option<Arc<AsyncMutex<Session>>> {
        let mut entries = self.entries.lock().expect("session map poisoned");
        let now = Instant::now();
        match entries.get_mut(&id) {
            None => return None,
            Some(entry) if entry.expires_at > now => {
                entry.expires_at = now + self.ttl;
                return Some(Arc::clone(&entry.session));
            }
            Some(_) => {}
        }
        entries.remove(&id);
        debug!("session {} expired on lookup", id);
        None
    }

    /// Resolve or create the session for an identity. On creation the durable
    /// user record is consulted first: a missing user is created with a
    /// password hash of the display name, and a stale display name is synced.
    /// On failure nothing is cached and the caller gets the typed error.
    pub async fn get_or_create(
        &self,
        service: &WishlistService,
        id: i64,
        display_name: &str,
    ) -> Result<Arc<AsyncMutex<Session>>, BotError> {
        if let Some(session) = self.get(id) {
            return Ok(session);
        }

        // Durable resolution happens outside the map lock.
        match service.get_user(id).await {
            Ok(user) => {
                if user.name != display_name {
                    debug!(
                        "syncing display name for user {}: {}",
                        id,
                        escape_log(display_name)
                    );
                    service.update_username(id, display_name).await?;
                }
            }
            Err(e) if e.is_not_found() => {
                debug!("user {} not in store, creating", id);
                let user = UserRecord {
                    id,
                    name: display_name.to_string(),
                    password_hash: hash_password(display_name)?,
                };
                service.add_user(&user).await?;
            }
            Err(e) => return Err(e.into()),
        }

        let mut entries = self.entries.lock().expect("session map poisoned");
        let now = Instant::now();
        let entry = entries.entry(id).or_insert_with(|| Entry {
            session: Arc::new(AsyncMutex::new(Session::new(id, display_name))),
            expires_at: now + self.ttl,
        });
        entry.expires_at = now + self.ttl;
        Ok(Arc::clone(&entry.session))
    }

    /// Drop every expired entry. Returns how many were evicted.
    pub fn evict_expired(&self) -> usize {
        let mut entries = self.entries.lock().expect("session map poisoned");
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!("evicted {} idle session(s)", evicted);
        }
        evicted
    }

    /// Number of live (possibly expired but unswept) sessions.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("session map poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
