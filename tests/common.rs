//! Shared helpers for integration tests.

use std::time::Duration;

use tempfile::TempDir;
use wishbot::bot::{Handler, InboundEvent, SessionManager};
use wishbot::service::WishlistService;
use wishbot::storage::StoreBuilder;

#[allow(dead_code)]
pub fn handler_with_ttl(dir: &TempDir, ttl: Duration) -> Handler {
    let store = StoreBuilder::new(dir.path()).open().expect("store");
    Handler::new(WishlistService::new(store), SessionManager::new(ttl))
}

#[allow(dead_code)]
pub fn handler(dir: &TempDir) -> Handler {
    handler_with_ttl(dir, Duration::from_secs(3600))
}

/// Drive the add flow end to end: press the add button, then send the content.
#[allow(dead_code)]
pub async fn add_wish(handler: &Handler, chat_id: i64, name: &str, content: &str) {
    handler
        .handle(&InboundEvent::callback(chat_id, name, "/add"))
        .await;
    let reply = handler
        .handle(&InboundEvent::message(chat_id, name, content))
        .await;
    assert!(
        reply.text.contains(content),
        "add should chain into the rendered list"
    );
}
