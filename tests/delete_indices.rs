//! Index-based deletion: valid subsets remove exactly the chosen wishes,
//! anything malformed rejects the whole request and leaves storage unchanged.

mod common;

use tempfile::TempDir;
use wishbot::bot::texts;
use wishbot::bot::{Handler, InboundEvent, ScreenLevel};

const ID: i64 = 11;
const NAME: &str = "frank";

async fn seeded_handler(dir: &TempDir) -> Handler {
    let handler = common::handler(dir);
    for content in ["first", "second", "third", "fourth"] {
        common::add_wish(&handler, ID, NAME, content).await;
    }
    handler
}

async fn request_delete(handler: &Handler, positions: &str) -> wishbot::bot::Reply {
    handler
        .handle(&InboundEvent::callback(ID, NAME, "/delete"))
        .await;
    handler
        .handle(&InboundEvent::message(ID, NAME, positions))
        .await
}

async fn contents(handler: &Handler) -> Vec<String> {
    handler
        .service()
        .wishlist_by_id(ID)
        .await
        .expect("list")
        .into_iter()
        .map(|w| w.content)
        .collect()
}

#[tokio::test]
async fn deletes_exactly_the_chosen_positions() {
    let dir = TempDir::new().expect("tempdir");
    let handler = seeded_handler(&dir).await;
    let reply = request_delete(&handler, "1 3").await;
    assert_eq!(reply.level, ScreenLevel::Me);
    assert_eq!(reply.text, "1. second\n2. fourth\n");
    assert_eq!(contents(&handler).await, vec!["second", "fourth"]);
}

#[tokio::test]
async fn out_of_range_position_rejects_everything() {
    let dir = TempDir::new().expect("tempdir");
    let handler = seeded_handler(&dir).await;
    let reply = request_delete(&handler, "2 5").await;
    assert_eq!(reply.text, texts::WRONG_REQUEST);
    assert_eq!(reply.level, ScreenLevel::Empty);
    assert_eq!(contents(&handler).await.len(), 4, "nothing deleted");
}

#[tokio::test]
async fn zero_is_not_a_valid_position() {
    let dir = TempDir::new().expect("tempdir");
    let handler = seeded_handler(&dir).await;
    let reply = request_delete(&handler, "0").await;
    assert_eq!(reply.text, texts::WRONG_REQUEST);
    assert_eq!(contents(&handler).await.len(), 4);
}

#[tokio::test]
async fn non_numeric_token_rejects_everything() {
    let dir = TempDir::new().expect("tempdir");
    let handler = seeded_handler(&dir).await;
    let reply = request_delete(&handler, "1 two").await;
    assert_eq!(reply.text, texts::WRONG_REQUEST);
    assert_eq!(contents(&handler).await.len(), 4);
}

#[tokio::test]
async fn delete_all_sentinel_clears_the_list() {
    let dir = TempDir::new().expect("tempdir");
    let handler = seeded_handler(&dir).await;
    let reply = request_delete(&handler, "delete all").await;
    assert_eq!(reply.text, texts::NO_WISHES);
    assert_eq!(reply.level, ScreenLevel::EmptyList);
    assert!(contents(&handler).await.is_empty());
}

#[tokio::test]
async fn retry_after_rejection_still_works() {
    let dir = TempDir::new().expect("tempdir");
    let handler = seeded_handler(&dir).await;
    let reply = request_delete(&handler, "99").await;
    assert_eq!(reply.text, texts::WRONG_REQUEST);
    // The pending action survives the rejection; a corrected request goes
    // through without pressing the button again.
    let reply = handler.handle(&InboundEvent::message(ID, NAME, "4")).await;
    assert_eq!(reply.level, ScreenLevel::Me);
    assert_eq!(contents(&handler).await, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn positions_resolve_against_the_last_rendered_list() {
    let dir = TempDir::new().expect("tempdir");
    let handler = seeded_handler(&dir).await;
    // First delete renumbers the list; the second "1" must hit the new head.
    request_delete(&handler, "1").await;
    let reply = request_delete(&handler, "1").await;
    assert_eq!(reply.text, "1. third\n2. fourth\n");
    assert_eq!(contents(&handler).await, vec!["third", "fourth"]);
}
