//! Password protection of shared wishlists: set/verify round trips, the
//! default-password convention, the reset sentinel, and what a viewer can
//! (and cannot) do with someone else's list.

mod common;

use tempfile::TempDir;
use wishbot::bot::texts;
use wishbot::bot::{Handler, InboundEvent, ScreenLevel};

const ALICE: i64 = 1;
const BOB: i64 = 2;

async fn set_password(handler: &Handler, chat_id: i64, name: &str, password: &str) {
    handler
        .handle(&InboundEvent::callback(chat_id, name, "/password"))
        .await;
    let reply = handler
        .handle(&InboundEvent::message(chat_id, name, password))
        .await;
    assert_eq!(reply.text, texts::SUCCESS);
    assert_eq!(reply.level, ScreenLevel::Service);
}

async fn show_other(handler: &Handler, chat_id: i64, name: &str, request: &str) -> wishbot::bot::Reply {
    handler
        .handle(&InboundEvent::callback(chat_id, name, "/show_user"))
        .await;
    handler
        .handle(&InboundEvent::message(chat_id, name, request))
        .await
}

#[tokio::test]
async fn set_and_verify_round_trip() {
    let dir = TempDir::new().expect("tempdir");
    let handler = common::handler(&dir);
    common::add_wish(&handler, ALICE, "alice", "Bicycle").await;
    set_password(&handler, ALICE, "alice", "secret").await;

    let reply = show_other(&handler, BOB, "bob", "alice secret").await;
    assert_eq!(reply.text, "1. Bicycle\n");
    assert_eq!(reply.level, ScreenLevel::OtherUser);

    let reply = show_other(&handler, BOB, "bob", "alice wrong").await;
    assert_eq!(reply.text, texts::WRONG_PASSWORD);
    assert_eq!(reply.level, ScreenLevel::OtherUser);
}

#[tokio::test]
async fn leading_at_sign_is_stripped() {
    let dir = TempDir::new().expect("tempdir");
    let handler = common::handler(&dir);
    common::add_wish(&handler, ALICE, "alice", "Bicycle").await;
    set_password(&handler, ALICE, "alice", "secret").await;
    let reply = show_other(&handler, BOB, "bob", "@alice secret").await;
    assert_eq!(reply.text, "1. Bicycle\n");
}

#[tokio::test]
async fn unset_password_defaults_to_display_name() {
    let dir = TempDir::new().expect("tempdir");
    let handler = common::handler(&dir);
    common::add_wish(&handler, ALICE, "alice", "Bicycle").await;
    // Alice never set a password, so her own name opens the list.
    let reply = show_other(&handler, BOB, "bob", "alice alice").await;
    assert_eq!(reply.text, "1. Bicycle\n");
    // A missing password token defaults to the *requester's* name - Bob's -
    // which is not Alice's password.
    let reply = show_other(&handler, BOB, "bob", "alice").await;
    assert_eq!(reply.text, texts::WRONG_PASSWORD);
}

#[tokio::test]
async fn remove_password_sentinel_resets_to_display_name() {
    let dir = TempDir::new().expect("tempdir");
    let handler = common::handler(&dir);
    common::add_wish(&handler, ALICE, "alice", "Bicycle").await;
    set_password(&handler, ALICE, "alice", "secret").await;
    set_password(&handler, ALICE, "alice", texts::REMOVE_PASSWORD).await;

    let reply = show_other(&handler, BOB, "bob", "alice alice").await;
    assert_eq!(reply.text, "1. Bicycle\n");
    let reply = show_other(&handler, BOB, "bob", "alice secret").await;
    assert_eq!(reply.text, texts::WRONG_PASSWORD);
}

#[tokio::test]
async fn whitespace_in_password_is_rejected_without_mutation() {
    let dir = TempDir::new().expect("tempdir");
    let handler = common::handler(&dir);
    common::add_wish(&handler, ALICE, "alice", "Bicycle").await;
    set_password(&handler, ALICE, "alice", "secret").await;

    handler
        .handle(&InboundEvent::callback(ALICE, "alice", "/password"))
        .await;
    let reply = handler
        .handle(&InboundEvent::message(ALICE, "alice", "my secret"))
        .await;
    assert_eq!(reply.text, texts::NO_SPACES);
    assert_eq!(reply.level, ScreenLevel::Empty);

    // The old password still opens the list.
    let reply = show_other(&handler, BOB, "bob", "alice secret").await;
    assert_eq!(reply.text, "1. Bicycle\n");
}

#[tokio::test]
async fn unknown_username_is_a_soft_miss() {
    let dir = TempDir::new().expect("tempdir");
    let handler = common::handler(&dir);
    let reply = show_other(&handler, BOB, "bob", "nobody whatever").await;
    assert_eq!(reply.text, texts::USER_NOT_FOUND);
    assert_eq!(reply.level, ScreenLevel::OtherUser);
}

#[tokio::test]
async fn extra_tokens_are_malformed() {
    let dir = TempDir::new().expect("tempdir");
    let handler = common::handler(&dir);
    let reply = show_other(&handler, BOB, "bob", "alice secret extra").await;
    assert_eq!(reply.text, texts::WRONG_REQUEST);
    assert_eq!(reply.level, ScreenLevel::OtherUser);
}

#[tokio::test]
async fn viewing_another_list_never_arms_the_index_map() {
    let dir = TempDir::new().expect("tempdir");
    let handler = common::handler(&dir);
    common::add_wish(&handler, ALICE, "alice", "Bicycle").await;
    let reply = show_other(&handler, BOB, "bob", "alice alice").await;
    assert_eq!(reply.text, "1. Bicycle\n");
    {
        let session = handler.sessions().get(BOB).expect("session");
        assert!(session.lock().await.index_map.is_empty());
    }
    // Index-based deletion against the viewed list must be impossible.
    handler
        .handle(&InboundEvent::callback(BOB, "bob", "/delete"))
        .await;
    let reply = handler.handle(&InboundEvent::message(BOB, "bob", "1")).await;
    assert_eq!(reply.text, texts::WRONG_REQUEST);
    assert_eq!(
        handler
            .service()
            .wishlist_by_id(ALICE)
            .await
            .expect("list")
            .len(),
        1
    );
}

#[tokio::test]
async fn empty_other_list_reports_no_wishes() {
    let dir = TempDir::new().expect("tempdir");
    let handler = common::handler(&dir);
    // Bob exists once he has talked to the bot.
    handler
        .handle(&InboundEvent::message(BOB, "bob", "/start"))
        .await;
    let reply = show_other(&handler, ALICE, "alice", "bob bob").await;
    assert_eq!(reply.text, texts::NO_WISHES);
    assert_eq!(reply.level, ScreenLevel::OtherUser);
}
