mod common;

use crate::common::*;
use chat_feed_lib::{
    ChatError, MessageId, ProfileUpdate, UserId, ANONYMOUS_DISPLAY_NAME, DEFAULT_LIST_LIMIT,
    MAX_MESSAGE_CHARS,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::thread;

fn ids(messages: &[chat_feed_lib::Message]) -> Vec<u64> {
    messages.iter().map(|message| message.id.0).collect()
}

#[test]
fn test_append_assigns_sequential_ids() {
    let (_dir, backend) = open_backend("sequential");
    let user = backend.directory().create_or_get_default("alice").unwrap();

    for n in 1..=5u64 {
        let message = backend.feed().append(user.id, format!("hello {n}")).unwrap();
        assert_eq!(message.id, MessageId(n));
    }
    assert_eq!(ids(&backend.feed().list_all()), vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_append_snapshots_author() {
    let (_dir, backend) = open_backend("snapshot");
    let user = backend.directory().create_or_get("bob", false, "🐻").unwrap();
    let message = backend.feed().append(user.id, "hi").unwrap();

    assert_eq!(message.user_id, user.id);
    assert_eq!(message.text, "hi");
    assert_eq!(message.display_name, "bob");
    assert_eq!(message.name, "bob");
    assert_eq!(message.avatar, "🐻");
    assert!(!message.is_anonymous);
}

#[test]
fn test_anonymous_author() {
    let (_dir, backend) = open_backend("anonymous");
    let user = backend.directory().create_or_get("carol", true, "🐯").unwrap();
    let message = backend.feed().append(user.id, "who am i").unwrap();

    assert_eq!(message.display_name, ANONYMOUS_DISPLAY_NAME);
    assert_eq!(message.name, "carol");
    assert!(message.is_anonymous);
}

#[test]
fn test_snapshot_ignores_later_profile_changes() {
    let (_dir, backend) = open_backend("stale_snapshot");
    let directory = backend.directory();
    let user = directory.create_or_get("dave", false, "🐨").unwrap();

    backend.feed().append(user.id, "before").unwrap();
    directory
        .update_profile(
            user.id,
            &ProfileUpdate {
                is_anonymous: Some(true),
                avatar: Some("🐵".to_string()),
            },
        )
        .unwrap();
    backend.feed().append(user.id, "after").unwrap();

    let messages = backend.feed().list_all();
    assert_eq!(messages[0].display_name, "dave");
    assert_eq!(messages[0].avatar, "🐨");
    assert_eq!(messages[1].display_name, ANONYMOUS_DISPLAY_NAME);
    assert_eq!(messages[1].avatar, "🐵");
}

#[test]
fn test_invalid_text_is_rejected() {
    let (_dir, backend) = open_backend("invalid_text");
    let user = backend.directory().create_or_get_default("erin").unwrap();
    let feed = backend.feed();
    feed.append(user.id, "first").unwrap();

    assert!(matches!(feed.append(user.id, ""), Err(ChatError::InvalidInput(_))));
    assert!(matches!(
        feed.append(user.id, "x".repeat(MAX_MESSAGE_CHARS + 1)),
        Err(ChatError::InvalidInput(_))
    ));
    assert_eq!(feed.len(), 1);

    // the rejected appends did not consume ids
    let message = feed.append(user.id, "x".repeat(MAX_MESSAGE_CHARS)).unwrap();
    assert_eq!(message.id, MessageId(2));
}

#[test]
fn test_unknown_user_is_rejected() {
    let (_dir, backend) = open_backend("unknown_user");
    let feed = backend.feed();

    assert!(matches!(feed.append(UserId(77), "hello"), Err(ChatError::NotFound(_))));
    assert!(feed.is_empty());
}

#[test]
fn test_list_since_windows() {
    let (_dir, backend) = open_backend("windows");
    let user = backend.directory().create_or_get_default("frank").unwrap();
    let feed = backend.feed();
    for n in 1..=150 {
        feed.append(user.id, format!("message {n}")).unwrap();
    }

    let latest = feed.list_since(None, DEFAULT_LIST_LIMIT);
    assert_eq!(ids(&latest), (51..=150).collect::<Vec<_>>());
    assert_eq!(feed.list_recent(), latest);

    let after_fifty = feed.list_since(Some(MessageId(50)), 100);
    assert_eq!(ids(&after_fifty), (51..=150).collect::<Vec<_>>());

    // the cursor branch keeps the oldest messages after the cursor
    let page = feed.list_since(Some(MessageId(50)), 10);
    assert_eq!(ids(&page), (51..=60).collect::<Vec<_>>());

    assert!(feed.list_since(Some(MessageId(150)), 100).is_empty());
}

#[test]
fn test_list_on_short_feed() {
    let (_dir, backend) = open_backend("short");
    let user = backend.directory().create_or_get_default("gina").unwrap();
    let feed = backend.feed();
    assert!(feed.list_recent().is_empty());

    feed.append(user.id, "one").unwrap();
    feed.append(user.id, "two").unwrap();
    assert_eq!(ids(&feed.list_since(None, 100)), vec![1, 2]);
}

#[test]
fn test_clear_all_resets_ids() {
    let (_dir, backend) = open_backend("clear");
    let user = backend.directory().create_or_get_default("hank").unwrap();
    let feed = backend.feed();
    feed.append(user.id, "one").unwrap();
    feed.append(user.id, "two").unwrap();

    assert!(feed.clear_all());
    assert!(feed.is_empty());

    let message = feed.append(user.id, "hi").unwrap();
    assert_eq!(message.id, MessageId(1));

    // clearing an empty feed is fine too
    assert!(feed.clear_all());
    assert!(feed.clear_all());
}

#[test]
fn test_concurrent_appends() {
    let (_dir, backend) = open_backend("concurrent_append");
    let backend = Arc::new(backend);
    let user = backend.directory().create_or_get_default("iris").unwrap();

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let backend = Arc::clone(&backend);
            thread::spawn(move || {
                for n in 0..125 {
                    backend
                        .feed()
                        .append(user.id, format!("worker {worker} message {n}"))
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let messages = backend.feed().list_all();
    assert_eq!(ids(&messages), (1..=1000).collect::<Vec<_>>());
    assert!(messages.windows(2).all(|pair| pair[0].created_at <= pair[1].created_at));
}

#[test]
fn test_reads_see_a_prefix_while_appending() {
    let (_dir, backend) = open_backend("read_during_append");
    let backend = Arc::new(backend);
    let user = backend.directory().create_or_get_default("jules").unwrap();

    let writer = {
        let backend = Arc::clone(&backend);
        thread::spawn(move || {
            for n in 0..300 {
                backend.feed().append(user.id, format!("message {n}")).unwrap();
            }
        })
    };

    while !writer.is_finished() {
        let snapshot = backend.feed().list_all();
        let expected: Vec<u64> = (1..=snapshot.len() as u64).collect();
        assert_eq!(ids(&snapshot), expected);
    }
    writer.join().unwrap();

    assert_eq!(backend.feed().len(), 300);
}

#[test]
fn test_message_serializes_for_clients() {
    let (_dir, backend) = open_backend("serialize");
    let user = backend.directory().create_or_get("kim", true, "🐔").unwrap();
    let message = backend.feed().append(user.id, "json me").unwrap();

    let value = serde_json::to_value(&message).unwrap();
    assert_eq!(value["id"], 1);
    assert_eq!(value["user_id"], user.id.0);
    assert_eq!(value["message"], "json me");
    assert_eq!(value["display_name"], ANONYMOUS_DISPLAY_NAME);
    assert_eq!(value["name"], "kim");
    assert_eq!(value["is_anonymous"], true);
    assert_eq!(value["avatar"], "🐔");
    assert!(value["created_at"].is_string());
}
