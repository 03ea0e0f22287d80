//! End-to-end tests over export files on disk.

use std::fs;
use std::path::Path;

use chatdemux::error::FeedErrorKind;
use chatdemux::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;

fn write_export(dir: &Path, name: &str, participants: &[&str], messages: Value) {
    let participants: Vec<Value> = participants.iter().map(|n| json!({"name": n})).collect();
    let document = json!({
        "participants": participants,
        "messages": messages,
        "title": "Test chat",
        "thread_path": "inbox/test_abc123"
    });
    fs::write(dir.join(name), serde_json::to_string_pretty(&document).unwrap()).unwrap();
}

fn msg(sender: &str, timestamp_ms: i64, content: &str) -> Value {
    json!({
        "sender_name": sender,
        "timestamp_ms": timestamp_ms,
        "content": content,
        "type": "Generic"
    })
}

fn timestamps(chat: &Chat) -> Vec<i64> {
    chat.messages().iter().map(Message::timestamp_ms).collect()
}

// =========================================================================
// Folder feed
// =========================================================================

#[test]
fn test_folder_sources_merge_by_timestamp() {
    let dir = TempDir::new().unwrap();
    // Both files newest first, as the exporter writes them.
    write_export(
        dir.path(),
        "message_1.json",
        &["Alice", "Bob"],
        json!([msg("Bob", 300, "c"), msg("Alice", 100, "a")]),
    );
    write_export(
        dir.path(),
        "message_2.json",
        &["Alice", "Bob"],
        json!([msg("Alice", 400, "d"), msg("Bob", 200, "b")]),
    );

    let feed = ChatFolderFeed::open(dir.path()).unwrap();
    let chat = build_chat(feed, "Alice").unwrap();

    assert_eq!(timestamps(&chat), [100, 200, 300, 400]);
    let contents: Vec<_> = chat.messages().iter().filter_map(Message::content).collect();
    assert_eq!(contents, ["a", "b", "c", "d"]);
}

#[test]
fn test_folder_end_to_end() {
    let dir = TempDir::new().unwrap();
    write_export(
        dir.path(),
        "message_1.json",
        &["Alice", "Bob"],
        json!([{"sender_name": "Bob", "timestamp_ms": 1000, "content": "Hello"}]),
    );

    let feed = ChatFolderFeed::open(dir.path()).unwrap();
    assert_eq!(feed.participants(), ["Alice", "Bob"]);
    let chat = build_chat(feed, "Alice").unwrap();

    assert_eq!(chat.len(), 1);
    let message = &chat.messages()[0];
    assert_eq!(message.body, MessageBody::Text);
    assert_eq!(message.content(), Some("Hello"));
    assert!(message.reactions().is_empty());
    assert_eq!(chat.sender(message).name(), "Bob");
    assert!(!chat.sender(message).is_owner());

    let alice = chat.find_participant("Alice").unwrap();
    assert!(alice.is_owner());
    assert_eq!(alice.id(), chat.owner().id());
}

#[test]
fn test_folder_participant_order_may_differ() {
    let dir = TempDir::new().unwrap();
    write_export(dir.path(), "message_1.json", &["Alice", "Bob"], json!([]));
    write_export(dir.path(), "message_2.json", &["Bob", "Alice"], json!([]));

    let feed = ChatFolderFeed::open(dir.path()).unwrap();
    assert_eq!(feed.participants(), ["Alice", "Bob"]);
}

#[test]
fn test_folder_inconsistent_participants() {
    let dir = TempDir::new().unwrap();
    write_export(dir.path(), "message_1.json", &["Alice", "Bob"], json!([]));
    write_export(dir.path(), "message_2.json", &["Alice", "Carol"], json!([]));

    let err = ChatFolderFeed::open(dir.path()).unwrap_err();
    match err {
        DemuxError::InconsistentParticipants {
            origin,
            expected,
            found,
        } => {
            assert!(origin.ends_with("message_2.json"));
            assert_eq!(expected, ["Alice", "Bob"]);
            assert_eq!(found, ["Alice", "Carol"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn assert_layout_error(err: &DemuxError, needle: &str) {
    match err {
        DemuxError::Feed {
            kind: FeedErrorKind::Layout(message),
            ..
        } => assert!(message.contains(needle), "{message}"),
        other => panic!("expected a layout error, got {other}"),
    }
}

#[test]
fn test_folder_empty() {
    let dir = TempDir::new().unwrap();
    let err = ChatFolderFeed::open(dir.path()).unwrap_err();
    assert!(err.is_feed());
    assert_layout_error(&err, "empty");
}

#[test]
fn test_folder_with_stray_file() {
    let dir = TempDir::new().unwrap();
    write_export(dir.path(), "message_1.json", &["Alice"], json!([]));
    fs::write(dir.path().join("notes.txt"), "hello").unwrap();

    let err = ChatFolderFeed::open(dir.path()).unwrap_err();
    assert_layout_error(&err, "notes.txt");
}

#[test]
fn test_folder_path_is_a_file() {
    let dir = TempDir::new().unwrap();
    write_export(dir.path(), "message_1.json", &["Alice"], json!([]));

    let err = ChatFolderFeed::open(dir.path().join("message_1.json")).unwrap_err();
    assert_layout_error(&err, "not a folder");
}

#[test]
fn test_folder_ignores_media_subdirectories() {
    let dir = TempDir::new().unwrap();
    write_export(
        dir.path(),
        "message_1.json",
        &["Alice"],
        json!([{
            "sender_name": "Alice",
            "timestamp_ms": 5,
            "photos": [{"uri": "inbox/test_abc123/photos/1.jpg"}]
        }]),
    );
    let photos = dir.path().join("photos");
    fs::create_dir(&photos).unwrap();
    fs::write(photos.join("1.jpg"), [0xFF, 0xD8]).unwrap();

    let feed = ChatFolderFeed::open(dir.path()).unwrap();
    assert_eq!(feed.sources().len(), 1);
    let chat = build_chat(feed, "Alice").unwrap();
    assert_eq!(chat.messages()[0].kind(), MessageKind::Media);
}

#[test]
fn test_folder_repairs_mojibake() {
    let dir = TempDir::new().unwrap();
    write_export(
        dir.path(),
        "message_1.json",
        &["Ren\u{c3}\u{a9}e", "Bob"],
        json!([{
            "sender_name": "Ren\u{c3}\u{a9}e",
            "timestamp_ms": 1,
            "content": "Ch\u{c3}\u{a2}teau",
            "reactions": [{"reaction": "\u{f0}\u{9f}\u{98}\u{82}", "actor": "Bob"}]
        }]),
    );

    let feed = ChatFolderFeed::open(dir.path()).unwrap();
    assert_eq!(feed.participants(), ["Renée", "Bob"]);
    let chat = build_chat(feed, "Bob").unwrap();

    let message = &chat.messages()[0];
    assert_eq!(message.content(), Some("Château"));
    assert_eq!(chat.sender(message).name(), "Renée");
    assert_eq!(message.reactions()[0].emoji, "😂");
    assert_eq!(chat.participant_count(), 2);
}

#[test]
fn test_folder_corrupt_source_aborts_build() {
    let dir = TempDir::new().unwrap();
    write_export(dir.path(), "message_1.json", &["Alice"], json!([msg("Alice", 1, "a")]));
    write_export(
        dir.path(),
        "message_2.json",
        &["Alice"],
        json!([{"sender_name": "Alice", "content": "no timestamp"}]),
    );

    let feed = ChatFolderFeed::open(dir.path()).unwrap();
    let err = build_chat(feed, "Alice").unwrap_err();
    assert!(err.is_feed());
    assert!(err.to_string().contains("message_2.json"));
}

// =========================================================================
// Single file feed
// =========================================================================

#[test]
fn test_file_feed_end_to_end() {
    let dir = TempDir::new().unwrap();
    write_export(
        dir.path(),
        "message_1.json",
        &["Alice", "Bob"],
        json!([
            {"sender_name": "Bob", "timestamp_ms": 4000, "content": "The call ended.", "type": "Call"},
            {"sender_name": "Alice", "timestamp_ms": 3000, "content": "Alice joined the call.", "type": "Call"},
            {"sender_name": "Bob", "timestamp_ms": 2000, "content": "Bob started a call.", "type": "Call", "call_duration": 60},
            {"sender_name": "Bob", "timestamp_ms": 1000, "content": "Call me?"}
        ]),
    );

    let feed = ChatFileFeed::open(dir.path().join("message_1.json")).unwrap();
    assert_eq!(feed.len(), 4);
    let chat = build_chat(feed, "Alice").unwrap();

    let kinds: Vec<_> = chat.messages().iter().map(Message::kind).collect();
    assert_eq!(
        kinds,
        [
            MessageKind::Text,
            MessageKind::CallStart,
            MessageKind::CallJoin,
            MessageKind::CallEnd,
        ]
    );
    assert_eq!(chat.unrecognized().count(), 0);
}

#[test]
fn test_file_feed_keeps_unknown_fields_on_fallback() {
    let dir = TempDir::new().unwrap();
    write_export(
        dir.path(),
        "message_1.json",
        &["Alice"],
        json!([{
            "sender_name": "Alice",
            "timestamp_ms": 1,
            "content": "Alice sent $5.00.",
            "type": "Payment",
            "payment": {"amount": "5.00"}
        }]),
    );

    let chat = build_chat(
        ChatFileFeed::open(dir.path().join("message_1.json")).unwrap(),
        "Alice",
    )
    .unwrap();
    let message = &chat.messages()[0];
    assert!(message.is_unrecognized());
    assert_eq!(
        message.raw().extra.get("payment"),
        Some(&json!({"amount": "5.00"}))
    );
}

#[test]
fn test_raw_config_skips_encoding_repair() {
    let dir = TempDir::new().unwrap();
    write_export(
        dir.path(),
        "message_1.json",
        &["Alice"],
        json!([msg("Alice", 1, "Ch\u{c3}\u{a2}teau")]),
    );

    let feed =
        ChatFileFeed::open_with_config(dir.path().join("message_1.json"), FeedConfig::raw())
            .unwrap();
    let chat = build_chat(feed, "Alice").unwrap();
    assert_eq!(chat.messages()[0].content(), Some("Ch\u{c3}\u{a2}teau"));
}

// =========================================================================
// Builder
// =========================================================================

#[test]
fn test_builder_with_custom_registry() {
    let registry = RuleRegistry::builder()
        .rule(Rule::new("shout", |_| MessageBody::Wave).matching(r"{anything}!"))
        .build()
        .unwrap();
    let feed = MemoryFeed::new(["Alice"]).with_records([
        RawRecord::new("Alice", 1).with_content("Hello!"),
        RawRecord::new("Alice", 2).with_content("hello"),
    ]);

    let chat = ChatBuilder::new(BuildConfig::new("Alice"))
        .with_registry(registry)
        .build(feed)
        .unwrap();
    assert_eq!(chat.messages()[0].body, MessageBody::Wave);
    assert!(chat.messages()[1].is_unrecognized());
}
