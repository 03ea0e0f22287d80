//! Raw export records, before classification.
//!
//! A Messenger export stores every message as one loosely structured JSON
//! object. None of the fields says what *kind* of message it is: a photo
//! share, a nickname change and a poll vote all look alike apart from which
//! optional fields are present and what the `content` text says.
//!
//! [`RawRecord`] keeps that shape. Every optional field is an `Option` whose
//! absence is meaningful, and anything the model does not know about is kept
//! verbatim in [`RawRecord::extra`] so the fallback variant can return the
//! record exactly as it was read.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One exported message before classification.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawRecord {
    /// Account name of the sender. Absent for deleted or anonymized accounts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,

    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// The exporter's coarse record type (`Generic`, `Share`, `Subscribe`, ...).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reactions: Option<Vec<RawReaction>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photos: Option<Vec<RawMedia>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub videos: Option<Vec<RawMedia>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_files: Option<Vec<RawMedia>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gifs: Option<Vec<RawMedia>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<RawMedia>>,
    /// The exporter writes at most one sticker per message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticker: Option<RawMedia>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share: Option<RawShare>,

    /// Users affected by a subscribe/unsubscribe event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<RawUser>>,

    /// Length of a call in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_duration: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll: Option<RawPoll>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<RawPlan>,

    /// Fields the model does not interpret, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A reaction as exported: an emoji and the name of whoever left it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawReaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

/// An attachment entry (photo, video, audio, gif, sticker or file).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawMedia {
    pub uri: String,
    /// Seconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<RawThumbnail>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawThumbnail {
    pub uri: String,
}

/// A shared link.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawShare {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawUser {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawPoll {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
}

impl RawRecord {
    /// Creates a record with only a sender and a timestamp.
    pub fn new(sender_name: impl Into<String>, timestamp_ms: i64) -> Self {
        Self {
            sender_name: Some(sender_name.into()),
            timestamp_ms,
            ..Self::default()
        }
    }

    /// Decodes a record from an already-parsed JSON value.
    pub fn from_json(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    #[must_use]
    pub fn with_type(mut self, record_type: impl Into<String>) -> Self {
        self.record_type = Some(record_type.into());
        self
    }

    #[must_use]
    pub fn with_reaction(mut self, actor: impl Into<String>, emoji: impl Into<String>) -> Self {
        self.reactions.get_or_insert_with(Vec::new).push(RawReaction {
            reaction: Some(emoji.into()),
            actor: Some(actor.into()),
        });
        self
    }

    #[must_use]
    pub fn with_users<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.users = Some(
            names
                .into_iter()
                .map(|name| RawUser { name: name.into() })
                .collect(),
        );
        self
    }

    #[must_use]
    pub fn with_poll_title(mut self, title: impl Into<String>) -> Self {
        self.poll = Some(RawPoll {
            title: Some(title.into()),
        });
        self
    }

    // =========================================================================
    // Presence-checked views
    // =========================================================================

    /// Returns the text content, if any.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Returns the record type tag, if any.
    pub fn record_type(&self) -> Option<&str> {
        self.record_type.as_deref()
    }

    /// Returns `true` if the record type equals `kind`.
    pub fn is_type(&self, kind: &str) -> bool {
        self.record_type() == Some(kind)
    }

    /// Returns `true` if any attachment list (or the sticker) is present.
    ///
    /// Presence is what counts: an explicitly empty list still marks the
    /// record as a media share.
    pub fn has_media(&self) -> bool {
        self.photos.is_some()
            || self.videos.is_some()
            || self.audio_files.is_some()
            || self.gifs.is_some()
            || self.files.is_some()
            || self.sticker.is_some()
    }

    /// Returns the names listed in `users`, if present.
    pub fn user_names(&self) -> Option<impl Iterator<Item = &str>> {
        self.users
            .as_ref()
            .map(|users| users.iter().map(|user| user.name.as_str()))
    }

    /// Returns the send time as a UTC datetime.
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        parse_ms_timestamp(self.timestamp_ms)
    }
}

/// Parses a millisecond timestamp to a UTC datetime.
pub fn parse_ms_timestamp(timestamp_ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(timestamp_ms).single()
}

/// Parses a second-resolution timestamp to a UTC datetime.
pub fn parse_s_timestamp(timestamp_s: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(timestamp_s, 0).single()
}

/// Fix Meta's broken encoding (Mojibake).
///
/// Meta exports UTF-8 text encoded as if it were ISO-8859-1: each UTF-8 byte
/// is stored as a separate code point, so "Château" arrives as "ChÃ¢teau".
/// Taking each char back as its byte value recovers the original UTF-8.
///
/// Strings that cannot be mojibake (a char above U+00FF, or bytes that do not
/// form valid UTF-8) are returned unchanged.
pub fn fix_mojibake_encoding(s: &str) -> String {
    if s.is_ascii() || s.chars().any(|c| u32::from(c) > 0xFF) {
        return s.to_string();
    }
    let bytes: Vec<u8> = s.chars().map(|c| u32::from(c) as u8).collect();
    String::from_utf8(bytes).unwrap_or_else(|_| s.to_string())
}

/// Applies [`fix_mojibake_encoding`] to every string key and value in `value`.
pub fn fix_mojibake_in_place(value: &mut Value) {
    match value {
        Value::String(s) => *s = fix_mojibake_encoding(s),
        Value::Array(items) => items.iter_mut().for_each(fix_mojibake_in_place),
        Value::Object(map) => {
            let entries = std::mem::take(map);
            for (key, mut child) in entries {
                fix_mojibake_in_place(&mut child);
                map.insert(fix_mojibake_encoding(&key), child);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fix_encoding_ascii() {
        assert_eq!(fix_mojibake_encoding("Hello"), "Hello");
        assert_eq!(fix_mojibake_encoding("Test 123"), "Test 123");
    }

    #[test]
    fn test_fix_encoding_latin1_utf8() {
        assert_eq!(fix_mojibake_encoding("Ch\u{c3}\u{a2}teau"), "Château");
        assert_eq!(fix_mojibake_encoding("d\u{e2}\u{80}\u{99}If"), "d\u{2019}If");
    }

    #[test]
    fn test_fix_encoding_leaves_real_unicode() {
        assert_eq!(fix_mojibake_encoding("Привет"), "Привет");
        assert_eq!(fix_mojibake_encoding("😂"), "😂");
    }

    #[test]
    fn test_fix_mojibake_in_place_recurses() {
        let mut value = json!({
            "content": "Ch\u{c3}\u{a2}teau",
            "reactions": [{"reaction": "\u{f0}\u{9f}\u{98}\u{82}", "actor": "Bob"}]
        });
        fix_mojibake_in_place(&mut value);
        assert_eq!(value["content"], "Château");
        assert_eq!(value["reactions"][0]["reaction"], "😂");
    }

    #[test]
    fn test_deserialize_sparse_record() {
        let record = RawRecord::from_json(json!({
            "sender_name": "Alice",
            "timestamp_ms": 1000,
            "content": "Hi"
        }))
        .unwrap();
        assert_eq!(record.sender_name.as_deref(), Some("Alice"));
        assert_eq!(record.content(), Some("Hi"));
        assert!(record.record_type().is_none());
        assert!(!record.has_media());
        assert!(record.extra.is_empty());
    }

    #[test]
    fn test_unknown_fields_are_retained() {
        let value = json!({
            "sender_name": "Alice",
            "timestamp_ms": 1000,
            "is_unsent": false,
            "payment": {"amount": "5.00"}
        });
        let record = RawRecord::from_json(value.clone()).unwrap();
        assert_eq!(record.extra.get("payment"), Some(&json!({"amount": "5.00"})));
        assert_eq!(serde_json::to_value(&record).unwrap(), value);
    }

    #[test]
    fn test_missing_timestamp_is_rejected() {
        assert!(RawRecord::from_json(json!({"sender_name": "Alice"})).is_err());
    }

    #[test]
    fn test_empty_media_list_counts_as_present() {
        let record = RawRecord::from_json(json!({"timestamp_ms": 1, "photos": []})).unwrap();
        assert!(record.has_media());
        assert!(record.sender_name.is_none());
    }

    #[test]
    fn test_builder_methods() {
        let record = RawRecord::new("Bob", 5)
            .with_content("Bob left the group.")
            .with_type("Unsubscribe")
            .with_reaction("Alice", "😢")
            .with_users(["Bob"]);
        assert!(record.is_type("Unsubscribe"));
        assert_eq!(record.reactions.as_ref().map(Vec::len), Some(1));
        assert_eq!(record.user_names().unwrap().collect::<Vec<_>>(), ["Bob"]);
    }

    #[test]
    fn test_sent_at() {
        let record = RawRecord::new("Bob", 1705315800000);
        assert!(record.sent_at().is_some());
    }
}
