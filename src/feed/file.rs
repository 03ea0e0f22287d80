//! Single export file decoding.
//!
//! An export file looks like:
//!
//! ```json
//! {
//!   "participants": [{"name": "Alice"}, {"name": "Bob"}],
//!   "messages": [{"sender_name": "Bob", "timestamp_ms": 1000, "content": "Hello"}]
//! }
//! ```
//!
//! Other top-level fields (`title`, `thread_path`, ...) are ignored.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;
use serde::de::IgnoredAny;
use serde_json::Value;

use crate::config::FeedConfig;
use crate::error::{DemuxError, Result};
use crate::raw::{RawRecord, RawUser, fix_mojibake_encoding, fix_mojibake_in_place};

use super::{Feed, RecordStream, normalize_order};

#[derive(Deserialize)]
struct ExportDocument {
    participants: Option<Vec<RawUser>>,
    messages: Option<Vec<RawRecord>>,
}

#[derive(Deserialize)]
struct ExportHeader {
    participants: Option<Vec<RawUser>>,
    messages: Option<IgnoredAny>,
}

pub(crate) fn origin_of(path: &Path) -> String {
    path.display().to_string()
}

fn names(participants: Option<Vec<RawUser>>, origin: &str) -> Result<Vec<String>> {
    participants
        .map(|users| users.into_iter().map(|user| user.name).collect())
        .ok_or_else(|| DemuxError::layout(origin, "missing 'participants'"))
}

/// Reads only the declared participants of an export file.
///
/// The message list must be present but is skipped without being decoded.
pub(crate) fn read_participants(path: &Path, config: FeedConfig) -> Result<Vec<String>> {
    let origin = origin_of(path);
    let file = File::open(path).map_err(|err| DemuxError::feed_io(&origin, err))?;
    let header: ExportHeader = serde_json::from_reader(BufReader::new(file))
        .map_err(|err| DemuxError::feed_json(&origin, err))?;

    if header.messages.is_none() {
        return Err(DemuxError::layout(origin, "missing 'messages'"));
    }
    let mut names = names(header.participants, &origin)?;
    if config.fix_encoding {
        for name in &mut names {
            *name = fix_mojibake_encoding(name);
        }
    }
    Ok(names)
}

/// Decodes a whole export file. Records are returned in file order.
pub(crate) fn read_export(path: &Path, config: FeedConfig) -> Result<(Vec<String>, Vec<RawRecord>)> {
    let origin = origin_of(path);
    let text = fs::read_to_string(path).map_err(|err| DemuxError::feed_io(&origin, err))?;
    let mut value: Value =
        serde_json::from_str(&text).map_err(|err| DemuxError::feed_json(&origin, err))?;
    if config.fix_encoding {
        fix_mojibake_in_place(&mut value);
    }

    let document: ExportDocument =
        serde_json::from_value(value).map_err(|err| DemuxError::feed_json(&origin, err))?;
    let records = document
        .messages
        .ok_or_else(|| DemuxError::layout(&origin, "missing 'messages'"))?;
    let participants = names(document.participants, &origin)?;

    tracing::debug!(source = %origin, records = records.len(), "decoded export file");
    Ok((participants, records))
}

/// A feed over one export file.
///
/// The file is decoded when opened. Its records are delivered oldest first:
/// a newest-first file (the exporter's usual layout) is reversed, any other
/// order is sorted by timestamp.
///
/// # Example
///
/// ```rust,no_run
/// use chatdemux::feed::{ChatFileFeed, Feed};
///
/// let feed = ChatFileFeed::open("inbox/bob_x1y2z3/message_1.json")?;
/// println!("{} participants", feed.participants().len());
/// # Ok::<(), chatdemux::DemuxError>(())
/// ```
///
/// A feed is single-use and cannot be cloned to replay it:
///
/// ```rust,compile_fail
/// use chatdemux::feed::ChatFileFeed;
///
/// let feed = ChatFileFeed::open("message_1.json")?;
/// let replay = feed.clone();
/// # Ok::<(), chatdemux::DemuxError>(())
/// ```
#[derive(Debug)]
pub struct ChatFileFeed {
    participants: Vec<String>,
    records: Vec<RawRecord>,
}

impl ChatFileFeed {
    /// Opens `path` with the default [`FeedConfig`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, FeedConfig::default())
    }

    pub fn open_with_config(path: impl AsRef<Path>, config: FeedConfig) -> Result<Self> {
        let (participants, mut records) = read_export(path.as_ref(), config)?;
        normalize_order(&mut records);
        Ok(Self {
            participants,
            records,
        })
    }

    /// Number of records in the file.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Feed for ChatFileFeed {
    fn participants(&self) -> &[String] {
        &self.participants
    }

    fn into_records(self) -> RecordStream {
        Box::new(self.records.into_iter().map(Ok))
    }
}
