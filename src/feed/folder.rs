use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::config::FeedConfig;
use crate::error::{DemuxError, Result};

use super::file::{origin_of, read_export, read_participants};
use super::merge::{MergedRecords, SourceLoader};
use super::{Feed, RecordStream};

static MESSAGE_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^message_(\d+)\.json$").unwrap());

/// Returns the sequence number of a `message_<N>.json` file name.
fn sequence_number(file_name: &str) -> Option<u64> {
    MESSAGE_FILE
        .captures(file_name)
        .and_then(|caps| caps[1].parse().ok())
}

/// A feed over a conversation folder of `message_1.json`, `message_2.json`, ...
///
/// Every regular file in the folder must be named `message_<N>.json`;
/// subdirectories (the exporter's `photos/`, `gifs/`, ...) are ignored.
/// Sources are ordered by `N` and must all declare the same participants.
///
/// Only the participant headers are read when the folder is opened. Message
/// lists are decoded when the first record is pulled, then merged oldest
/// first across sources (see [`MergedRecords`]).
///
/// # Example
///
/// ```rust,no_run
/// use chatdemux::feed::{ChatFolderFeed, Feed};
///
/// let feed = ChatFolderFeed::open("inbox/bob_x1y2z3")?;
/// for record in feed.into_records() {
///     let record = record?;
///     println!("{}", record.timestamp_ms);
/// }
/// # Ok::<(), chatdemux::DemuxError>(())
/// ```
///
/// A feed is single-use and cannot be cloned to replay it:
///
/// ```rust,compile_fail
/// use chatdemux::feed::ChatFolderFeed;
///
/// let feed = ChatFolderFeed::open("inbox/bob_x1y2z3")?;
/// let replay = feed.clone();
/// # Ok::<(), chatdemux::DemuxError>(())
/// ```
#[derive(Debug)]
pub struct ChatFolderFeed {
    participants: Vec<String>,
    sources: Vec<PathBuf>,
    config: FeedConfig,
}

impl ChatFolderFeed {
    /// Opens `dir` with the default [`FeedConfig`].
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(dir, FeedConfig::default())
    }

    pub fn open_with_config(dir: impl AsRef<Path>, config: FeedConfig) -> Result<Self> {
        let dir = dir.as_ref();
        let origin = origin_of(dir);

        if !dir.is_dir() {
            return Err(DemuxError::layout(origin, "not a folder"));
        }

        let mut sources = Vec::new();
        let entries = fs::read_dir(dir).map_err(|err| DemuxError::feed_io(&origin, err))?;
        for entry in entries {
            let entry = entry.map_err(|err| DemuxError::feed_io(&origin, err))?;
            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy().into_owned();
            let Some(sequence) = sequence_number(&file_name) else {
                return Err(DemuxError::layout(
                    origin,
                    format!("unexpected file '{file_name}', expected message_<N>.json"),
                ));
            };
            sources.push((sequence, path));
        }

        if sources.is_empty() {
            return Err(DemuxError::layout(origin, "folder is empty"));
        }
        sources.sort();

        let mut participants = Vec::new();
        for (index, (sequence, path)) in sources.iter().enumerate() {
            let declared = read_participants(path, config)?;
            tracing::debug!(source = %path.display(), sequence, "discovered export file");
            if index == 0 {
                participants = declared;
            } else if !same_members(&participants, &declared) {
                return Err(DemuxError::InconsistentParticipants {
                    origin: origin_of(path),
                    expected: participants,
                    found: declared,
                });
            }
        }

        Ok(Self {
            participants,
            sources: sources.into_iter().map(|(_, path)| path).collect(),
            config,
        })
    }

    /// Source files in sequence order.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }
}

fn same_members(a: &[String], b: &[String]) -> bool {
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort();
    b.sort();
    a == b
}

impl Feed for ChatFolderFeed {
    fn participants(&self) -> &[String] {
        &self.participants
    }

    fn into_records(self) -> RecordStream {
        let config = self.config;
        let loaders = self
            .sources
            .into_iter()
            .map(|path| {
                Box::new(move || read_export(&path, config).map(|(_, records)| records))
                    as SourceLoader
            })
            .collect();
        Box::new(MergedRecords::lazy(loaders))
    }
}
