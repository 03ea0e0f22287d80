//! Sources of raw records.
//!
//! A [`Feed`] declares the chat's participants and hands over its records
//! exactly once, oldest first. Three implementations are provided:
//!
//! - [`MemoryFeed`] - records pushed by the caller, delivered in push order
//! - [`ChatFileFeed`] - one `message_N.json` export file
//! - [`ChatFolderFeed`] - a folder of export files merged by timestamp
//!
//! # Example
//!
//! ```rust
//! use chatdemux::feed::{Feed, MemoryFeed};
//! use chatdemux::raw::RawRecord;
//!
//! let feed = MemoryFeed::new(["Alice", "Bob"])
//!     .with_record(RawRecord::new("Bob", 1000).with_content("Hello"));
//! assert_eq!(feed.participants(), ["Alice", "Bob"]);
//!
//! let records: Vec<_> = feed.into_records().collect::<Result<_, _>>()?;
//! assert_eq!(records.len(), 1);
//! # Ok::<(), chatdemux::DemuxError>(())
//! ```

mod file;
mod folder;
mod memory;
mod merge;

use crate::error::Result;
use crate::raw::RawRecord;

pub use file::ChatFileFeed;
pub use folder::ChatFolderFeed;
pub use memory::MemoryFeed;
pub use merge::MergedRecords;

/// Single-pass stream of records, oldest first.
///
/// An `Err` item is fatal: the stream yields nothing after it.
pub type RecordStream = Box<dyn Iterator<Item = Result<RawRecord>>>;

/// A chat export, or anything shaped like one.
pub trait Feed {
    /// Participant names declared by the export, in declared order.
    fn participants(&self) -> &[String];

    /// Consumes the feed and returns its records, oldest first.
    fn into_records(self) -> RecordStream;
}

/// Puts one source's records oldest first.
///
/// Exports are normally newest first, which is reversed. Any other order is
/// sorted by timestamp, keeping the export order among equal timestamps.
pub(crate) fn normalize_order(records: &mut [RawRecord]) {
    let newest_first = records
        .windows(2)
        .all(|pair| pair[0].timestamp_ms >= pair[1].timestamp_ms);
    if newest_first {
        records.reverse();
    } else {
        records.sort_by_key(|record| record.timestamp_ms);
    }
}
