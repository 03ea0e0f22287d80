//! K-way merge of per-source record streams.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::vec;

use crate::error::Result;
use crate::raw::RawRecord;

use super::normalize_order;

/// Decodes one source's records on demand.
pub(crate) type SourceLoader = Box<dyn FnOnce() -> Result<Vec<RawRecord>>>;

enum Source {
    Pending(SourceLoader),
    Ready(vec::IntoIter<RawRecord>),
    Drained,
}

/// The next record of one source, ordered for a min-heap on
/// `(timestamp, source index)`.
struct Head {
    record: RawRecord,
    source: usize,
}

impl Head {
    fn key(&self) -> (i64, usize) {
        (self.record.timestamp_ms, self.source)
    }
}

impl PartialEq for Head {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Head {}

impl PartialOrd for Head {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Head {
    fn cmp(&self, other: &Self) -> Ordering {
        other.key().cmp(&self.key())
    }
}

/// Records of several sources merged oldest first.
///
/// Each source is put oldest first on its own (see
/// [`ChatFileFeed`](super::ChatFileFeed) for the rule) and the sources are
/// then merged by timestamp. Equal timestamps are taken from the source
/// listed first. Sources are decoded when the first record is requested and
/// dropped as soon as they are exhausted; a source that fails to decode ends
/// the stream with its error.
///
/// # Memory
///
/// Every source is decoded in full before the first record is yielded, since
/// a source's oldest record is at the end of its export. Peak memory is
/// therefore the sum of all decoded sources; it shrinks as sources drain.
pub struct MergedRecords {
    sources: Vec<Source>,
    heads: BinaryHeap<Head>,
    started: bool,
    failed: bool,
}

impl MergedRecords {
    /// Merges already decoded sources, listed in sequence order.
    pub fn new(sources: Vec<Vec<RawRecord>>) -> Self {
        Self::lazy(
            sources
                .into_iter()
                .map(|records| Box::new(move || -> Result<_> { Ok(records) }) as SourceLoader)
                .collect(),
        )
    }

    pub(crate) fn lazy(loaders: Vec<SourceLoader>) -> Self {
        Self {
            sources: loaders.into_iter().map(Source::Pending).collect(),
            heads: BinaryHeap::new(),
            started: false,
            failed: false,
        }
    }

    fn start(&mut self) -> Result<()> {
        self.started = true;
        for index in 0..self.sources.len() {
            let Source::Pending(load) = std::mem::replace(&mut self.sources[index], Source::Drained)
            else {
                continue;
            };
            let mut records = load()?;
            normalize_order(&mut records);
            let mut records = records.into_iter();
            if let Some(record) = records.next() {
                self.heads.push(Head {
                    record,
                    source: index,
                });
            }
            self.sources[index] = Source::Ready(records);
        }
        Ok(())
    }
}

impl Iterator for MergedRecords {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if !self.started {
            if let Err(err) = self.start() {
                self.failed = true;
                return Some(Err(err));
            }
        }

        let Head { record, source } = self.heads.pop()?;
        if let Source::Ready(rest) = &mut self.sources[source] {
            match rest.next() {
                Some(next) => self.heads.push(Head { record: next, source }),
                // Release the source's buffer as soon as it runs dry.
                None => self.sources[source] = Source::Drained,
            }
        }
        Some(Ok(record))
    }
}
