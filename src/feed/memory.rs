use crate::raw::RawRecord;

use super::{Feed, RecordStream};

/// A feed over records held in memory.
///
/// Records are delivered in push order; no reordering is applied.
#[derive(Debug, Clone, Default)]
pub struct MemoryFeed {
    participants: Vec<String>,
    records: Vec<RawRecord>,
}

impl MemoryFeed {
    /// Creates an empty feed declaring `participants`.
    pub fn new<I, S>(participants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            participants: participants.into_iter().map(Into::into).collect(),
            records: Vec::new(),
        }
    }

    /// Appends a record.
    pub fn push(&mut self, record: RawRecord) {
        self.records.push(record);
    }

    #[must_use]
    pub fn with_record(mut self, record: RawRecord) -> Self {
        self.push(record);
        self
    }

    #[must_use]
    pub fn with_records(mut self, records: impl IntoIterator<Item = RawRecord>) -> Self {
        self.records.extend(records);
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Feed for MemoryFeed {
    fn participants(&self) -> &[String] {
        &self.participants
    }

    fn into_records(self) -> RecordStream {
        Box::new(self.records.into_iter().map(Ok))
    }
}
