//! # Chatdemux
//!
//! A Rust library that turns a Messenger chat export into a strongly typed,
//! navigable conversation.
//!
//! ## Overview
//!
//! Messenger's "Download Your Information" export stores every message as a
//! loosely structured JSON record. Nothing in a record says what kind of
//! message it is: a photo share, a poll vote and a nickname change differ
//! only in which optional fields are present and in what the `content`
//! sentence says. Chatdemux *demultiplexes* that single stream into ~30
//! typed [`MessageBody`](message::MessageBody) variants.
//!
//! Classification is **total**. Every record yields exactly one message;
//! records no rule recognizes become
//! [`MessageBody::Unrecognized`](message::MessageBody::Unrecognized) and keep
//! their raw data for later inspection.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chatdemux::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let feed = ChatFolderFeed::open("messages/inbox/bob_x1y2z3")?;
//!     let chat = build_chat(feed, "Alice Smith")?;
//!
//!     for message in chat.messages() {
//!         println!("{}: {}", chat.sender(message).name(), message.kind());
//!     }
//!     println!("{} unrecognized", chat.unrecognized().count());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - [`raw`] — [`RawRecord`](raw::RawRecord), the export's record shape, and mojibake repair
//! - [`tokens`] — content [`Template`](tokens::Template)s and the tokens they produce
//! - [`rules`] — [`Rule`](rules::Rule), [`RuleRegistry`](rules::RuleRegistry) and the standard rule set
//! - [`classifier`] — first-match-wins [`Classifier`](classifier::Classifier)
//! - [`participant`] — [`ParticipantResolver`](participant::ParticipantResolver) and identities
//! - [`media`] — typed attachments
//! - [`message`] — the [`Message`] model
//! - [`feed`] — [`Feed`](feed::Feed) sources: memory, single file, folder
//! - [`chat`] — [`Chat`] and [`ChatBuilder`]
//! - [`progress`] — build progress reporting
//! - [`config`] — [`FeedConfig`](config::FeedConfig), [`BuildConfig`](config::BuildConfig)
//! - [`error`] — [`DemuxError`], [`Result`]
//! - [`prelude`] — Convenient re-exports

pub mod chat;
pub mod classifier;
pub mod config;
pub mod error;
pub mod feed;
pub mod media;
pub mod message;
pub mod participant;
pub mod progress;
pub mod raw;
pub mod rules;
pub mod tokens;

// Re-export the main types at the crate root for convenience
pub use chat::{Chat, ChatBuilder, build_chat};
pub use error::{DemuxError, Result};
pub use message::Message;

/// Convenient re-exports for common usage.
///
/// ```rust
/// use chatdemux::prelude::*;
/// ```
pub mod prelude {
    pub use crate::chat::{Chat, ChatBuilder, build_chat};
    pub use crate::error::{DemuxError, Result};

    pub use crate::message::{Message, MessageBody, MessageKind};
    pub use crate::participant::{Participant, ParticipantId};

    pub use crate::feed::{ChatFileFeed, ChatFolderFeed, Feed, MemoryFeed};
    pub use crate::raw::RawRecord;

    pub use crate::config::{BuildConfig, FeedConfig};
    pub use crate::rules::{Rule, RuleRegistry};

    pub use crate::progress::{IntervalProgressReporter, ProgressReporter};
}
