//! Chat construction and the finished chat model.
//!
//! [`ChatBuilder`] drives a single pass over a [`Feed`]:
//!
//! 1. seed the participants with the feed's declared names and the owner;
//! 2. classify every record in feed order;
//! 3. append each message and notify the progress reporter.
//!
//! A feed error at any point aborts the build and no [`Chat`] is returned.
//!
//! # Example
//!
//! ```rust
//! use chatdemux::feed::MemoryFeed;
//! use chatdemux::message::MessageKind;
//! use chatdemux::raw::RawRecord;
//! use chatdemux::build_chat;
//!
//! let feed = MemoryFeed::new(["Alice", "Bob"])
//!     .with_record(RawRecord::new("Bob", 1000).with_content("Hello"));
//! let chat = build_chat(feed, "Alice")?;
//!
//! let message = &chat.messages()[0];
//! assert_eq!(message.kind(), MessageKind::Text);
//! assert_eq!(chat.sender(message).name(), "Bob");
//! assert!(chat.owner().is_owner());
//! # Ok::<(), chatdemux::DemuxError>(())
//! ```

use std::fmt;
use std::ops::Index;

use crate::classifier::Classifier;
use crate::config::BuildConfig;
use crate::error::Result;
use crate::feed::Feed;
use crate::message::Message;
use crate::participant::{Participant, ParticipantId, ParticipantResolver};
use crate::progress::{IntervalProgressReporter, ProgressReporter};
use crate::rules::RuleRegistry;

/// A classified conversation.
///
/// Messages are ordered oldest first. The chat owns every participant its
/// messages refer to.
#[derive(Debug, Clone)]
pub struct Chat {
    messages: Vec<Message>,
    participants: ParticipantResolver,
    owner: ParticipantId,
}

impl Chat {
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Iterates over participants in the order they were first seen.
    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter()
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.get(id)
    }

    /// Looks a participant up by account name without creating one.
    pub fn find_participant(&self, name: &str) -> Option<&Participant> {
        self.participants
            .find(name)
            .and_then(|id| self.participants.get(id))
    }

    /// Returns the participant named `name`, creating a regular (non-owner)
    /// participant if nobody by that name took part.
    pub fn get_participant(&mut self, name: &str) -> &Participant {
        let id = self.participants.resolve_as(name, false);
        &self.participants[id]
    }

    /// Returns the participant standing in for deleted or anonymized
    /// accounts, creating it if the chat never needed it.
    pub fn unknown_participant(&mut self) -> &Participant {
        let id = self.participants.unknown();
        &self.participants[id]
    }

    /// The person who downloaded the archive.
    pub fn owner(&self) -> &Participant {
        &self.participants[self.owner]
    }

    pub fn sender(&self, message: &Message) -> &Participant {
        &self.participants[message.sender()]
    }

    /// Messages no rule recognized, for auditing.
    pub fn unrecognized(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|message| message.is_unrecognized())
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Index<ParticipantId> for Chat {
    type Output = Participant;

    fn index(&self, id: ParticipantId) -> &Participant {
        &self.participants[id]
    }
}

/// Builds a [`Chat`] from a feed.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use chatdemux::config::BuildConfig;
/// use chatdemux::feed::MemoryFeed;
/// use chatdemux::raw::RawRecord;
/// use chatdemux::rules::RuleRegistry;
/// use chatdemux::ChatBuilder;
///
/// let config = BuildConfig::new("Alice").with_progress_interval(Duration::from_secs(1));
/// let chat = ChatBuilder::new(config)
///     .with_registry(RuleRegistry::standard()?)
///     .build(MemoryFeed::new(["Alice"]).with_record(RawRecord::new("Alice", 1).with_content("hi")))?;
/// assert_eq!(chat.len(), 1);
/// # Ok::<(), chatdemux::DemuxError>(())
/// ```
pub struct ChatBuilder {
    config: BuildConfig,
    registry: Option<RuleRegistry>,
    reporter: Option<Box<dyn ProgressReporter>>,
}

impl ChatBuilder {
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            registry: None,
            reporter: None,
        }
    }

    /// Classifies with `registry` instead of the standard rules.
    #[must_use]
    pub fn with_registry(mut self, registry: RuleRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sends build checkpoints to `reporter`.
    ///
    /// Takes precedence over [`BuildConfig::progress_interval`].
    #[must_use]
    pub fn with_reporter(mut self, reporter: impl ProgressReporter + 'static) -> Self {
        self.reporter = Some(Box::new(reporter));
        self
    }

    /// Consumes `feed` and builds the chat.
    ///
    /// # Errors
    ///
    /// Returns the first feed error encountered, or a registry error if the
    /// standard rules fail to build. No partial chat is returned.
    pub fn build<F: Feed>(self, feed: F) -> Result<Chat> {
        let registry = match self.registry {
            Some(registry) => registry,
            None => RuleRegistry::standard()?,
        };
        let mut reporter = self.reporter.or_else(|| {
            self.config.progress_interval.map(|interval| {
                Box::new(IntervalProgressReporter::logging(interval)) as Box<dyn ProgressReporter>
            })
        });

        let mut participants = ParticipantResolver::new(self.config.owner_name);
        for name in feed.participants() {
            participants.resolve(name);
        }
        let owner = participants.owner();

        if let Some(reporter) = reporter.as_mut() {
            reporter.start();
        }

        let mut classifier = Classifier::new(&registry);
        let mut messages = Vec::new();
        for record in feed.into_records() {
            let message = classifier.classify(record?, &mut participants);
            if let Some(reporter) = reporter.as_mut() {
                reporter.message_finished(&message);
            }
            messages.push(message);
        }

        if let Some(reporter) = reporter.as_mut() {
            reporter.finish();
        }

        let chat = Chat {
            messages,
            participants,
            owner,
        };
        tracing::info!(
            messages = chat.len(),
            participants = chat.participant_count(),
            unrecognized = chat.unrecognized().count(),
            "chat built"
        );
        Ok(chat)
    }
}

impl fmt::Debug for ChatBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatBuilder")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("has_reporter", &self.reporter.is_some())
            .finish()
    }
}

/// Builds a chat owned by `owner_name` with the standard rules.
pub fn build_chat<F: Feed>(feed: F, owner_name: &str) -> Result<Chat> {
    ChatBuilder::new(BuildConfig::new(owner_name)).build(feed)
}
