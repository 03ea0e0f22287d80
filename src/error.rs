//! Unified error types for chatdemux.
//!
//! Errors fall into two fatal families, both surfaced synchronously:
//!
//! - **Feed-level**: the source archive itself is unusable (missing files,
//!   undecodable JSON, inconsistent participant declarations). A build that
//!   hits one of these aborts and returns no [`Chat`](crate::Chat).
//! - **Registry-configuration**: a rule was authored wrongly (duplicate id,
//!   malformed template). Raised once by
//!   [`RuleRegistryBuilder::build`](crate::rules::RuleRegistryBuilder::build),
//!   before any record is processed.
//!
//! Records that no rule recognizes are *not* errors: they degrade to
//! [`MessageBody::Unrecognized`](crate::message::MessageBody::Unrecognized).

use std::io;

use thiserror::Error;

/// A specialized [`Result`] type for chatdemux operations.
pub type Result<T> = std::result::Result<T, DemuxError>;

/// The error type for all chatdemux operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DemuxError {
    /// An I/O error not tied to a particular source.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A source of the feed could not be read or decoded.
    #[error("Invalid chat feed '{origin}': {kind}")]
    Feed {
        /// File or folder the failure is attributed to
        origin: String,
        /// What went wrong
        #[source]
        kind: FeedErrorKind,
    },

    /// Merged sources disagree about who is in the chat.
    #[error(
        "Inconsistent participants in '{origin}': expected [{}], found [{}]",
        expected.join(", "),
        found.join(", ")
    )]
    InconsistentParticipants {
        /// The source whose declaration differs
        origin: String,
        /// Participants declared by the first source
        expected: Vec<String>,
        /// Participants declared by `origin`
        found: Vec<String>,
    },

    /// The rule registry was authored incorrectly.
    #[error("Rule registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Kinds of feed-level failures.
#[derive(Debug, Error)]
pub enum FeedErrorKind {
    /// Reading the source failed
    #[error("{0}")]
    Io(#[from] io::Error),
    /// The source is not valid export JSON
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// The source layout does not look like an export
    #[error("{0}")]
    Layout(String),
}

/// Authoring defects detected while building a [`RuleRegistry`](crate::rules::RuleRegistry).
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two rules were registered under the same id.
    #[error("duplicate rule id '{0}'")]
    DuplicateRule(String),

    /// A content template could not be parsed or violates literal constraints.
    #[error("rule '{rule}' has an invalid template \"{template}\": {defect}")]
    InvalidTemplate {
        rule: String,
        template: String,
        defect: TemplateDefect,
    },

    /// A template compiled to a regular expression the engine rejected.
    #[error("rule '{rule}' produced an invalid pattern: {source}")]
    Pattern {
        rule: String,
        #[source]
        source: regex::Error,
    },
}

/// Why a template string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateDefect {
    #[error("unknown placeholder '{{{0}}}'")]
    UnknownPlaceholder(String),
    #[error("unterminated placeholder")]
    UnterminatedPlaceholder,
    #[error("literal \"{0}\" contains an unescaped '.'")]
    UnescapedDot(String),
    #[error("literal \"{0}\" contains a capturing group")]
    CapturingGroup(String),
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl DemuxError {
    /// Creates a layout error for the given source.
    pub fn layout(origin: impl Into<String>, message: impl Into<String>) -> Self {
        DemuxError::Feed {
            origin: origin.into(),
            kind: FeedErrorKind::Layout(message.into()),
        }
    }

    /// Creates an I/O error attributed to the given source.
    pub fn feed_io(origin: impl Into<String>, source: io::Error) -> Self {
        DemuxError::Feed {
            origin: origin.into(),
            kind: FeedErrorKind::Io(source),
        }
    }

    /// Creates a decoding error attributed to the given source.
    pub fn feed_json(origin: impl Into<String>, source: serde_json::Error) -> Self {
        DemuxError::Feed {
            origin: origin.into(),
            kind: FeedErrorKind::Json(source),
        }
    }

    /// Returns `true` for any feed-level failure.
    pub fn is_feed(&self) -> bool {
        matches!(
            self,
            DemuxError::Feed { .. } | DemuxError::InconsistentParticipants { .. }
        )
    }

    /// Returns `true` if this is a registry-configuration error.
    pub fn is_registry(&self) -> bool {
        matches!(self, DemuxError::Registry(_))
    }

    /// Returns `true` if this is an I/O error.
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            DemuxError::Io(_)
                | DemuxError::Feed {
                    kind: FeedErrorKind::Io(_),
                    ..
                }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
