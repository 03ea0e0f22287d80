//! The classified message model.
//!
//! Every [`Message`] is a common [`MessageHeader`] plus one
//! [`MessageBody`] variant. The body is a closed enum, so consumers can
//! match exhaustively over every kind the classifier can produce:
//!
//! ```
//! use chatdemux::message::{Message, MessageBody};
//!
//! fn describe(message: &Message) -> String {
//!     match &message.body {
//!         MessageBody::Text => format!("said: {}", message.content().unwrap_or("")),
//!         MessageBody::PollCreation { name } => format!("asked: {name}"),
//!         MessageBody::Unrecognized => "did something".to_string(),
//!         other => other.kind().to_string(),
//!     }
//! }
//! ```
//!
//! Participants are referenced by [`ParticipantId`]; resolve them through the
//! owning [`Chat`](crate::Chat).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::media::MediaBundle;
use crate::participant::ParticipantId;
use crate::raw::{RawRecord, parse_ms_timestamp};

/// An emoji reaction left on a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reaction {
    pub emoji: String,
    pub sender: ParticipantId,
}

/// Fields shared by every message, whatever its kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageHeader {
    pub sender: ParticipantId,
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
    pub reactions: Vec<Reaction>,
    /// The record this message was classified from, unchanged.
    pub raw: RawRecord,
}

/// A classified message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub header: MessageHeader,
    pub body: MessageBody,
}

impl Message {
    pub fn sender(&self) -> ParticipantId {
        self.header.sender
    }

    pub fn timestamp_ms(&self) -> i64 {
        self.header.timestamp_ms
    }

    /// Returns the send time as a UTC datetime.
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        parse_ms_timestamp(self.header.timestamp_ms)
    }

    /// Returns the original text content, if any.
    pub fn content(&self) -> Option<&str> {
        self.header.raw.content()
    }

    pub fn reactions(&self) -> &[Reaction] {
        &self.header.reactions
    }

    pub fn raw(&self) -> &RawRecord {
        &self.header.raw
    }

    pub fn kind(&self) -> MessageKind {
        self.body.kind()
    }

    /// Returns `true` if no rule recognized this message.
    pub fn is_unrecognized(&self) -> bool {
        matches!(self.body, MessageBody::Unrecognized)
    }
}

/// Audio call or video chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CallType {
    /// An audio call, possibly with video shared later.
    Audio,
    Video,
}

/// What a chat settings change touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SettingsChange {
    Name(String),
    Photo,
    Theme,
    Emoji(String),
    /// `true` when joining now requires admin approval.
    MemberApproval(bool),
}

/// Category-specific payload of a [`Message`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MessageBody {
    /// No rule matched. The header keeps the record verbatim.
    Unrecognized,
    /// No content and no attachments.
    Empty,
    Text,
    Link {
        url: Option<String>,
    },
    Media(MediaBundle),

    CallStart {
        call_type: CallType,
        /// Call length in seconds, when the export records it.
        duration_secs: Option<u64>,
    },
    CallJoin {
        call_type: CallType,
    },
    CallShareVideo,
    CallEnd {
        call_type: CallType,
        duration_secs: Option<u64>,
    },

    NicknameChange {
        setter: ParticipantId,
        subject: ParticipantId,
        /// `None` when the nickname was cleared.
        new_nickname: Option<String>,
    },
    ChatSettingsChange(SettingsChange),

    Subscribe {
        inviter: ParticipantId,
        invitees: Vec<ParticipantId>,
    },
    Unsubscribe {
        removed_self: bool,
        removalist: ParticipantId,
        removed: ParticipantId,
    },
    AdminAdd {
        instigator: ParticipantId,
        subject: ParticipantId,
    },
    AdminRemove {
        instigator: ParticipantId,
        subject: ParticipantId,
    },

    PlanCreation {
        title: Option<String>,
    },
    PlanUpdate {
        new_title: Option<String>,
        new_date_time: Option<String>,
    },
    PlanDeletion {
        title: Option<String>,
        /// When the plan would have happened.
        date_time: String,
    },
    PlanResponse,
    PlanReminder {
        /// `true` for the "it's happening now" reminder, `false` for the
        /// half-hour warning.
        is_concurrent: bool,
        title: Option<String>,
        hour: String,
    },

    PollCreation {
        name: String,
    },
    PollAddVote {
        poll_name: String,
        option: String,
        /// Other options voted for in the same action but not named.
        hidden_vote_count: u32,
    },
    PollRemoveVote {
        poll_name: String,
        option: String,
        hidden_vote_count: u32,
    },
    PollChangeVote {
        poll_name: String,
        option: String,
    },
    PollExpired,

    AppScore {
        app_name: String,
        score: String,
        personal_best: bool,
    },
    AppLeaderboard {
        app_name: String,
        now_in_first_place: bool,
    },
    AppChallenge {
        app_name: String,
    },

    Wave,
}

impl MessageBody {
    pub fn kind(&self) -> MessageKind {
        match self {
            MessageBody::Unrecognized => MessageKind::Unrecognized,
            MessageBody::Empty => MessageKind::Empty,
            MessageBody::Text => MessageKind::Text,
            MessageBody::Link { .. } => MessageKind::Link,
            MessageBody::Media(_) => MessageKind::Media,
            MessageBody::CallStart { .. } => MessageKind::CallStart,
            MessageBody::CallJoin { .. } => MessageKind::CallJoin,
            MessageBody::CallShareVideo => MessageKind::CallShareVideo,
            MessageBody::CallEnd { .. } => MessageKind::CallEnd,
            MessageBody::NicknameChange { .. } => MessageKind::NicknameChange,
            MessageBody::ChatSettingsChange(_) => MessageKind::ChatSettingsChange,
            MessageBody::Subscribe { .. } => MessageKind::Subscribe,
            MessageBody::Unsubscribe { .. } => MessageKind::Unsubscribe,
            MessageBody::AdminAdd { .. } => MessageKind::AdminAdd,
            MessageBody::AdminRemove { .. } => MessageKind::AdminRemove,
            MessageBody::PlanCreation { .. } => MessageKind::PlanCreation,
            MessageBody::PlanUpdate { .. } => MessageKind::PlanUpdate,
            MessageBody::PlanDeletion { .. } => MessageKind::PlanDeletion,
            MessageBody::PlanResponse => MessageKind::PlanResponse,
            MessageBody::PlanReminder { .. } => MessageKind::PlanReminder,
            MessageBody::PollCreation { .. } => MessageKind::PollCreation,
            MessageBody::PollAddVote { .. } => MessageKind::PollAddVote,
            MessageBody::PollRemoveVote { .. } => MessageKind::PollRemoveVote,
            MessageBody::PollChangeVote { .. } => MessageKind::PollChangeVote,
            MessageBody::PollExpired => MessageKind::PollExpired,
            MessageBody::AppScore { .. } => MessageKind::AppScore,
            MessageBody::AppLeaderboard { .. } => MessageKind::AppLeaderboard,
            MessageBody::AppChallenge { .. } => MessageKind::AppChallenge,
            MessageBody::Wave => MessageKind::Wave,
        }
    }
}

/// Fieldless discriminant of [`MessageBody`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Unrecognized,
    Empty,
    Text,
    Link,
    Media,
    CallStart,
    CallJoin,
    CallShareVideo,
    CallEnd,
    NicknameChange,
    ChatSettingsChange,
    Subscribe,
    Unsubscribe,
    AdminAdd,
    AdminRemove,
    PlanCreation,
    PlanUpdate,
    PlanDeletion,
    PlanResponse,
    PlanReminder,
    PollCreation,
    PollAddVote,
    PollRemoveVote,
    PollChangeVote,
    PollExpired,
    AppScore,
    AppLeaderboard,
    AppChallenge,
    Wave,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Unrecognized => "unrecognized",
            MessageKind::Empty => "empty",
            MessageKind::Text => "text",
            MessageKind::Link => "link",
            MessageKind::Media => "media",
            MessageKind::CallStart => "call_start",
            MessageKind::CallJoin => "call_join",
            MessageKind::CallShareVideo => "call_share_video",
            MessageKind::CallEnd => "call_end",
            MessageKind::NicknameChange => "nickname_change",
            MessageKind::ChatSettingsChange => "chat_settings_change",
            MessageKind::Subscribe => "subscribe",
            MessageKind::Unsubscribe => "unsubscribe",
            MessageKind::AdminAdd => "admin_add",
            MessageKind::AdminRemove => "admin_remove",
            MessageKind::PlanCreation => "plan_creation",
            MessageKind::PlanUpdate => "plan_update",
            MessageKind::PlanDeletion => "plan_deletion",
            MessageKind::PlanResponse => "plan_response",
            MessageKind::PlanReminder => "plan_reminder",
            MessageKind::PollCreation => "poll_creation",
            MessageKind::PollAddVote => "poll_add_vote",
            MessageKind::PollRemoveVote => "poll_remove_vote",
            MessageKind::PollChangeVote => "poll_change_vote",
            MessageKind::PollExpired => "poll_expired",
            MessageKind::AppScore => "app_score",
            MessageKind::AppLeaderboard => "app_leaderboard",
            MessageKind::AppChallenge => "app_challenge",
            MessageKind::Wave => "wave",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
