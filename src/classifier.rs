//! First-match-wins classification of raw records.
//!
//! The [`Classifier`] walks a [`RuleRegistry`] in registration order and
//! builds the message with the first rule that accepts the record. If none
//! does, the record becomes [`MessageBody::Unrecognized`] with its raw data
//! kept verbatim in the header, so classification is total.

use crate::message::{Message, MessageBody, MessageHeader, Reaction};
use crate::participant::ParticipantResolver;
use crate::raw::RawRecord;
use crate::rules::{Extraction, RuleRegistry};

/// Conversation facts that change how later records are read.
///
/// Some sentences are only meaningful in context: "The call ended." only
/// ends something while a call is running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversationState {
    pub call_active: bool,
    pub plan_active: bool,
}

/// Applies a rule registry to records, one at a time, in feed order.
#[derive(Debug, Clone)]
pub struct Classifier<'r> {
    registry: &'r RuleRegistry,
    state: ConversationState,
}

impl<'r> Classifier<'r> {
    pub fn new(registry: &'r RuleRegistry) -> Self {
        Self {
            registry,
            state: ConversationState::default(),
        }
    }

    /// The conversation state after the records classified so far.
    pub fn state(&self) -> ConversationState {
        self.state
    }

    /// Classifies one record into exactly one message.
    ///
    /// The sender and every complete reaction are resolved through
    /// `participants`; rules may resolve further names they capture.
    pub fn classify(&mut self, record: RawRecord, participants: &mut ParticipantResolver) -> Message {
        let sender = match record.sender_name.as_deref() {
            Some(name) => participants.resolve(name),
            None => participants.unknown(),
        };
        let reactions = resolve_reactions(&record, participants);

        let registry = self.registry;
        let mut body = None;
        for rule in registry.rules() {
            let Some(captures) = rule.accept(&record, &self.state) else {
                continue;
            };
            tracing::trace!(rule = %rule.id, timestamp_ms = record.timestamp_ms, "rule matched");
            let mut extraction = Extraction {
                record: &record,
                captures: &captures,
                sender,
                participants: &mut *participants,
                state: &mut self.state,
            };
            body = Some((rule.extract)(&mut extraction));
            break;
        }

        let body = body.unwrap_or_else(|| {
            tracing::debug!(
                timestamp_ms = record.timestamp_ms,
                record_type = record.record_type().unwrap_or("-"),
                "record not recognized"
            );
            MessageBody::Unrecognized
        });

        Message {
            header: MessageHeader {
                sender,
                timestamp_ms: record.timestamp_ms,
                reactions,
                raw: record,
            },
            body,
        }
    }
}

fn resolve_reactions(record: &RawRecord, participants: &mut ParticipantResolver) -> Vec<Reaction> {
    let Some(raw) = record.reactions.as_deref() else {
        return Vec::new();
    };

    raw.iter()
        .filter_map(|reaction| match (&reaction.reaction, &reaction.actor) {
            (Some(emoji), Some(actor)) => Some(Reaction {
                emoji: emoji.clone(),
                sender: participants.resolve(actor),
            }),
            _ => {
                tracing::warn!(
                    timestamp_ms = record.timestamp_ms,
                    "dropping reaction without emoji or actor"
                );
                None
            }
        })
        .collect()
}
