//! Participant identities within one chat.
//!
//! Every name seen while building a chat (as a sender, a reaction actor, a
//! declared member, or a name mentioned in a system sentence) is mapped to
//! exactly one [`Participant`]. Identity is the [`ParticipantId`] handle:
//! two handles from the same chat are equal if and only if they denote the
//! same person. Handles are meaningless across chats.
//!
//! Deleted, blocked and otherwise anonymized accounts are all folded into a
//! single *unknown* participant.

use std::collections::HashMap;
use std::ops::Index;

use serde::Serialize;

/// Display name the exporter uses for anonymized accounts.
pub const UNKNOWN_PARTICIPANT_NAME: &str = "Facebook User";

/// Names the exporter interpolates in place of an identifiable account.
const UNKNOWN_ALIASES: [&str; 6] = [
    UNKNOWN_PARTICIPANT_NAME,
    "a participant",
    "A participant",
    "a contact",
    "A contact",
    "",
];

/// Stable handle to a [`Participant`] owned by a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ParticipantId(usize);

impl ParticipantId {
    /// Returns the position of the participant in creation order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A person taking part in a chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    id: ParticipantId,
    name: String,
    is_owner: bool,
}

impl Participant {
    pub fn id(&self) -> ParticipantId {
        self.id
    }

    /// Account name, or [`UNKNOWN_PARTICIPANT_NAME`] for the unknown sentinel.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` for the person who downloaded the archive.
    pub fn is_owner(&self) -> bool {
        self.is_owner
    }
}

/// Maps names to participant identities while a chat is built.
///
/// The resolver is the only place participants are created.
#[derive(Debug, Clone)]
pub struct ParticipantResolver {
    owner_name: String,
    participants: Vec<Participant>,
    by_name: HashMap<String, ParticipantId>,
    owner: Option<ParticipantId>,
    unknown: Option<ParticipantId>,
}

impl ParticipantResolver {
    /// Creates a resolver for a chat downloaded by `owner_name`.
    pub fn new(owner_name: impl Into<String>) -> Self {
        Self {
            owner_name: owner_name.into(),
            participants: Vec::new(),
            by_name: HashMap::new(),
            owner: None,
            unknown: None,
        }
    }

    /// Returns the participant for `name`, creating it on first sight.
    ///
    /// The owner's name resolves to the owner participant.
    pub fn resolve(&mut self, name: &str) -> ParticipantId {
        let is_owner = name == self.owner_name;
        self.resolve_as(name, is_owner)
    }

    /// Returns the participant for `name`, creating it if it has not been
    /// seen before.
    ///
    /// The first owner request marks the participant as owner, whether it
    /// creates the participant or finds an existing one. Only one participant
    /// per chat can be the owner; later owner requests for other names are
    /// ignored. The owner's own name is never folded into the unknown
    /// participant.
    pub fn resolve_as(&mut self, name: &str, is_owner: bool) -> ParticipantId {
        let wants_owner = is_owner && self.claim_owner(name);
        if let Some(&id) = self.by_name.get(name) {
            if wants_owner {
                self.participants[id.0].is_owner = true;
                self.owner = Some(id);
            }
            return id;
        }
        if !wants_owner && name != self.owner_name && UNKNOWN_ALIASES.contains(&name) {
            return self.unknown();
        }

        let id = self.insert(name, wants_owner);
        if wants_owner {
            self.owner = Some(id);
        }
        id
    }

    fn claim_owner(&self, name: &str) -> bool {
        match self.owner {
            None => true,
            Some(id) if self.participants[id.0].name == name => false,
            Some(_) => {
                tracing::warn!(name, "ignoring second owner request");
                false
            }
        }
    }

    /// Returns the owner participant, creating it if needed.
    pub fn owner(&mut self) -> ParticipantId {
        if let Some(id) = self.owner {
            return id;
        }
        let name = self.owner_name.clone();
        self.resolve_as(&name, true)
    }

    /// Returns the shared unknown participant, creating it on first use.
    pub fn unknown(&mut self) -> ParticipantId {
        if let Some(id) = self.unknown {
            return id;
        }
        // An owner registered under an alias keeps that name.
        let id = match self.by_name.get(UNKNOWN_PARTICIPANT_NAME) {
            Some(&id) => id,
            None => self.insert(UNKNOWN_PARTICIPANT_NAME, false),
        };
        for alias in UNKNOWN_ALIASES {
            self.by_name.entry(alias.to_string()).or_insert(id);
        }
        self.unknown = Some(id);
        id
    }

    /// Looks a name up without creating anything.
    pub fn find(&self, name: &str) -> Option<ParticipantId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.get(id.0)
    }

    /// The owner, if already created.
    pub fn owner_id(&self) -> Option<ParticipantId> {
        self.owner
    }

    /// The unknown sentinel, if already created.
    pub fn unknown_id(&self) -> Option<ParticipantId> {
        self.unknown
    }

    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    /// Iterates over participants in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter()
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    fn insert(&mut self, name: &str, is_owner: bool) -> ParticipantId {
        let id = ParticipantId(self.participants.len());
        self.participants.push(Participant {
            id,
            name: name.to_string(),
            is_owner,
        });
        self.by_name.insert(name.to_string(), id);
        id
    }
}

impl Index<ParticipantId> for ParticipantResolver {
    type Output = Participant;

    /// # Panics
    ///
    /// Panics if `id` was issued by a different resolver.
    fn index(&self, id: ParticipantId) -> &Participant {
        &self.participants[id.0]
    }
}
