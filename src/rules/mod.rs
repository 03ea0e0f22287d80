//! Classification rules and the ordered registry that holds them.
//!
//! A [`Rule`] pairs a predicate with an extractor:
//!
//! - the predicate is an optional structural [`Guard`] over the record and
//!   the [`ConversationState`], plus an optional content [`Template`];
//! - the [`Extractor`] builds the [`MessageBody`] once the predicate holds.
//!
//! Rules are registered once through [`RuleRegistryBuilder`] and the registry
//! is immutable afterwards. Registration order is the only disambiguation
//! between rules whose predicates overlap: the classifier takes the first
//! rule that accepts a record, so narrower rules must come first.
//!
//! # Example
//!
//! ```
//! use chatdemux::message::MessageBody;
//! use chatdemux::rules::{Extraction, Rule, RuleRegistry};
//! use chatdemux::tokens::Slot;
//!
//! fn poke(x: &mut Extraction<'_>) -> MessageBody {
//!     let _target = x.resolve_capture(Slot::Participant);
//!     MessageBody::Text
//! }
//!
//! let registry = RuleRegistry::builder()
//!     .rule(Rule::new("poke", poke).matching(r"{sender} poked {participant}"))
//!     .build()?;
//! assert_eq!(registry.len(), 1);
//! # Ok::<(), chatdemux::DemuxError>(())
//! ```

mod standard;

use std::collections::HashSet;
use std::fmt;

use crate::classifier::ConversationState;
use crate::error::{RegistryError, Result};
use crate::message::MessageBody;
use crate::participant::{ParticipantId, ParticipantResolver};
use crate::raw::RawRecord;
use crate::tokens::{Captures, Slot, Template, TemplateError};

pub use standard::standard_rules;

/// Structural precondition over a record and the conversation so far.
pub type Guard = fn(&RawRecord, &ConversationState) -> bool;

/// Builds the message body for a record a rule accepted.
pub type Extractor = fn(&mut Extraction<'_>) -> MessageBody;

/// A rule as authored, before its template is compiled.
#[derive(Clone)]
pub struct Rule {
    id: String,
    guard: Option<Guard>,
    template: Option<String>,
    extract: Extractor,
}

impl Rule {
    /// Creates a rule that accepts every record.
    ///
    /// Narrow it with [`when`](Self::when) and [`matching`](Self::matching).
    pub fn new(id: impl Into<String>, extract: Extractor) -> Self {
        Self {
            id: id.into(),
            guard: None,
            template: None,
            extract,
        }
    }

    /// Requires `guard` to hold.
    #[must_use]
    pub fn when(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Requires the content to match `template`.
    ///
    /// Records without content never match a templated rule.
    #[must_use]
    pub fn matching(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("guarded", &self.guard.is_some())
            .field("template", &self.template)
            .finish()
    }
}

/// A registered rule with its template compiled.
#[derive(Clone)]
pub(crate) struct CompiledRule {
    pub(crate) id: String,
    pub(crate) guard: Option<Guard>,
    pub(crate) template: Option<Template>,
    pub(crate) extract: Extractor,
}

impl CompiledRule {
    /// Tests the predicate, returning the content captures on acceptance.
    pub(crate) fn accept<'r>(
        &self,
        record: &'r RawRecord,
        state: &ConversationState,
    ) -> Option<Captures<'r>> {
        if let Some(guard) = self.guard {
            if !guard(record, state) {
                return None;
            }
        }
        match &self.template {
            Some(template) => template.captures(record.content()?),
            None => Some(Captures::default()),
        }
    }
}

/// Collects rules in evaluation order.
#[derive(Debug, Default)]
pub struct RuleRegistryBuilder {
    rules: Vec<Rule>,
}

impl RuleRegistryBuilder {
    /// Appends a rule after every rule registered so far.
    #[must_use]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Appends several rules in order.
    #[must_use]
    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Validates ids, compiles templates and freezes the order.
    pub fn build(self) -> Result<RuleRegistry> {
        let mut seen = HashSet::new();
        let mut compiled = Vec::with_capacity(self.rules.len());

        for rule in self.rules {
            if !seen.insert(rule.id.clone()) {
                return Err(RegistryError::DuplicateRule(rule.id).into());
            }
            let template = match rule.template {
                Some(source) => Some(compile_template(&rule.id, &source)?),
                None => None,
            };
            compiled.push(CompiledRule {
                id: rule.id,
                guard: rule.guard,
                template,
                extract: rule.extract,
            });
        }

        tracing::debug!(rules = compiled.len(), "rule registry built");
        Ok(RuleRegistry { rules: compiled })
    }
}

fn compile_template(rule: &str, source: &str) -> std::result::Result<Template, RegistryError> {
    Template::compile(source).map_err(|err| match err {
        TemplateError::Defect(defect) => RegistryError::InvalidTemplate {
            rule: rule.to_string(),
            template: source.to_string(),
            defect,
        },
        TemplateError::Pattern(source) => RegistryError::Pattern {
            rule: rule.to_string(),
            source,
        },
    })
}

/// An ordered, immutable list of rules.
///
/// A universal fallback producing [`MessageBody::Unrecognized`] is implied
/// after the last registered rule.
#[derive(Clone)]
pub struct RuleRegistry {
    rules: Vec<CompiledRule>,
}

impl RuleRegistry {
    pub fn builder() -> RuleRegistryBuilder {
        RuleRegistryBuilder::default()
    }

    /// Builds the registry of every rule this crate knows, in its documented
    /// order. See [`standard_rules`].
    pub fn standard() -> Result<Self> {
        Self::builder().rules(standard_rules()).build()
    }

    /// Rule ids in evaluation order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.id.as_str())
    }

    /// Returns the template source of rule `id`, if it has one.
    pub fn template_of(&self, id: &str) -> Option<&Template> {
        self.rules
            .iter()
            .find(|rule| rule.id == id)
            .and_then(|rule| rule.template.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub(crate) fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}

/// Everything an [`Extractor`] may read or update.
pub struct Extraction<'a> {
    pub record: &'a RawRecord,
    pub captures: &'a Captures<'a>,
    /// The already-resolved sender of the record.
    pub sender: ParticipantId,
    pub participants: &'a mut ParticipantResolver,
    pub state: &'a mut ConversationState,
}

impl Extraction<'_> {
    /// Returns the first capture for `slot`, or an empty string.
    pub fn capture(&self, slot: Slot) -> String {
        self.captures.get(slot).unwrap_or_default().to_string()
    }

    pub fn resolve(&mut self, name: &str) -> ParticipantId {
        self.participants.resolve(name)
    }

    /// Resolves the name captured by `slot` to a participant.
    pub fn resolve_capture(&mut self, slot: Slot) -> ParticipantId {
        let captures = self.captures;
        match captures.get(slot) {
            Some(name) => self.participants.resolve(name),
            None => self.participants.unknown(),
        }
    }

    pub fn owner(&mut self) -> ParticipantId {
        self.participants.owner()
    }

    pub fn unknown(&mut self) -> ParticipantId {
        self.participants.unknown()
    }
}
