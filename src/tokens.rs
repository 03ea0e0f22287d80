//! Content templates and the tokens they split content into.
//!
//! The exporter writes system events as ordinary English sentences with
//! names interpolated: `"Jacob added Joseph as a group admin."`. Rules
//! recognize such sentences with a [`Template`] like
//! `"{sender} added {participant} as a group admin\."`, where `{...}` marks
//! a placeholder [`Slot`] and the text between placeholders is a regex
//! fragment matched literally.
//!
//! Matching a content string against a template splits it into ordered
//! [`Token`]s (literal spans and placeholder captures) that concatenate back
//! to the original content.
//!
//! # Trailing periods
//!
//! The exporter appends a `.` to generated sentences that end with an
//! interpolated value, unless that value already ends in `.`, `!` or `?`.
//! A template ending in a placeholder therefore:
//!
//! - never matches content that does not end in `.`, `!` or `?`;
//! - first tries to match without a single trailing `.` (one not preceded by
//!   other punctuation), so `"... nickname to Don 2.0."` captures `"Don 2.0"`.

use regex::Regex;
use thiserror::Error;

use crate::error::TemplateDefect;

/// A placeholder kind inside a [`Template`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// How the sender appears in the sentence: a name, a first name or "You".
    Sender,
    /// The full account name of another participant.
    Participant,
    /// The first name of a participant.
    FirstName,
    /// Free text.
    Anything,
    PlanDateTime,
    PlanTitle,
    /// An hour like `12 PM`.
    PlanTime,
    PollName,
    PollOption,
    /// A decimal integer.
    Number,
    Emoji,
    AppName,
    AppScore,
}

impl Slot {
    /// Returns the placeholder name used inside `{...}`.
    pub fn name(self) -> &'static str {
        match self {
            Slot::Sender => "sender",
            Slot::Participant => "participant",
            Slot::FirstName => "first_name",
            Slot::Anything => "anything",
            Slot::PlanDateTime => "plan_date_time",
            Slot::PlanTitle => "plan_title",
            Slot::PlanTime => "plan_time",
            Slot::PollName => "poll_name",
            Slot::PollOption => "poll_option",
            Slot::Number => "number",
            Slot::Emoji => "emoji",
            Slot::AppName => "app_name",
            Slot::AppScore => "app_score",
        }
    }

    /// Returns the regex this slot captures (without the enclosing group).
    pub fn pattern(self) -> &'static str {
        match self {
            Slot::PlanTime => r"\d{1,2} (?:AM|PM)",
            Slot::Number => r"\d+",
            // Stops before an optional "points" unit in app templates.
            Slot::AppScore => ".*?",
            _ => ".*",
        }
    }

    /// Looks a slot up by its placeholder name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|slot| slot.name() == name)
    }

    /// Returns all slots.
    pub fn all() -> &'static [Slot] {
        &[
            Slot::Sender,
            Slot::Participant,
            Slot::FirstName,
            Slot::Anything,
            Slot::PlanDateTime,
            Slot::PlanTitle,
            Slot::PlanTime,
            Slot::PollName,
            Slot::PollOption,
            Slot::Number,
            Slot::Emoji,
            Slot::AppName,
            Slot::AppScore,
        ]
    }
}

/// A lexical unit of content that matched a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'c> {
    /// Text fixed by the template.
    Literal(&'c str),
    /// Text captured by a placeholder.
    Placeholder { slot: Slot, text: &'c str },
}

impl<'c> Token<'c> {
    /// Returns the span of content this token covers.
    pub fn text(&self) -> &'c str {
        match *self {
            Token::Literal(text) | Token::Placeholder { text, .. } => text,
        }
    }
}

/// Tokens of a successful match, with lookups by slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures<'c> {
    tokens: Vec<Token<'c>>,
}

impl<'c> Captures<'c> {
    /// Returns the first capture for `slot`.
    pub fn get(&self, slot: Slot) -> Option<&'c str> {
        self.all(slot).next()
    }

    /// Returns the `n`th (zero-based) capture for `slot`.
    pub fn nth(&self, slot: Slot, n: usize) -> Option<&'c str> {
        self.all(slot).nth(n)
    }

    /// Iterates over every capture for `slot`, in content order.
    pub fn all(&self, slot: Slot) -> impl Iterator<Item = &'c str> + '_ {
        self.tokens.iter().filter_map(move |token| match token {
            Token::Placeholder { slot: s, text } if *s == slot => Some(*text),
            _ => None,
        })
    }

    pub fn tokens(&self) -> &[Token<'c>] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<Token<'c>> {
        self.tokens
    }
}

/// One parsed element of a template source string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    Literal(String),
    Slot(Slot),
}

/// Failure to turn a template source into a [`Template`].
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error(transparent)]
    Defect(#[from] TemplateDefect),
    #[error(transparent)]
    Pattern(#[from] regex::Error),
}

/// A compiled content template.
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
    slots: Vec<Slot>,
    regex: Regex,
    ends_with_slot: bool,
}

impl Template {
    /// Parses and compiles a template source string.
    pub fn compile(source: &str) -> Result<Self, TemplateError> {
        let pieces = parse_pieces(source)?;

        let mut pattern = String::from("^");
        let mut slots = Vec::new();
        for piece in &pieces {
            match piece {
                Piece::Literal(literal) => {
                    check_literal(literal)?;
                    pattern.push_str(literal);
                }
                Piece::Slot(slot) => {
                    slots.push(*slot);
                    pattern.push('(');
                    pattern.push_str(slot.pattern());
                    pattern.push(')');
                }
            }
        }
        pattern.push('$');

        let regex = Regex::new(&pattern).map_err(TemplateError::Pattern)?;
        let ends_with_slot = matches!(pieces.last(), Some(Piece::Slot(_)));

        Ok(Self {
            source: source.to_string(),
            slots,
            regex,
            ends_with_slot,
        })
    }

    /// Returns the source string this template was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the placeholder slots in order of appearance.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Matches `content`, returning its tokens on success.
    pub fn captures<'c>(&self, content: &'c str) -> Option<Captures<'c>> {
        if self.ends_with_slot {
            let last = content.chars().next_back()?;
            if !is_terminal_punctuation(last) {
                return None;
            }
            if ends_with_single_dot(content) {
                let (body, dot) = content.split_at(content.len() - 1);
                if let Some(mut tokens) = self.match_exact(body) {
                    tokens.push(Token::Literal(dot));
                    return Some(Captures { tokens });
                }
            }
        }
        self.match_exact(content).map(|tokens| Captures { tokens })
    }

    /// Returns `true` if `content` matches this template.
    pub fn is_match(&self, content: &str) -> bool {
        self.captures(content).is_some()
    }

    /// Splits `content` into tokens.
    ///
    /// Absent, empty and non-matching content all yield an empty sequence.
    pub fn tokenize<'c>(&self, content: Option<&'c str>) -> Vec<Token<'c>> {
        match content {
            Some(content) if !content.is_empty() => self
                .captures(content)
                .map(Captures::into_tokens)
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    fn match_exact<'c>(&self, content: &'c str) -> Option<Vec<Token<'c>>> {
        let caps = self.regex.captures(content)?;
        let mut tokens = Vec::with_capacity(self.slots.len() * 2 + 1);
        let mut cursor = 0;

        for (index, slot) in self.slots.iter().enumerate() {
            let group = caps.get(index + 1)?;
            if group.start() > cursor {
                tokens.push(Token::Literal(&content[cursor..group.start()]));
            }
            tokens.push(Token::Placeholder {
                slot: *slot,
                text: group.as_str(),
            });
            cursor = group.end();
        }
        if cursor < content.len() {
            tokens.push(Token::Literal(&content[cursor..]));
        }

        Some(tokens)
    }
}

/// Splits a template source into literal and placeholder pieces.
pub fn parse_pieces(source: &str) -> Result<Vec<Piece>, TemplateDefect> {
    let mut pieces = Vec::new();
    let mut rest = source;

    while let Some(open) = rest.find('{') {
        if open > 0 {
            pieces.push(Piece::Literal(rest[..open].to_string()));
        }
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or(TemplateDefect::UnterminatedPlaceholder)?;
        let name = &after[..close];
        let slot =
            Slot::from_name(name).ok_or_else(|| TemplateDefect::UnknownPlaceholder(name.into()))?;
        pieces.push(Piece::Slot(slot));
        rest = &after[close + 1..];
    }
    if !rest.is_empty() {
        pieces.push(Piece::Literal(rest.to_string()));
    }

    Ok(pieces)
}

// A literal must not add capture groups (they would shift slot indices) and
// every '.' must be escaped.
fn check_literal(literal: &str) -> Result<(), TemplateDefect> {
    let mut previous = None;
    let mut chars = literal.chars().peekable();

    while let Some(c) = chars.next() {
        let escaped = previous == Some('\\');
        match c {
            '.' if !escaped => return Err(TemplateDefect::UnescapedDot(literal.to_string())),
            '(' if !escaped && chars.peek() != Some(&'?') => {
                return Err(TemplateDefect::CapturingGroup(literal.to_string()));
            }
            _ => {}
        }
        // An escaped backslash does not escape what follows it.
        previous = if escaped && c == '\\' { None } else { Some(c) };
    }

    Ok(())
}

fn is_terminal_punctuation(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn ends_with_single_dot(content: &str) -> bool {
    let mut rev = content.chars().rev();
    rev.next() == Some('.') && rev.next().is_some_and(|c| !is_terminal_punctuation(c))
}
