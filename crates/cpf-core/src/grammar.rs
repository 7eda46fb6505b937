//! CPF v1 grammar constants: sigils, operators, structural markers.
//!
//! Parser, formatter, validator and the line codec all read from here.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const VERSION: &str = "v1";
pub const FORMAT_HEADER: &str = "CPF|v1";
pub const METADATA_PREFIX: &str = "M|";
pub const FIELD_SEPARATOR: char = '|';
pub const SECTION_SEPARATOR: &str = "---";
pub const HEREDOC_OPEN: &str = "<<";
pub const HEREDOC_CLOSE: &str = ">>";

/// Number of metadata fields after the prefix: doc_id, title, source, timestamp.
pub const METADATA_FIELDS: usize = 4;

/// `@<SIGIL>:<block_id>`. The id group may be empty so callers can report it.
pub const BLOCK_HEADER_PATTERN: &str = r"^@([A-Z]):(.*)$";

/// Leading marker of a numbered/priority line (`#1 text`).
pub const PRIORITY_MARKER: char = '#';

/// Prefix of a path alias reference (`$settings-php`).
pub const ALIAS_PREFIX: char = '$';

/// Preference notation: `prefer(A)>B`.
pub const PREFERENCE_OPEN: &str = "prefer(";
pub const PREFERENCE_CLOSE: &str = ")>";

/// Block type. Each block starts with `@SIGIL:block-id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub enum Sigil {
    Rule,
    Priority,
    Negation,
    Sequence,
    Tone,
    Exact,
    Zone,
    Constant,
    Blob,
}

impl Sigil {
    pub const ALL: [Sigil; 9] = [
        Sigil::Rule,
        Sigil::Priority,
        Sigil::Negation,
        Sigil::Sequence,
        Sigil::Tone,
        Sigil::Exact,
        Sigil::Zone,
        Sigil::Constant,
        Sigil::Blob,
    ];

    pub fn as_char(self) -> char {
        match self {
            Self::Rule => 'R',
            Self::Priority => 'P',
            Self::Negation => 'N',
            Self::Sequence => 'S',
            Self::Tone => 'T',
            Self::Exact => 'X',
            Self::Zone => 'Z',
            Self::Constant => 'C',
            Self::Blob => 'B',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_char() == c)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Rule => "rule",
            Self::Priority => "priority",
            Self::Negation => "negation",
            Self::Sequence => "sequence",
            Self::Tone => "tone",
            Self::Exact => "exact",
            Self::Zone => "zone",
            Self::Constant => "constant",
            Self::Blob => "blob",
        }
    }

    /// Blob blocks carry verbatim heredoc content.
    pub fn is_heredoc(self) -> bool {
        self == Self::Blob
    }

    /// Comma-separated letters in declaration order, for diagnostics.
    pub fn valid_letters() -> String {
        Self::ALL
            .iter()
            .map(|s| s.as_char().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Sigil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl TryFrom<char> for Sigil {
    type Error = String;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Self::from_char(c).ok_or_else(|| format!("unknown sigil '{c}'"))
    }
}

impl From<Sigil> for char {
    fn from(s: Sigil) -> char {
        s.as_char()
    }
}

/// Operators that stand in for English grammar inside block content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    IfNot,
    Then,
    Never,
    Definition,
    Delegate,
    Produces,
    If,
    Else,
    And,
    Or,
    Emphasis,
    Approx,
}

/// Ordered longest-first so multi-char operators match before single-char.
pub const OPERATORS: [(&str, Operator); 12] = [
    ("?!", Operator::IfNot),
    ("->", Operator::Then),
    ("!!", Operator::Never),
    ("::", Operator::Definition),
    ("@>", Operator::Delegate),
    ("=>", Operator::Produces),
    ("?", Operator::If),
    (";", Operator::Else),
    ("+", Operator::And),
    ("|", Operator::Or),
    ("*", Operator::Emphasis),
    ("~", Operator::Approx),
];

impl Operator {
    pub fn symbol(self) -> &'static str {
        OPERATORS
            .iter()
            .find(|(_, op)| *op == self)
            .map(|(sym, _)| *sym)
            .unwrap_or_default()
    }

    /// Longest operator that `text` starts with.
    pub fn leading(text: &str) -> Option<Self> {
        OPERATORS
            .iter()
            .find(|(sym, _)| text.starts_with(sym))
            .map(|(_, op)| *op)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
