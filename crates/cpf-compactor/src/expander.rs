//! Line expander: one CPF line -> approximate English prose.
//!
//! Not an exact inverse of the compressor. Structure comes back, wording
//! does not.

use cpf_core::grammar::{PREFERENCE_CLOSE, PREFERENCE_OPEN, PRIORITY_MARKER};
use cpf_core::{Operator, PhraseMap, Sigil};
use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;

static NUMBERED_RE: LazyLock<Regex> = LazyLock::new(|| {
    let marker = regex::escape(&PRIORITY_MARKER.to_string());
    Regex::new(&format!(r"^{marker}(\d+)\s+(.+)$")).unwrap()
});
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Stand-in for a constant while abbreviation tokens are expanded around it.
const CONSTANT_PLACEHOLDER_OPEN: char = '\u{E000}';
const CONSTANT_PLACEHOLDER_CLOSE: char = '\u{E001}';

/// Expands lines against one decode table. Tokens are held longest first so
/// a short token never consumes part of a longer one.
pub struct LineExpander {
    tokens: Vec<(String, String)>,
    constants: Vec<(String, String)>,
}

impl LineExpander {
    pub fn new(decode: &PhraseMap) -> Self {
        Self {
            tokens: longest_first(decode.iter()),
            constants: Vec::new(),
        }
    }

    /// Document constants (`@C` pairs). Their values are substituted verbatim,
    /// never run through the abbreviation tokens.
    pub fn with_constants(mut self, constants: &IndexMap<String, String>) -> Self {
        self.constants = longest_first(constants.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        self
    }

    /// Expand a single line. Blob content is returned untouched; blank lines give "".
    pub fn expand_line(&self, line: &str, sigil: Sigil) -> String {
        if sigil == Sigil::Blob {
            return line.to_string();
        }
        let text = line.trim();
        if text.is_empty() {
            return String::new();
        }

        if let Some(op) = Operator::leading(text) {
            let rest = &text[op.symbol().len()..];
            match op {
                Operator::IfNot => return format!("- Unless {}", self.conditional(rest)),
                Operator::If => return format!("- If {}", self.conditional(rest)),
                Operator::Never => return format!("- Do NOT {}.", self.expand_fragment(rest)),
                Operator::Emphasis => {
                    return format!("- **{}.**", capitalize(&self.expand_fragment(rest)))
                }
                _ => {}
            }
        }
        if let Some(caps) = NUMBERED_RE.captures(text) {
            let content = self.expand_fragment(&caps[2]);
            return format!("{}. {}", &caps[1], capitalize(&content));
        }
        if let Some((preferred, over)) = split_preference(text) {
            return format!(
                "- Prefer {} over {}.",
                self.expand_fragment(preferred),
                self.expand_fragment(over)
            );
        }

        let delegate = Operator::Delegate.symbol();
        if !text.starts_with(delegate) {
            if let Some((key, value)) = text.split_once(Operator::Definition.symbol()) {
                return format!(
                    "- **{}:** {}.",
                    capitalize(&self.expand_fragment(key)),
                    self.expand_fragment(value)
                );
            }
        }
        if let Some(rest) = text.strip_prefix(delegate) {
            return format!("- See {}.", self.expand_fragment(rest));
        }

        format!("- {}.", capitalize(&self.expand_fragment(text)))
    }

    /// `cond->action[;else]` without its leading `?` / `?!`.
    fn conditional(&self, text: &str) -> String {
        let Some((condition, action)) = text.split_once(Operator::Then.symbol()) else {
            return format!("{}.", self.expand_fragment(text));
        };
        let condition = self.expand_fragment(condition);

        let Some((action, otherwise)) = action.split_once(Operator::Else.symbol()) else {
            return format!("{condition}: {}.", self.expand_fragment(action));
        };
        let action = self.expand_fragment(action);
        let otherwise = otherwise.trim();
        match otherwise.strip_prefix(Operator::Never.symbol()) {
            Some(negated) => format!(
                "{condition}: {action}. Do NOT {}.",
                self.expand_fragment(negated)
            ),
            None => format!(
                "{condition}: {action}. Otherwise, {}.",
                self.expand_fragment(otherwise)
            ),
        }
    }

    /// Constants out of the way, operators to words, tokens to full phrases,
    /// then constants back in.
    pub fn expand_fragment(&self, text: &str) -> String {
        let mut text = text.to_string();
        for (i, (key, _)) in self.constants.iter().enumerate() {
            text = replace_letter_bounded(&text, key, &constant_placeholder(i));
        }

        let text = text
            .replace(Operator::Produces.symbol(), " results in ")
            .replace(Operator::Then.symbol(), " then ")
            .replace(Operator::Delegate.symbol(), "see ");
        let text = replace_outside_parens(&text, Operator::And.symbol(), " and ");
        let mut text = replace_outside_parens(&text, Operator::Or.symbol(), " or ");

        for (token, full) in &self.tokens {
            text = replace_letter_bounded(&text, token, full);
        }
        for (i, (_, value)) in self.constants.iter().enumerate() {
            text = text.replace(&constant_placeholder(i), value);
        }
        WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
    }
}

fn constant_placeholder(index: usize) -> String {
    format!("{CONSTANT_PLACEHOLDER_OPEN}{index}{CONSTANT_PLACEHOLDER_CLOSE}")
}

fn longest_first<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = pairs
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    pairs.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));
    pairs
}

impl Default for LineExpander {
    fn default() -> Self {
        Self::new(&cpf_core::AbbreviationTable::builtin().decode)
    }
}

/// `prefer(A)>B` -> `(A, B)`. `A` is the shortest run up to the first `)>`.
fn split_preference(text: &str) -> Option<(&str, &str)> {
    let inner = text.strip_prefix(PREFERENCE_OPEN)?;
    let (preferred, over) = inner.split_once(PREFERENCE_CLOSE)?;
    if preferred.is_empty() || over.is_empty() {
        return None;
    }
    Some((preferred, over))
}

/// Replace `needle` with `replacement` at parenthesis depth zero only.
fn replace_outside_parens(text: &str, needle: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        if depth == 0 && !needle.is_empty() && rest.starts_with(needle) {
            out.push_str(replacement);
            rest = &rest[needle.len()..];
            continue;
        }
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}

/// Replace every occurrence of `token` not touching an ASCII letter on either side.
fn replace_letter_bounded(text: &str, token: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (start, _) in text.match_indices(token) {
        if start < last {
            continue;
        }
        let end = start + token.len();
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();
        let bounded = !before.is_some_and(|c| c.is_ascii_alphabetic())
            && !after.is_some_and(|c| c.is_ascii_alphabetic());
        if bounded {
            out.push_str(&text[last..start]);
            out.push_str(replacement);
            last = end;
        }
    }
    out.push_str(&text[last..]);
    out
}

/// Uppercase the first character when it is lowercase.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_lowercase() => first.to_uppercase().chain(chars).collect(),
        _ => text.to_string(),
    }
}

/// `mod-first` -> `Mod First`. Every letter following a non-letter is uppercased,
/// the rest lowercased.
pub fn title_case(block_id: &str) -> String {
    let mut out = String::with_capacity(block_id.len());
    let mut at_word_start = true;
    for c in block_id.replace('-', " ").chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Expand one line against an explicit decode table.
pub fn expand_line(line: &str, decode: &PhraseMap, sigil: Sigil) -> String {
    LineExpander::new(decode).expand_line(line, sigil)
}
