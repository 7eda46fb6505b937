//! CPF v1 text layer: strict parser, deterministic formatter, and validator.

pub mod formatter;
pub mod parser;
pub mod traits;
pub mod validator;

pub use formatter::format_document;
pub use parser::{parse, CpfParser};
pub use validator::{is_valid, validate, Severity, ValidationIssue};

use cpf_core::grammar::BLOCK_HEADER_PATTERN;
use regex::Regex;
use std::sync::LazyLock;

static BLOCK_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(BLOCK_HEADER_PATTERN).unwrap());

/// Split a trimmed `@X:id` line into its sigil letter and trimmed id.
/// The letter is not checked against the sigil set.
pub fn match_block_header(line: &str) -> Option<(char, &str)> {
    let caps = BLOCK_HEADER_RE.captures(line)?;
    let letter = caps.get(1)?.as_str().chars().next()?;
    let id = caps.get(2)?.as_str().trim();
    Some((letter, id))
}

#[cfg(test)]
mod tests;
