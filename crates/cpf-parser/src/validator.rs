//! Structural validation of CPF v1 text. Never fails; collects every issue it can.

use crate::match_block_header;
use cpf_core::grammar::{
    FIELD_SEPARATOR, FORMAT_HEADER, HEREDOC_CLOSE, HEREDOC_OPEN, METADATA_FIELDS, METADATA_PREFIX,
    SECTION_SEPARATOR,
};
use cpf_core::Sigil;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("ERROR"),
            Self::Warning => f.write_str("WARNING"),
        }
    }
}

/// A single validation issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub line: usize,
    pub message: String,
    pub severity: Severity,
}

impl ValidationIssue {
    fn error(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
            severity: Severity::Error,
        }
    }

    fn warning(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] Line {}: {}", self.severity, self.line, self.message)
    }
}

/// Validate a CPF v1 document. An empty list means valid.
pub fn validate(text: &str) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let lines: Vec<&str> = text.lines().collect();

    if lines.is_empty() {
        issues.push(ValidationIssue::error(1, "Empty document"));
        return issues;
    }

    let header = lines[0].trim();
    if header != FORMAT_HEADER {
        issues.push(ValidationIssue::error(
            1,
            format!("Expected '{FORMAT_HEADER}', got '{header}'"),
        ));
        return issues;
    }

    let Some(meta_line) = lines.get(1).map(|l| l.trim()) else {
        issues.push(ValidationIssue::error(2, "Missing metadata line"));
        return issues;
    };
    match meta_line.strip_prefix(METADATA_PREFIX) {
        None => issues.push(ValidationIssue::error(
            2,
            format!("Expected metadata starting with '{METADATA_PREFIX}'"),
        )),
        Some(fields) => {
            let count = fields.split(FIELD_SEPARATOR).count();
            if count < METADATA_FIELDS {
                issues.push(ValidationIssue::error(
                    2,
                    format!("Metadata needs {METADATA_FIELDS} pipe-separated fields, got {count}"),
                ));
            }
        }
    }

    let Some(separator) = lines.get(2).map(|l| l.trim()) else {
        issues.push(ValidationIssue::error(
            3,
            format!("Missing '{SECTION_SEPARATOR}' separator"),
        ));
        return issues;
    };
    if separator != SECTION_SEPARATOR {
        issues.push(ValidationIssue::error(
            3,
            format!("Expected '{SECTION_SEPARATOR}', got '{separator}'"),
        ));
    }

    let mut block_ids: HashSet<&str> = HashSet::new();
    let mut heredoc_start: Option<usize> = None;
    let mut i = 3;

    while i < lines.len() {
        let line = lines[i].trim();

        if heredoc_start.is_some() {
            if line == HEREDOC_CLOSE {
                heredoc_start = None;
            }
            i += 1;
            continue;
        }

        if line.is_empty() {
            i += 1;
            continue;
        }

        if let Some((letter, block_id)) = match_block_header(line) {
            let sigil = Sigil::from_char(letter);
            if sigil.is_none() {
                issues.push(ValidationIssue::error(
                    i + 1,
                    format!("Unknown sigil '{letter}'. Valid: {}", Sigil::valid_letters()),
                ));
            }

            if block_id.is_empty() {
                issues.push(ValidationIssue::error(i + 1, "Block ID is empty"));
            } else if !block_ids.insert(block_id) {
                issues.push(ValidationIssue::warning(
                    i + 1,
                    format!("Duplicate block ID '{block_id}'"),
                ));
            }

            if sigil.is_some_and(Sigil::is_heredoc) {
                if lines.get(i + 1).map(|l| l.trim()) == Some(HEREDOC_OPEN) {
                    heredoc_start = Some(i + 1);
                    i += 2;
                    continue;
                }
                issues.push(ValidationIssue::error(
                    i + 1,
                    format!("@{letter} block must be followed by '{HEREDOC_OPEN}'"),
                ));
            }
        }

        i += 1;
    }

    if let Some(start) = heredoc_start {
        issues.push(ValidationIssue::error(
            start + 1,
            format!("Unclosed heredoc block (missing '{HEREDOC_CLOSE}')"),
        ));
    }

    issues
}

/// True when there are no error-severity issues. Warnings are allowed.
pub fn is_valid(text: &str) -> bool {
    !validate(text).iter().any(ValidationIssue::is_error)
}
