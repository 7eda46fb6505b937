//! CPF text -> `Document`. Single forward pass over lines, one line of lookahead
//! for the heredoc opener.

use crate::match_block_header;
use crate::traits::DocumentParser;
use cpf_core::grammar::{
    FIELD_SEPARATOR, FORMAT_HEADER, HEREDOC_CLOSE, HEREDOC_OPEN, METADATA_FIELDS, METADATA_PREFIX,
    SECTION_SEPARATOR,
};
use cpf_core::{Block, Document, Metadata, ParseError, Sigil};

/// Parse a CPF v1 string into a `Document`.
pub fn parse(text: &str) -> Result<Document, ParseError> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.is_empty() {
        return Err(ParseError::new(1, "Empty document"));
    }

    let header = lines[0].trim();
    if header != FORMAT_HEADER {
        return Err(ParseError::new(
            1,
            format!("Expected '{FORMAT_HEADER}', got '{header}'"),
        ));
    }

    let meta_line = lines.get(1).map(|l| l.trim()).unwrap_or_default();
    if !meta_line.starts_with(METADATA_PREFIX) {
        return Err(ParseError::new(
            2,
            format!("Expected metadata line starting with '{METADATA_PREFIX}'"),
        ));
    }
    let metadata = parse_metadata(meta_line, 2)?;

    if lines.get(2).map(|l| l.trim()) != Some(SECTION_SEPARATOR) {
        return Err(ParseError::new(
            3,
            format!("Expected '{SECTION_SEPARATOR}' separator"),
        ));
    }

    let mut blocks = Vec::new();
    let mut i = 3;
    while i < lines.len() {
        let line = lines[i].trim();
        if line.is_empty() {
            i += 1;
            continue;
        }

        let Some((letter, block_id)) = match_block_header(line) else {
            // Stray content outside any block is tolerated.
            tracing::trace!(line = i + 1, "skipping orphan line");
            i += 1;
            continue;
        };

        let sigil = Sigil::from_char(letter).ok_or_else(|| {
            ParseError::new(
                i + 1,
                format!("Unknown sigil '{letter}'. Valid: {}", Sigil::valid_letters()),
            )
        })?;
        if block_id.is_empty() {
            return Err(ParseError::new(i + 1, "Block ID is empty"));
        }

        let (next, content) = if sigil.is_heredoc() {
            parse_heredoc(&lines, i + 1)?
        } else {
            parse_content_lines(&lines, i + 1)
        };
        tracing::debug!(sigil = %sigil, block_id, lines = content.len(), "parsed block");
        blocks.push(Block::new(sigil, block_id, content));
        i = next;
    }

    Ok(Document::new(metadata, blocks))
}

/// `M|id|title|source|timestamp`. Fields past the fourth are ignored.
fn parse_metadata(line: &str, line_num: usize) -> Result<Metadata, ParseError> {
    let parts: Vec<&str> = line[METADATA_PREFIX.len()..]
        .split(FIELD_SEPARATOR)
        .map(str::trim)
        .collect();
    if parts.len() < METADATA_FIELDS {
        return Err(ParseError::new(
            line_num,
            format!(
                "Metadata needs {METADATA_FIELDS} pipe-separated fields after '{METADATA_PREFIX}', got {}",
                parts.len()
            ),
        ));
    }
    Ok(Metadata::new(parts[0], parts[1], parts[2], parts[3]))
}

/// Collect lines until the next block header or EOF.
/// Leading blank lines are dropped and trailing ones trimmed.
fn parse_content_lines(lines: &[&str], start: usize) -> (usize, Vec<String>) {
    let mut content: Vec<String> = Vec::new();
    let mut i = start;
    while i < lines.len() {
        let line = lines[i];
        if match_block_header(line.trim()).is_some() {
            break;
        }
        if content.is_empty() && line.trim().is_empty() {
            i += 1;
            continue;
        }
        content.push(line.trim_end().to_string());
        i += 1;
    }
    while content.last().is_some_and(|l| l.trim().is_empty()) {
        content.pop();
    }
    (i, content)
}

/// `start` must hold the heredoc opener. Returns the index after the closer.
fn parse_heredoc(lines: &[&str], start: usize) -> Result<(usize, Vec<String>), ParseError> {
    if lines.get(start).map(|l| l.trim()) != Some(HEREDOC_OPEN) {
        return Err(ParseError::new(
            start + 1,
            format!("Expected '{HEREDOC_OPEN}' to start heredoc block"),
        ));
    }

    let mut content = Vec::new();
    for (i, line) in lines.iter().enumerate().skip(start + 1) {
        if line.trim() == HEREDOC_CLOSE {
            return Ok((i + 1, content));
        }
        content.push(line.trim_end().to_string());
    }

    Err(ParseError::new(
        start + 1,
        format!("Unclosed heredoc block (missing '{HEREDOC_CLOSE}')"),
    ))
}

/// Parser for `.cpf` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpfParser;

impl CpfParser {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentParser for CpfParser {
    fn name(&self) -> &'static str {
        "cpf"
    }

    fn parse_content(&self, content: &str) -> cpf_core::Result<Document> {
        Ok(parse(content)?)
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &["cpf"]
    }
}
