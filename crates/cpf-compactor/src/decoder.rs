//! CPF v1 -> English markdown.

use crate::expander::{title_case, LineExpander};
use cpf_core::{AbbreviationOverrides, AbbreviationTable, Document, ParseError, Sigil};
use cpf_parser::parse;

/// Section title prefix per sigil. Sigils without one use the bare block id.
fn sigil_title(sigil: Sigil) -> Option<&'static str> {
    match sigil {
        Sigil::Priority => Some("Priorities"),
        Sigil::Negation => Some("Restrictions"),
        Sigil::Sequence => Some("Steps"),
        Sigil::Exact => Some("Exact Requirements"),
        Sigil::Zone => Some("Scope"),
        Sigil::Rule | Sigil::Tone | Sigil::Constant | Sigil::Blob => None,
    }
}

/// Parse CPF text and render it as markdown.
pub fn decode(text: &str, custom: Option<&AbbreviationOverrides>) -> Result<String, ParseError> {
    let document = parse(text)?;
    Ok(decode_document(&document, custom))
}

/// Render a parsed document as markdown. `@C` constants are substituted
/// verbatim into the lines that reference them and are not rendered themselves.
pub fn decode_document(document: &Document, custom: Option<&AbbreviationOverrides>) -> String {
    let builtin = AbbreviationTable::builtin();
    let expander = match custom {
        Some(overrides) => LineExpander::new(&builtin.with_overrides(overrides).decode),
        None => LineExpander::new(&builtin.decode),
    }
    .with_constants(&document.constants());

    let mut out: Vec<String> = vec![format!("# {}", document.metadata.title), String::new()];

    for block in &document.blocks {
        if block.sigil == Sigil::Constant {
            continue;
        }
        tracing::debug!(block_id = %block.block_id, sigil = %block.sigil, "decoding block");

        out.push(format!("## {}", block_header(block.sigil, &block.block_id)));
        out.push(String::new());

        if block.is_heredoc {
            out.extend(block.lines.iter().cloned());
        } else {
            out.extend(
                block
                    .lines
                    .iter()
                    .map(|line| expander.expand_line(unescape(line), block.sigil))
                    .filter(|line| !line.is_empty()),
            );
        }
        out.push(String::new());
    }

    let mut markdown = out.join("\n").trim_end().to_string();
    markdown.push('\n');
    markdown
}

fn block_header(sigil: Sigil, block_id: &str) -> String {
    let id_title = title_case(block_id);
    match sigil_title(sigil) {
        Some(prefix) => format!("{prefix}: {id_title}"),
        None => id_title,
    }
}

/// Undo the encoder's escape of lines that read as block headers.
fn unescape(line: &str) -> &str {
    match line.strip_prefix('\\') {
        Some(rest) if rest.starts_with('@') => rest,
        _ => line,
    }
}
