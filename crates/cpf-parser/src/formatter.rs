//! `Document` -> CPF v1 text.

use cpf_core::grammar::{
    FIELD_SEPARATOR, FORMAT_HEADER, HEREDOC_CLOSE, HEREDOC_OPEN, METADATA_PREFIX, SECTION_SEPARATOR,
};
use cpf_core::Document;

/// Render a document. Always ends with exactly one newline.
pub fn format_document(doc: &Document) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(3 + doc.blocks.len() * 4);

    lines.push(FORMAT_HEADER.to_string());
    let separator = FIELD_SEPARATOR.to_string();
    lines.push(format!("{METADATA_PREFIX}{}", doc.metadata.fields().join(&separator)));
    lines.push(SECTION_SEPARATOR.to_string());

    for block in &doc.blocks {
        lines.push(String::new());
        lines.push(block.header());
        if block.is_heredoc {
            lines.push(HEREDOC_OPEN.to_string());
            lines.extend(block.lines.iter().cloned());
            lines.push(HEREDOC_CLOSE.to_string());
        } else {
            lines.extend(trim_blank_edges(&block.lines).iter().cloned());
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Blank lines at either end of a non-blob block do not survive a parse, so
/// they are not written either.
fn trim_blank_edges(lines: &[String]) -> &[String] {
    let blank = |l: &String| l.trim().is_empty();
    let start = lines.iter().position(|l| !blank(l)).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !blank(l)).map_or(start, |i| i + 1);
    &lines[start..end]
}
