use crate::*;
use crate::traits::DocumentParser;
use std::path::Path;
use cpf_core::{Block, Document, Metadata, Sigil};

const SAMPLE_CPF: &str = "CPF|v1
M|test-rules|Test Rules|test.md|2026-01-01T00:00:00Z
---

@R:decision-rules
?mnt mod exists->recommend+link
?mod exists+abd->code custom solution+explain why
?!mod exists->code solution from scratch
!!reinvent wheel
*chk for existing solutions first

@P:default-priorities
#1 stab+sec
#2 perf+cch
#3 maintainability
#4 dx

@R:coding-standards
Follow wp coding standards
prefer(hooks+filters)>core edits
!!expensive queries in loops
!!commit secrets|credentials
";

fn sample_doc() -> Document {
    Document::new(
        Metadata::new("doc", "Doc Title", "src.md", "2026-01-01T00:00:00Z"),
        vec![
            Block::new(Sigil::Rule, "rules", vec!["?x->y".into(), "".into(), "!!z".into()]),
            Block::blob("code", vec!["fn main() {".into(), "    println!(\"hi\");".into(), "}".into()]),
            Block::new(Sigil::Constant, "paths", vec!["$src::/a/b/c".into()]),
        ],
    )
}

// ========== Parser ==========

#[test]
fn test_parse_valid_document() {
    let doc = parse(SAMPLE_CPF).unwrap();
    assert_eq!(doc.version, "v1");
    assert_eq!(doc.metadata.doc_id, "test-rules");
    assert_eq!(doc.metadata.title, "Test Rules");
    assert_eq!(doc.blocks.len(), 3);
}

#[test]
fn test_parse_metadata() {
    let doc = parse("CPF|v1\nM|my-id|My Title|source.md|2026-01-01T00:00:00Z\n---\n").unwrap();
    assert_eq!(doc.metadata.doc_id, "my-id");
    assert_eq!(doc.metadata.title, "My Title");
    assert_eq!(doc.metadata.source, "source.md");
    assert_eq!(doc.metadata.timestamp, "2026-01-01T00:00:00Z");
}

#[test]
fn test_parse_metadata_extra_fields_ignored() {
    let doc = parse("CPF|v1\nM|a|b|c|d|e|f\n---\n").unwrap();
    assert_eq!(doc.metadata.timestamp, "d");
}

#[test]
fn test_parse_metadata_empty_source() {
    let doc = parse("CPF|v1\nM|a|b||d\n---\n").unwrap();
    assert_eq!(doc.metadata.source, "");
}

#[test]
fn test_parse_no_blocks() {
    let doc = parse("CPF|v1\nM|a|b|c|d\n---\n").unwrap();
    assert!(doc.blocks.is_empty());
}

#[test]
fn test_parse_blocks() {
    let doc = parse(SAMPLE_CPF).unwrap();
    assert_eq!(doc.blocks[0].sigil, Sigil::Rule);
    assert_eq!(doc.blocks[0].block_id, "decision-rules");
    assert_eq!(doc.blocks[1].sigil, Sigil::Priority);
    assert_eq!(doc.blocks[1].block_id, "default-priorities");
    assert_eq!(doc.blocks[2].sigil, Sigil::Rule);
    assert_eq!(doc.blocks[2].block_id, "coding-standards");
}

#[test]
fn test_parse_block_content() {
    let doc = parse(SAMPLE_CPF).unwrap();
    let rules = &doc.blocks[0];
    assert_eq!(rules.lines.len(), 5);
    assert_eq!(rules.lines[0], "?mnt mod exists->recommend+link");
    assert!(rules.lines.iter().any(|l| l.starts_with("!!")));
}

#[test]
fn test_parse_heredoc() {
    let text = "CPF|v1\nM|test|Test|test|2026-01-01T00:00:00Z\n---\n\n@B:example\n<<\nThis is raw content.\n  It can have multiple lines.\n>>\n";
    let doc = parse(text).unwrap();
    assert_eq!(doc.blocks.len(), 1);
    let blob = &doc.blocks[0];
    assert_eq!(blob.sigil, Sigil::Blob);
    assert!(blob.is_heredoc);
    assert_eq!(blob.lines, vec!["This is raw content.", "  It can have multiple lines."]);
}

#[test]
fn test_parse_heredoc_keeps_block_header_lookalikes() {
    let text = "CPF|v1\nM|a|b|c|d\n---\n\n@B:raw\n<<\n@R:not-a-block\n>>\n\n@R:after\nx\n";
    let doc = parse(text).unwrap();
    assert_eq!(doc.blocks.len(), 2);
    assert_eq!(doc.blocks[0].lines, vec!["@R:not-a-block"]);
    assert_eq!(doc.blocks[1].block_id, "after");
}

#[test]
fn test_parse_trims_leading_and_trailing_blank_lines() {
    let text = "CPF|v1\nM|a|b|c|d\n---\n@R:r\n\n\nfirst\n\nsecond\n\n\n@R:s\nthird\n";
    let doc = parse(text).unwrap();
    assert_eq!(doc.blocks[0].lines, vec!["first", "", "second"]);
    assert_eq!(doc.blocks[1].lines, vec!["third"]);
}

#[test]
fn test_parse_right_trims_content() {
    let doc = parse("CPF|v1\nM|a|b|c|d\n---\n@R:r\n  indented   \n").unwrap();
    assert_eq!(doc.blocks[0].lines, vec!["  indented"]);
}

#[test]
fn test_parse_skips_orphan_lines() {
    let doc = parse("CPF|v1\nM|a|b|c|d\n---\nstray text\n\n@R:r\nx\n").unwrap();
    assert_eq!(doc.blocks.len(), 1);
    assert_eq!(doc.blocks[0].lines, vec!["x"]);
}

#[test]
fn test_parse_empty_raises() {
    let err = parse("").unwrap_err();
    assert_eq!(err.line, 1);
}

#[test]
fn test_parse_bad_header_raises() {
    let err = parse("WRONG|v1\nM|a|b|c|d\n---\n").unwrap_err();
    assert_eq!(err.line, 1);
    assert!(err.message.contains("CPF|v1"));
}

#[test]
fn test_parse_missing_metadata_raises() {
    let err = parse("CPF|v1\n").unwrap_err();
    assert_eq!(err.line, 2);
}

#[test]
fn test_parse_short_metadata_raises() {
    let err = parse("CPF|v1\nM|a|b|c\n---\n").unwrap_err();
    assert_eq!(err.line, 2);
    assert!(err.message.contains("got 3"));
}

#[test]
fn test_parse_bad_separator_raises() {
    let err = parse("CPF|v1\nM|a|b|c|d\n===\n").unwrap_err();
    assert_eq!(err.line, 3);
}

#[test]
fn test_parse_unknown_sigil_raises() {
    let err = parse("CPF|v1\nM|a|b|c|d\n---\n\n@Q:bad\nstuff\n").unwrap_err();
    assert_eq!(err.line, 5);
    assert!(err.message.contains("'Q'"));
}

#[test]
fn test_parse_empty_block_id_raises() {
    let err = parse("CPF|v1\nM|a|b|c|d\n---\n\n@R:\nstuff\n").unwrap_err();
    assert_eq!(err.line, 5);
}

#[test]
fn test_parse_missing_heredoc_open_raises() {
    let err = parse("CPF|v1\nM|a|b|c|d\n---\n\n@B:blob\nstuff\n>>\n").unwrap_err();
    assert_eq!(err.line, 6);
    assert!(err.message.contains("<<"));
}

#[test]
fn test_parse_unclosed_heredoc_names_open_line() {
    let err = parse("CPF|v1\nM|a|b|c|d\n---\n\n@B:blob\n<<\nstuff\n").unwrap_err();
    assert_eq!(err.line, 6);
    assert!(err.message.contains("Unclosed"));
}

#[test]
fn test_cpf_parser_trait() {
    let parser = CpfParser::new();
    assert_eq!(parser.name(), "cpf");
    assert!(parser.can_parse(Path::new("rules.cpf")));
    assert!(parser.can_parse(Path::new("dir/RULES.CPF")));
    assert!(!parser.can_parse(Path::new("rules.md")));
    assert!(!parser.can_parse(Path::new("cpf")));
    let doc = parser.parse_content(SAMPLE_CPF).unwrap();
    assert_eq!(doc.blocks.len(), 3);
    assert!(parser.parse_content("nope").is_err());
}

#[test]
fn test_cpf_parser_parse_file_missing() {
    let err = CpfParser::new().parse_file(Path::new("/nonexistent/x.cpf")).unwrap_err();
    assert!(matches!(err, cpf_core::CpfError::Io(_)));
    assert!(err.to_string().contains("/nonexistent/x.cpf"));
}

// ========== Formatter ==========

#[test]
fn test_format_layout() {
    let out = format_document(&sample_doc());
    assert!(out.starts_with("CPF|v1\nM|doc|Doc Title|src.md|2026-01-01T00:00:00Z\n---\n\n@R:rules\n?x->y\n"));
    assert!(out.contains("\n\n@B:code\n<<\nfn main() {\n"));
    assert!(out.contains("}\n>>\n"));
    assert!(out.ends_with("$src::/a/b/c\n"));
    assert!(!out.ends_with("\n\n"));
}

#[test]
fn test_format_empty_document() {
    let doc = Document::new(Metadata::new("a", "b", "", "d"), vec![]);
    assert_eq!(format_document(&doc), "CPF|v1\nM|a|b||d\n---\n");
}

#[test]
fn test_format_drops_blank_edge_lines() {
    let doc = Document::new(
        Metadata::new("a", "b", "c", "d"),
        vec![
            Block::new(Sigil::Rule, "x", vec!["".into(), "l".into(), "".into(), "  ".into()]),
            Block::blob("code", vec!["keep".into(), "".into()]),
            Block::new(Sigil::Rule, "y", vec!["m".into(), "".into()]),
        ],
    );
    let out = format_document(&doc);
    assert!(out.contains("\n@R:x\nl\n\n@B:code\n<<\nkeep\n\n>>\n"));
    assert!(out.ends_with("@R:y\nm\n"));

    let parsed = parse(&out).unwrap();
    assert_eq!(parsed.blocks[0].lines, vec!["l"]);
    assert_eq!(parsed.blocks[1].lines, vec!["keep", ""]);
    assert_eq!(format_document(&parsed), out);
}

#[test]
fn test_parse_format_roundtrip() {
    let doc = sample_doc();
    let parsed = parse(&format_document(&doc)).unwrap();
    assert_eq!(parsed, doc);
}

#[test]
fn test_format_parse_sample_roundtrip() {
    let doc = parse(SAMPLE_CPF).unwrap();
    assert_eq!(format_document(&doc), SAMPLE_CPF);
}

// ========== Validator ==========

#[test]
fn test_valid_document() {
    let issues = validate(SAMPLE_CPF);
    assert!(issues.is_empty());
    assert!(is_valid(SAMPLE_CPF));
}

#[test]
fn test_empty_document() {
    let issues = validate("");
    assert_eq!(issues.len(), 1);
    assert!(issues[0].message.contains("Empty"));
}

#[test]
fn test_wrong_header() {
    let issues = validate("WRONG|v1\nM|a|b|c|d\n---\n");
    assert_eq!(issues.len(), 1);
    assert!(issues[0].message.contains("CPF|v1"));
    assert_eq!(issues[0].line, 1);
}

#[test]
fn test_missing_metadata() {
    let issues = validate("CPF|v1\n");
    assert_eq!(issues.len(), 1);
    assert!(issues[0].message.contains("Missing metadata"));
}

#[test]
fn test_bad_metadata_prefix_keeps_going() {
    let issues = validate("CPF|v1\nX|a|b|c|d\n---\n\n@Q:bad\n");
    assert_eq!(issues.len(), 2);
    assert_eq!(issues[0].line, 2);
    assert!(issues[1].message.contains("Unknown sigil"));
}

#[test]
fn test_bad_metadata_fields() {
    let issues = validate("CPF|v1\nM|only-two-fields|title\n---\n");
    assert!(issues.iter().any(|e| e.message.contains("4 pipe-separated")));
}

#[test]
fn test_missing_separator_bails() {
    let issues = validate("CPF|v1\nM|a|b|c|d\n");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].line, 3);
}

#[test]
fn test_wrong_separator_continues() {
    let issues = validate("CPF|v1\nM|a|b|c|d\n***\n\n@R:\n");
    assert_eq!(issues.len(), 2);
    assert!(issues[1].message.contains("Block ID is empty"));
}

#[test]
fn test_unknown_sigil() {
    let issues = validate("CPF|v1\nM|t|t|t|t\n---\n\n@Q:bad\nstuff\n");
    assert!(issues.iter().any(|e| e.message.contains("Unknown sigil") && e.is_error()));
}

#[test]
fn test_duplicate_block_id_is_warning() {
    let text = "CPF|v1\nM|t|t|t|t\n---\n\n@R:same\nline1\n\n@R:same\nline2\n";
    let issues = validate(text);
    assert_eq!(issues.len(), 1);
    assert!(issues[0].message.contains("Duplicate"));
    assert_eq!(issues[0].severity, Severity::Warning);
    assert!(is_valid(text));
}

#[test]
fn test_unclosed_heredoc() {
    let issues = validate("CPF|v1\nM|t|t|t|t\n---\n\n@B:blob\n<<\nstuff\n");
    assert_eq!(issues.len(), 1);
    assert!(issues[0].message.contains("Unclosed"));
    assert_eq!(issues[0].line, 6);
}

#[test]
fn test_blob_without_open_marker() {
    let issues = validate("CPF|v1\nM|t|t|t|t\n---\n\n@B:blob\nstuff\n");
    assert!(issues.iter().any(|e| e.message.contains("must be followed by '<<'")));
}

#[test]
fn test_valid_heredoc() {
    assert!(is_valid("CPF|v1\nM|t|t|t|t\n---\n\n@B:blob\n<<\nstuff here\n>>\n"));
}

#[test]
fn test_issue_display_and_json() {
    let issues = validate("CPF|v1\nM|t|t|t|t\n---\n\n@R:a\n\n@R:a\n");
    assert_eq!(issues[0].to_string(), "[WARNING] Line 7: Duplicate block ID 'a'");
    let json = serde_json::to_value(&issues[0]).unwrap();
    assert_eq!(json["severity"], "warning");
    assert_eq!(json["line"], 7);
}

#[test]
fn test_formatter_output_validates() {
    assert!(validate(&format_document(&sample_doc())).is_empty());
}
