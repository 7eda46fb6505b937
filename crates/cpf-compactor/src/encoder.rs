//! English markdown -> CPF v1 document.

use crate::classifier::{classify, PATH_REF_RE};
use crate::compressor::LineCompressor;
use crate::markdown::{slugify, split_sections, truncate_slug};
use cpf_core::grammar::{ALIAS_PREFIX, FIELD_SEPARATOR};
use cpf_core::{
    AbbreviationOverrides, AbbreviationTable, Block, Document, EncoderConfig, Metadata, Operator,
    PathAliasConfig, PhraseMap, Sigil,
};
use cpf_parser::{format_document, match_block_header};
use indexmap::IndexMap;

const DEFAULT_TITLE: &str = "Untitled";
const DEFAULT_DOC_ID: &str = "untitled";
const PATHS_BLOCK_ID: &str = "paths";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Stand-in for an aliased path while its line is being compressed.
const PATH_PLACEHOLDER_OPEN: char = '\u{E000}';
const PATH_PLACEHOLDER_CLOSE: char = '\u{E001}';

/// Per-call encoder inputs. Unset metadata falls back to values derived from the text.
#[derive(Debug, Clone, Default)]
pub struct EncodeOptions {
    pub doc_id: Option<String>,
    pub title: Option<String>,
    pub source: Option<String>,
    pub timestamp: Option<String>,
    /// full phrase -> token, layered over the built-in table.
    pub custom_abbreviations: PhraseMap,
    pub config: EncoderConfig,
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_doc_id(mut self, doc_id: impl Into<String>) -> Self {
        self.doc_id = Some(doc_id.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn with_abbreviations(mut self, custom: PhraseMap) -> Self {
        self.custom_abbreviations = custom;
        self
    }

    pub fn with_config(mut self, config: EncoderConfig) -> Self {
        self.config = config;
        self
    }
}

/// A repeated long path and the short name it is referenced by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathAlias {
    pub path: String,
    pub alias: String,
}

/// Encode markdown into CPF v1 text.
pub fn encode(text: &str, options: &EncodeOptions) -> String {
    format_document(&encode_document(text, options))
}

/// Encode markdown into a `Document`.
pub fn encode_document(text: &str, options: &EncodeOptions) -> Document {
    let config = &options.config;
    let owned;
    let compressor = if options.custom_abbreviations.is_empty() {
        LineCompressor::builtin()
    } else {
        let overrides = AbbreviationOverrides::from_encode(options.custom_abbreviations.clone());
        let table = AbbreviationTable::builtin().with_overrides(&overrides);
        owned = LineCompressor::new(&table.encode);
        &owned
    };

    let sections = split_sections(text, config.extract_code_blocks);
    let metadata = build_metadata(options, sections.iter().find_map(|s| s.header.as_deref()));

    let aliases = extract_path_aliases(text, &config.path_alias);
    let mut blocks = Vec::new();
    if !aliases.is_empty() {
        let definition = Operator::Definition.symbol();
        let lines = aliases
            .iter()
            .map(|a| format!("{ALIAS_PREFIX}{}{definition}{}", a.alias, a.path))
            .collect();
        blocks.push(Block::new(Sigil::Constant, PATHS_BLOCK_ID, lines));
    }

    for (index, section) in sections.iter().enumerate() {
        let Some(header) = section.header.as_deref() else {
            continue;
        };
        let block_id = match truncate_slug(&slugify(header), config.block_id_max_len) {
            slug if slug.is_empty() => format!("section-{}", index + 1),
            slug => slug,
        };

        let content: Vec<&str> = section
            .lines
            .iter()
            .map(String::as_str)
            .filter(|l| !l.trim().is_empty())
            .collect();
        if !content.is_empty() {
            let sigil = classify(header, &content);
            let lines: Vec<String> = content
                .iter()
                .map(|line| compress_with_aliases(compressor, line, &aliases))
                .filter(|l| !l.is_empty())
                .map(escape_block_header)
                .collect();
            tracing::debug!(
                block_id = %block_id,
                sigil = %sigil,
                lines = lines.len(),
                "section encoded"
            );
            if !lines.is_empty() {
                blocks.push(Block::new(sigil, block_id.clone(), lines));
            }
        }

        for (n, code) in section.code_blocks.iter().enumerate() {
            let id = match n {
                0 => format!("{block_id}-code"),
                n => format!("{block_id}-code-{}", n + 1),
            };
            blocks.push(Block::blob(id, code.clone()));
        }
    }

    Document::new(metadata, blocks)
}

fn build_metadata(options: &EncodeOptions, first_header: Option<&str>) -> Metadata {
    let title = options
        .title
        .clone()
        .filter(|t| !t.is_empty())
        .or_else(|| first_header.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let doc_id = options
        .doc_id
        .clone()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| match truncate_slug(&slugify(&title), options.config.doc_id_max_len) {
            slug if slug.is_empty() => DEFAULT_DOC_ID.to_string(),
            slug => slug,
        });
    let timestamp = options
        .timestamp
        .clone()
        .unwrap_or_else(|| chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string());
    let source = options.source.clone().unwrap_or_default();

    Metadata::new(
        sanitize_field(&doc_id),
        sanitize_field(&title),
        sanitize_field(&source),
        sanitize_field(&timestamp),
    )
}

/// Keep a metadata value on one line and free of field separators.
fn sanitize_field(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            FIELD_SEPARATOR => '/',
            '\n' | '\r' => ' ',
            c => c,
        })
        .collect()
}

/// A compressed line that would parse as a block header gets a leading `\`.
fn escape_block_header(line: String) -> String {
    if match_block_header(&line).is_some() {
        format!("\\{line}")
    } else {
        line
    }
}

fn compress_with_aliases(compressor: &LineCompressor, line: &str, aliases: &[PathAlias]) -> String {
    if aliases.is_empty() {
        return compressor.compress_line(line);
    }
    let mut shielded = line.to_string();
    for (i, alias) in aliases.iter().enumerate() {
        shielded = shielded.replace(
            &alias.path,
            &format!("{PATH_PLACEHOLDER_OPEN}{i}{PATH_PLACEHOLDER_CLOSE}"),
        );
    }
    let mut compressed = compressor.compress_line(&shielded);
    for (i, alias) in aliases.iter().enumerate() {
        compressed = compressed.replace(
            &format!("{PATH_PLACEHOLDER_OPEN}{i}{PATH_PLACEHOLDER_CLOSE}"),
            &format!("{ALIAS_PREFIX}{}", alias.alias),
        );
    }
    compressed
}

/// Long paths repeated often enough to earn a `$alias`. Most frequent first,
/// ties in order of first appearance.
pub fn extract_path_aliases(text: &str, config: &PathAliasConfig) -> Vec<PathAlias> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for m in PATH_REF_RE.find_iter(text) {
        let path = m.as_str();
        if path.chars().count() >= config.min_path_len {
            *counts.entry(path).or_insert(0) += 1;
        }
    }
    // stable: ties keep first-appearance order
    counts.sort_by(|_, a, _, b| b.cmp(a));

    let mut aliases: Vec<PathAlias> = Vec::new();
    for (path, count) in counts {
        if count < config.min_occurrences {
            continue;
        }
        let last = path.trim_end_matches('/').rsplit('/').next().unwrap_or(path);
        let mut alias: String = last
            .to_lowercase()
            .replace(['.', ' '], "-")
            .chars()
            .take(config.max_alias_len)
            .collect();
        if aliases.iter().any(|a| a.alias == alias) {
            alias = format!("{alias}{}", aliases.len());
        }
        tracing::debug!(%path, %alias, count, "path alias");
        aliases.push(PathAlias {
            path: path.to_string(),
            alias,
        });
    }
    aliases
}
