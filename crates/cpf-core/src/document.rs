//! CPF document model: metadata header, sigil-tagged blocks, and the document.

use crate::grammar::{Operator, Sigil, VERSION};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Document metadata from the `M|` header line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub doc_id: String,
    pub title: String,
    pub source: String,
    pub timestamp: String,
}

impl Metadata {
    pub fn new(
        doc_id: impl Into<String>,
        title: impl Into<String>,
        source: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            doc_id: doc_id.into(),
            title: title.into(),
            source: source.into(),
            timestamp: timestamp.into(),
        }
    }

    /// Fields in declared order.
    pub fn fields(&self) -> [&str; 4] {
        [&self.doc_id, &self.title, &self.source, &self.timestamp]
    }
}

/// A single block, e.g. `@R:mod-first` with its content lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub sigil: Sigil,
    pub block_id: String,
    /// Raw content lines. Verbatim text when `is_heredoc` is set.
    pub lines: Vec<String>,
    pub is_heredoc: bool,
}

impl Block {
    /// Build a block; blob sigils are always heredoc.
    pub fn new(sigil: Sigil, block_id: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            sigil,
            block_id: block_id.into(),
            lines,
            is_heredoc: sigil.is_heredoc(),
        }
    }

    pub fn blob(block_id: impl Into<String>, lines: Vec<String>) -> Self {
        Self::new(Sigil::Blob, block_id, lines)
    }

    pub fn header(&self) -> String {
        format!("@{}:{}", self.sigil, self.block_id)
    }
}

/// A complete CPF v1 document. Block order follows source section order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub version: String,
    pub metadata: Metadata,
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(metadata: Metadata, blocks: Vec<Block>) -> Self {
        Self {
            version: VERSION.to_string(),
            metadata,
            blocks,
        }
    }

    /// First block with the given id.
    pub fn block(&self, block_id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.block_id == block_id)
    }

    pub fn blocks_by_sigil(&self, sigil: Sigil) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(move |b| b.sigil == sigil)
    }

    /// `key::value` definitions from every `@C` block, in document order.
    /// A line may hold several `;`-separated pairs. Later keys overwrite earlier ones.
    pub fn constants(&self) -> IndexMap<String, String> {
        let mut constants = IndexMap::new();
        let pair_separator = Operator::Else.symbol();
        let definition = Operator::Definition.symbol();
        for block in self.blocks_by_sigil(Sigil::Constant) {
            for line in &block.lines {
                for pair in line.split(pair_separator) {
                    let Some((key, value)) = pair.trim().split_once(definition) else {
                        continue;
                    };
                    constants.insert(key.trim().to_string(), value.trim().to_string());
                }
            }
        }
        constants
    }
}
