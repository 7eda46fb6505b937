//! CPF core: grammar constants, document model, abbreviation table and errors
//! shared by the parser and the compactor.

pub mod abbreviations;
pub mod config;
pub mod document;
pub mod error;
pub mod grammar;

pub use abbreviations::{AbbreviationOverrides, AbbreviationTable, PhraseMap};
pub use config::{EncoderConfig, PathAliasConfig};
pub use document::{Block, Document, Metadata};
pub use error::{CpfError, ParseError, Result};
pub use grammar::{Operator, Sigil};

#[cfg(test)]
mod tests;
