//! CPF compactor: English markdown <-> CPF v1.
//!
//! Encode:
//! 1. Split markdown into sections at headings
//! 2. Classify each section to a sigil
//! 3. Compress each line to operator notation + abbreviations
//!
//! Decode expands each line back to approximate prose. Blob content passes
//! through both directions untouched.

pub mod classifier;
pub mod compressor;
pub mod decoder;
pub mod encoder;
pub mod expander;
pub mod markdown;
pub mod stats;

pub use classifier::{classify, classify_section};
pub use compressor::{compress_line, LineCompressor};
pub use decoder::{decode, decode_document};
pub use encoder::{encode, encode_document, extract_path_aliases, EncodeOptions, PathAlias};
pub use expander::{expand_line, LineExpander};
pub use stats::{estimate_tokens, CompressionStats, TextStats};
