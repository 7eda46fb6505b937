use serde::{Deserialize, Serialize};

/// Encoder tuning. Classification thresholds are fixed and live with the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub path_alias: PathAliasConfig,
    pub doc_id_max_len: usize,
    pub block_id_max_len: usize,
    /// Emit fenced code as `@B` heredoc blocks instead of compressing it.
    pub extract_code_blocks: bool,
}

/// When a repeated filesystem path earns a `$alias` in the `@C:paths` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathAliasConfig {
    pub min_path_len: usize,
    pub min_occurrences: usize,
    pub max_alias_len: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            path_alias: PathAliasConfig::default(),
            doc_id_max_len: 40,
            block_id_max_len: 50,
            extract_code_blocks: true,
        }
    }
}

impl Default for PathAliasConfig {
    fn default() -> Self {
        Self {
            min_path_len: 30,
            min_occurrences: 2,
            max_alias_len: 12,
        }
    }
}

impl EncoderConfig {
    pub fn from_json(text: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
