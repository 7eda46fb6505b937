//! Size and token estimates for reporting. Not used by the codec itself.

use serde::Serialize;

/// Average language-model tokens per whitespace-delimited word.
pub const TOKENS_PER_WORD: f64 = 1.3;

/// Rough token count: words × 1.3, rounded, never below 1.
pub fn estimate_tokens(text: &str) -> usize {
    let words = text.split_whitespace().count();
    ((words as f64 * TOKENS_PER_WORD).round() as usize).max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextStats {
    pub lines: usize,
    pub chars: usize,
    pub tokens: usize,
}

impl TextStats {
    pub fn measure(text: &str) -> Self {
        Self {
            lines: text.lines().count(),
            chars: text.chars().count(),
            tokens: estimate_tokens(text),
        }
    }
}

/// Original vs compressed sizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompressionStats {
    pub original: TextStats,
    pub compressed: TextStats,
    pub token_reduction_pct: f64,
    pub char_reduction_pct: f64,
}

impl CompressionStats {
    pub fn measure(original: &str, compressed: &str) -> Self {
        let original = TextStats::measure(original);
        let compressed = TextStats::measure(compressed);
        Self {
            original,
            compressed,
            token_reduction_pct: reduction_pct(original.tokens, compressed.tokens),
            char_reduction_pct: reduction_pct(original.chars, compressed.chars),
        }
    }

    /// compressed / original, in characters.
    pub fn ratio(&self) -> f64 {
        if self.original.chars == 0 {
            return 1.0;
        }
        self.compressed.chars as f64 / self.original.chars as f64
    }
}

fn reduction_pct(before: usize, after: usize) -> f64 {
    if before == 0 {
        return 0.0;
    }
    (1.0 - after as f64 / before as f64) * 100.0
}
