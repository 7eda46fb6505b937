//! Bidirectional abbreviation table: full word/phrase <-> short token.
//!
//! The built-in table is built once and never mutated. Custom overrides
//! produce a fresh merged table.

use crate::error::{CpfError, Result};
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::LazyLock;

/// Built-in encode entries, in lookup order. Whole-word replacements only.
const BUILTIN_ENTRIES: &[(&str, &str)] = &[
    ("module", "mod"),
    ("modules", "mods"),
    ("plugin", "plg"),
    ("plugins", "plgs"),
    ("maintained", "mnt"),
    ("abandoned", "abd"),
    ("dependency", "dep"),
    ("dependencies", "deps"),
    ("configuration", "cfg"),
    ("configure", "cfg"),
    ("security", "sec"),
    ("performance", "perf"),
    ("stability", "stab"),
    ("documentation", "doc"),
    ("authentication", "auth"),
    ("permissions", "perm"),
    ("repository", "repo"),
    ("repositories", "repos"),
    ("template", "tpl"),
    ("templates", "tpls"),
    ("environment", "env"),
    ("implementation", "impl"),
    ("version", "ver"),
    ("versions", "vers"),
    ("update", "upd"),
    ("updates", "upds"),
    ("breaking", "brk"),
    ("compatibility", "compat"),
    ("developer experience", "dx"),
    ("continuous integration", "ci"),
    ("pull request", "pr"),
    ("pull requests", "prs"),
    ("function", "fn"),
    ("functions", "fns"),
    ("class", "cls"),
    ("classes", "clss"),
    ("service", "svc"),
    ("services", "svcs"),
    ("dependency injection", "di"),
    ("cache", "cch"),
    ("caching", "cch"),
    ("context", "ctx"),
    ("require", "req"),
    ("required", "req"),
    ("requirement", "req"),
    ("requirements", "reqs"),
    ("validate", "val"),
    ("validation", "val"),
    ("sanitize", "san"),
    ("sanitization", "san"),
    ("escape", "esc"),
    ("escaping", "esc"),
    ("check", "chk"),
    ("checks", "chks"),
    ("WordPress", "wp"),
    ("Drupal", "dp"),
    ("deprecated", "depr"),
    ("deprecation", "depr"),
    ("deprecations", "deprs"),
    ("application", "app"),
    ("applications", "apps"),
    ("database", "db"),
    ("databases", "dbs"),
    ("directory", "dir"),
    ("directories", "dirs"),
    ("parameter", "param"),
    ("parameters", "params"),
    ("argument", "arg"),
    ("arguments", "args"),
    ("response", "resp"),
    ("request", "req"),
    ("middleware", "mw"),
    ("controller", "ctrl"),
    ("controllers", "ctrls"),
    ("component", "comp"),
    ("components", "comps"),
    ("description", "desc"),
    ("specification", "spec"),
    ("infrastructure", "infra"),
    ("production", "prod"),
    ("development", "dev"),
    ("default", "def"),
    ("maximum", "max"),
    ("minimum", "min"),
    ("information", "info"),
    ("available", "avail"),
    ("backwards", "bkwd"),
    ("otherwise", "else"),
    ("approximately", "~"),
    ("important", "*"),
];

/// Insertion-ordered string map. Re-inserting a key keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhraseMap(IndexMap<String, String>);

impl PhraseMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. Returns the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Shallow merge: a copy of `self` with every entry of `overrides` applied on top.
    pub fn merged(&self, overrides: &PhraseMap) -> PhraseMap {
        let mut out = self.clone();
        out.0.extend(overrides.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        out
    }

    /// value -> key, keeping the first key seen for a colliding value.
    pub fn inverse_first_wins(&self) -> PhraseMap {
        let mut out = IndexMap::with_capacity(self.len());
        for (k, v) in &self.0 {
            out.entry(v.clone()).or_insert_with(|| k.clone());
        }
        PhraseMap(out)
    }

    /// value -> key, keeping the last key seen for a colliding value.
    pub fn inverse_last_wins(&self) -> PhraseMap {
        self.0.iter().map(|(k, v)| (v.clone(), k.clone())).collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PhraseMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        PhraseMap(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Custom abbreviations loaded from an external key-value source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbbreviationOverrides {
    /// full phrase -> token, as given.
    pub encode: PhraseMap,
    /// token -> full phrase, exact inverse of `encode` (last key wins).
    pub decode: PhraseMap,
}

impl AbbreviationOverrides {
    pub fn from_encode(encode: PhraseMap) -> Self {
        let decode = encode.inverse_last_wins();
        Self { encode, decode }
    }

    /// Parse a JSON object of `{"full phrase": "token"}` pairs, keeping key order.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(object) = value else {
            return Err(CpfError::InvalidAbbreviations(
                "expected a JSON object of phrase -> token pairs".into(),
            ));
        };
        let mut encode = PhraseMap::new();
        for (full, token) in object {
            match token {
                Value::String(token) => {
                    encode.insert(full, token);
                }
                other => {
                    return Err(CpfError::InvalidAbbreviations(format!(
                        "value for '{full}' must be a string, got {other}"
                    )))
                }
            }
        }
        tracing::debug!(entries = encode.len(), "loaded custom abbreviations");
        Ok(Self::from_encode(encode))
    }
}

/// Encode and decode maps used by the line codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbbreviationTable {
    pub encode: PhraseMap,
    pub decode: PhraseMap,
}

static BUILTIN: LazyLock<AbbreviationTable> = LazyLock::new(|| {
    let encode: PhraseMap = BUILTIN_ENTRIES.iter().copied().collect();
    let decode = encode.inverse_first_wins();
    AbbreviationTable { encode, decode }
});

impl AbbreviationTable {
    /// The process-wide built-in table.
    pub fn builtin() -> &'static AbbreviationTable {
        &BUILTIN
    }

    /// An empty table: no words are abbreviated or expanded.
    pub fn empty() -> Self {
        Self {
            encode: PhraseMap::new(),
            decode: PhraseMap::new(),
        }
    }

    /// Fresh table with custom entries layered over `self`. Custom wins on collision.
    pub fn with_overrides(&self, overrides: &AbbreviationOverrides) -> Self {
        Self {
            encode: self.encode.merged(&overrides.encode),
            decode: self.decode.merged(&overrides.decode),
        }
    }

    pub fn abbreviate(&self, word: &str) -> String {
        abbreviate(word, Some(&self.encode))
    }

    pub fn expand(&self, token: &str) -> String {
        expand(token, Some(&self.decode))
    }
}

impl Default for AbbreviationTable {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

/// Compress a word or phrase. Exact key first, then a case-insensitive scan
/// in table order; unknown input comes back unchanged.
pub fn abbreviate(word: &str, table: Option<&PhraseMap>) -> String {
    let lookup = table.unwrap_or(&BUILTIN.encode);
    if let Some(token) = lookup.get(word) {
        return token.to_string();
    }
    let lower = word.to_lowercase();
    lookup
        .iter()
        .find(|(full, _)| full.to_lowercase() == lower)
        .map(|(_, token)| token.to_string())
        .unwrap_or_else(|| word.to_string())
}

/// Expand a token back to its full phrase. Exact match only.
pub fn expand(token: &str, table: Option<&PhraseMap>) -> String {
    let lookup = table.unwrap_or(&BUILTIN.decode);
    lookup.get(token).unwrap_or(token).to_string()
}
