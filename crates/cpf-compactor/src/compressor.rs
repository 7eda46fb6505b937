//! Line compressor: one English instruction line -> CPF notation.
//!
//! Ladder:
//! 1. Strip bullet and emphasis markers
//! 2. First matching structural pattern decides the line shape
//!    (conditional, negation, imperative, preference, bold key-value, numbered)
//! 3. Fragments go through grammar stripping, connector substitution and
//!    abbreviation, in that order

use crate::classifier::{NEGATION_LINE_RE, NUMBERED_RE};
use crate::markdown::{collapse_whitespace, strip_bullet_prefix, strip_markdown_formatting};
use cpf_core::grammar::{PREFERENCE_CLOSE, PREFERENCE_OPEN, PRIORITY_MARKER};
use cpf_core::{AbbreviationTable, Operator, PhraseMap};
use regex::{NoExpand, Regex};
use std::sync::LazyLock;

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap()
}

static CONDITIONAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?i)^(?:\*\*)?(If|When|Unless)\b\s*(.+?)(?:\*\*)?(?:[:,]\s*|\s*[-—]\s*)(.*)$")
});
static IMPERATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?i)^(?:\*\*)?(?:Always|Must|Ensure|Make sure|Required|Important)\b[:\s]*(.+?)(?:\*\*)?\.?\s*$")
});
static PREFER_RE: LazyLock<Regex> = LazyLock::new(|| {
    re(r"(?i)^prefer\s+(.+?)\s+(?:over|>|instead of|rather than)\s+(.+)$")
});
/// `**Key:** value` or `**Key** - value`.
static BOLD_KV_RE: LazyLock<Regex> =
    LazyLock::new(|| re(r"^\*\*([^*]+?)(?::\*\*|\*\*\s*[:—-]+)\s*(.+)$"));

/// Multi-word phrases collapsed to operators or shorter forms, applied first.
static VERBOSE_PHRASES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\bfor example\b", "e.g."),
        (r"\bfor instance\b", "e.g."),
        (r"\bsuch as\b", "e.g."),
        (r"\bin order to\b", "to"),
        (r"\bso that\b", "so"),
        (r"\bas well as\b", Operator::And.symbol()),
        (r"\balong with\b", Operator::And.symbol()),
        (r"\bin addition to\b", Operator::And.symbol()),
        (r"\bwith respect to\b", "re:"),
        (r"\bwith regard to\b", "re:"),
        (r"\bregarding\b", "re:"),
        (r"\bis required\b", "req"),
        (r"\bare required\b", "req"),
        (r"\bis not\b", "!"),
        (r"\bare not\b", "!"),
        (r"\bdo not\b", Operator::Never.symbol()),
        (r"\bshould not\b", Operator::Never.symbol()),
        (r"\bmust not\b", Operator::Never.symbol()),
        (r"\bcan not\b", Operator::Never.symbol()),
        (r"\bcannot\b", Operator::Never.symbol()),
        (r"\bshould be\b", Operator::Produces.symbol()),
        (r"\bneeds to be\b", Operator::Produces.symbol()),
        (r"\bhas to be\b", Operator::Produces.symbol()),
        (r"\bwhen possible\b", "[possible]"),
        (r"\bwhere appropriate\b", "[appropriate]"),
        (r"\bwhere needed\b", "[needed]"),
        (r"\bif needed\b", "[needed]"),
        (r"\bif applicable\b", "[applicable]"),
        (r"\bwhen relevant\b", "[relevant]"),
        (r"\bif relevant\b", "[relevant]"),
        (r"\bat least\b", ">="),
        (r"\bat minimum\b", ">="),
        (r"\bat most\b", "<="),
        (r"\bmore than\b", ">"),
        (r"\bless than\b", "<"),
        (r"\bgreater than\b", ">"),
        (r"\bresults? in\b", Operator::Produces.symbol()),
        (r"\bleads? to\b", Operator::Produces.symbol()),
        (r"\bsee\s+", Operator::Delegate.symbol()),
        (r"\brefer to\b", Operator::Delegate.symbol()),
        (r"\bmake sure\b", "ensure"),
        (r"\bbe sure to\b", "ensure"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (re(&format!("(?i){pattern}")), replacement))
    .collect()
});

static FILLER_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    re(concat!(
        r"(?i)\b(please|basically|essentially|simply|just|that is|in order to|",
        r"make sure to|be sure to|it is important to|you should|you must|",
        r"we need to|we should|there is|there are|this is|that are|which is|",
        r"which are|in this case|at this point|for this purpose)\b",
    ))
});
static ARTICLES: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)\b(a|an|the)\b\s*"));
static PRONOUNS: LazyLock<Regex> = LazyLock::new(|| {
    re(concat!(
        r"(?i)\b(you|your|yours|we|our|they|their|them|it|its|this|that|these|those|",
        r"which|who|whom|whose)\b\s*",
    ))
});
static AND_CONNECTOR: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)\b(?:and|also|as well as|along with|plus)\b"));
static OR_CONNECTOR: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)\b(?:or|alternatively)\b"));
static TRAILING_FLUFF: LazyLock<Regex> = LazyLock::new(|| re(r"\s*[.;,]+\s*$"));
/// Operators that lose the whitespace around them.
static OPERATOR_SPACING: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        Operator::And,
        Operator::Or,
        Operator::Then,
        Operator::Produces,
        Operator::Definition,
    ]
    .into_iter()
    .map(|op| (re(&format!(r"\s*{}\s*", regex::escape(op.symbol()))), op.symbol()))
    .collect()
});

/// Operators collapsed when repeated (`++` -> `+`).
static COLLAPSIBLE_OPERATORS: LazyLock<Vec<char>> = LazyLock::new(|| {
    [Operator::And, Operator::Or, Operator::Else]
        .iter()
        .flat_map(|op| op.symbol().chars())
        .collect()
});
/// Stray characters trimmed from both ends of a fragment, besides the collapsible operators.
const EDGE_PUNCTUATION: &[char] = &[' ', ',', '.'];

static BUILTIN_COMPRESSOR: LazyLock<LineCompressor> =
    LazyLock::new(|| LineCompressor::new(&AbbreviationTable::builtin().encode));

/// A line after bullet stripping, with and without emphasis markers.
struct PreparedLine<'a> {
    raw: &'a str,
    plain: String,
}

type StructuralRule = fn(&LineCompressor, &PreparedLine<'_>) -> Option<String>;

/// Structural patterns in precedence order. First match wins.
const STRUCTURAL_RULES: [(&str, StructuralRule); 6] = [
    ("conditional", LineCompressor::conditional),
    ("negation", LineCompressor::negation),
    ("imperative", LineCompressor::imperative),
    ("preference", LineCompressor::preference),
    ("bold_key_value", LineCompressor::bold_key_value),
    ("numbered", LineCompressor::numbered),
];

/// Compresses lines against one encode table. Abbreviation regexes are
/// compiled once per table, longest phrase first.
pub struct LineCompressor {
    abbreviations: Vec<(Regex, String)>,
}

impl LineCompressor {
    pub fn new(encode: &PhraseMap) -> Self {
        let mut sorted: Vec<(&str, &str)> = encode.iter().collect();
        sorted.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));
        let abbreviations = sorted
            .into_iter()
            .filter(|(full, _)| !full.is_empty())
            .filter_map(|(full, token)| {
                let pattern = format!(r"(?i)\b{}\b", regex::escape(full));
                Regex::new(&pattern).ok().map(|re| (re, token.to_string()))
            })
            .collect();
        Self { abbreviations }
    }

    /// Shared compressor over the built-in table.
    pub fn builtin() -> &'static LineCompressor {
        &BUILTIN_COMPRESSOR
    }

    /// Compress a single English instruction line. Blank input gives an empty string.
    pub fn compress_line(&self, line: &str) -> String {
        if line.trim().is_empty() {
            return String::new();
        }
        let raw = strip_bullet_prefix(line);
        let prepared = PreparedLine {
            raw,
            plain: strip_markdown_formatting(raw),
        };

        for (name, rule) in STRUCTURAL_RULES {
            if let Some(out) = rule(self, &prepared) {
                tracing::trace!(rule = name, line = %out, "structural match");
                return out;
            }
        }
        self.compress_fragment(&prepared.plain)
    }

    fn conditional(&self, line: &PreparedLine<'_>) -> Option<String> {
        let caps = CONDITIONAL_RE.captures(&line.plain)?;
        let op = if caps[1].eq_ignore_ascii_case("unless") {
            Operator::IfNot
        } else {
            Operator::If
        };
        let condition = self.compress_fragment(caps[2].trim().trim_end_matches(':'));
        let action = self.compress_fragment(caps[3].trim().trim_end_matches('.'));
        Some(format!("{op}{condition}{}{action}", Operator::Then))
    }

    fn negation(&self, line: &PreparedLine<'_>) -> Option<String> {
        let caps = NEGATION_LINE_RE.captures(&line.plain)?;
        let content = self.compress_fragment(caps[1].trim().trim_end_matches('.'));
        Some(format!("{}{content}", Operator::Never))
    }

    fn imperative(&self, line: &PreparedLine<'_>) -> Option<String> {
        let caps = IMPERATIVE_RE.captures(&line.plain)?;
        let content = self.compress_fragment(caps[1].trim().trim_end_matches('.'));
        Some(format!("{}{content}", Operator::Emphasis))
    }

    fn preference(&self, line: &PreparedLine<'_>) -> Option<String> {
        let caps = PREFER_RE.captures(&line.plain)?;
        let preferred = self.compress_fragment(caps[1].trim());
        let over = self.compress_fragment(caps[2].trim().trim_end_matches('.'));
        Some(format!("{PREFERENCE_OPEN}{preferred}{PREFERENCE_CLOSE}{over}"))
    }

    /// Matched on the raw line: emphasis stripping would remove the `**` it keys on.
    fn bold_key_value(&self, line: &PreparedLine<'_>) -> Option<String> {
        let caps = BOLD_KV_RE.captures(line.raw)?;
        let key = self.compress_fragment(&strip_markdown_formatting(caps[1].trim()));
        let value =
            self.compress_fragment(strip_markdown_formatting(caps[2].trim()).trim_end_matches('.'));
        Some(format!("{key}{}{value}", Operator::Definition))
    }

    fn numbered(&self, line: &PreparedLine<'_>) -> Option<String> {
        let caps = NUMBERED_RE.captures(&line.plain)?;
        let content = self.compress_fragment(caps[2].trim().trim_end_matches('.'));
        Some(format!("{PRIORITY_MARKER}{} {content}", &caps[1]))
    }

    /// Grammar stripping, connectors and abbreviation for a text fragment.
    pub fn compress_fragment(&self, text: &str) -> String {
        let mut text = text.to_string();

        for (re, replacement) in VERBOSE_PHRASES.iter() {
            text = re.replace_all(&text, NoExpand(replacement)).into_owned();
        }

        text = FILLER_WORDS.replace_all(&text, "").into_owned();
        text = ARTICLES.replace_all(&text, "").into_owned();
        text = PRONOUNS.replace_all(&text, "").into_owned();

        text = AND_CONNECTOR.replace_all(&text, NoExpand(Operator::And.symbol())).into_owned();
        text = OR_CONNECTOR.replace_all(&text, NoExpand(Operator::Or.symbol())).into_owned();

        for (re, token) in &self.abbreviations {
            text = re.replace_all(&text, NoExpand(token)).into_owned();
        }

        text = TRAILING_FLUFF.replace_all(&text, "").into_owned();
        text = collapse_whitespace(&text);

        for (re, op) in OPERATOR_SPACING.iter() {
            text = re.replace_all(&text, NoExpand(op)).into_owned();
        }

        let is_edge = |c: char| EDGE_PUNCTUATION.contains(&c) || COLLAPSIBLE_OPERATORS.contains(&c);
        collapse_repeated_operators(&text).trim_matches(is_edge).to_string()
    }
}

impl Default for LineCompressor {
    fn default() -> Self {
        Self::new(&AbbreviationTable::builtin().encode)
    }
}

/// `a++b||c` -> `a+b|c`.
fn collapse_repeated_operators(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    for c in text.chars() {
        if prev == Some(c) && COLLAPSIBLE_OPERATORS.contains(&c) {
            continue;
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

/// Compress one line against an explicit encode table.
pub fn compress_line(line: &str, encode: &PhraseMap) -> String {
    LineCompressor::new(encode).compress_line(line)
}
