//! Section classification: English heading + body lines -> block sigil.
//!
//! Header keyword families are checked first in a fixed order; if none hit,
//! content-line ratios decide. The order and thresholds are load-bearing.

use cpf_core::Sigil;
use regex::Regex;
use std::sync::LazyLock;

/// Share of negation lines above which a section is a negation block.
pub const NEGATION_RATIO: f64 = 0.6;
/// Share of numbered lines above which a section is a priority list.
pub const PRIORITY_RATIO: f64 = 0.6;
/// Share of numbered lines above which a section is a sequence.
pub const SEQUENCE_RATIO: f64 = 0.4;
/// Share of path-bearing lines above which a section is forced to a zone.
pub const PATH_RATIO: f64 = 0.5;

static HEADER_FAMILIES: LazyLock<Vec<(Sigil, Regex)>> = LazyLock::new(|| {
    [
        (Sigil::Zone, r"(?i)(boundar|scope|zone|path|workspace|directory|folder)"),
        (Sigil::Tone, r"(?i)(tone|personality|style|voice|character|persona|communication|approach)"),
        (Sigil::Priority, r"(?i)(priorit|order|hierarchy|ranking|precedence)"),
        (Sigil::Sequence, r"(?i)(step|sequence|workflow|procedure|process|after|before|how.to)"),
        (
            Sigil::Negation,
            r"(?i)(restriction|prohibited|forbidden|don.t|avoid|never|quality.gate|checklist)",
        ),
    ]
    .into_iter()
    .map(|(sigil, pattern)| (sigil, Regex::new(pattern).unwrap()))
    .collect()
});

/// "Do NOT x", "Never x", "Avoid x".
pub static NEGATION_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:\*\*)?(?:Do\s+NOT|Don't|dont|Never|Avoid)\b\s*(.+?)(?:\*\*)?\.?\s*$").unwrap()
});

/// "1. Something".
pub static NUMBERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\.\s+(.+)$").unwrap());

/// Filesystem path reference: `/path/to/something`.
pub static PATH_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(/[\w./-]+(?:/[\w./-]+)+)").unwrap());

fn ratio(count: usize, total: usize) -> f64 {
    count as f64 / total as f64
}

/// Classify a section by header keywords, then by content ratios. Defaults to rule.
pub fn classify_section<S: AsRef<str>>(header: &str, lines: &[S]) -> Sigil {
    let header_lower = header.to_lowercase();
    if let Some((sigil, _)) = HEADER_FAMILIES.iter().find(|(_, re)| re.is_match(&header_lower)) {
        return *sigil;
    }

    let content: Vec<&str> = lines
        .iter()
        .map(|l| l.as_ref().trim())
        .filter(|l| !l.is_empty())
        .collect();
    let total = content.len();
    if total == 0 {
        return Sigil::Rule;
    }

    let negations = content.iter().filter(|l| NEGATION_LINE_RE.is_match(l)).count();
    let numbered = content.iter().filter(|l| NUMBERED_RE.is_match(l)).count();

    if negations > 0 && ratio(negations, total) > NEGATION_RATIO {
        Sigil::Negation
    } else if numbered > 0 && ratio(numbered, total) > PRIORITY_RATIO {
        Sigil::Priority
    } else if numbered > 0 && ratio(numbered, total) > SEQUENCE_RATIO {
        Sigil::Sequence
    } else {
        Sigil::Rule
    }
}

/// True when more than half of the non-blank lines reference a filesystem path.
pub fn is_path_heavy<S: AsRef<str>>(lines: &[S]) -> bool {
    let content: Vec<&str> = lines
        .iter()
        .map(|l| l.as_ref())
        .filter(|l| !l.trim().is_empty())
        .collect();
    if content.is_empty() {
        return false;
    }
    let paths = content.iter().filter(|l| PATH_REF_RE.is_match(l)).count();
    paths > 0 && ratio(paths, content.len()) > PATH_RATIO
}

/// `classify_section` plus the path override: path-heavy sections become zones.
pub fn classify<S: AsRef<str>>(header: &str, lines: &[S]) -> Sigil {
    let sigil = classify_section(header, lines);
    if sigil != Sigil::Zone && is_path_heavy(lines) {
        tracing::debug!(header, from = %sigil, "path-heavy section forced to zone");
        return Sigil::Zone;
    }
    sigil
}
