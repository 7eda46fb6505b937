//! Markdown helpers for the encoder: section splitting, fenced code, slugs,
//! and emphasis stripping.

use cpf_core::grammar::HEREDOC_CLOSE;
use regex::Regex;
use std::sync::LazyLock;

static RE_HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").unwrap());
static RE_HEADING_MARKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#+\s*").unwrap());
static RE_NON_SLUG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());
static RE_ITALIC_STAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*([^*\n]+?)\*").unwrap());
// Underscore italics only at word edges so snake_case and paths survive.
static RE_ITALIC_UNDERSCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|[^\w])_([^_\n]+?)_([^\w]|$)").unwrap());
static RE_HSPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());

const FENCE: &str = "```";

/// A markdown section: heading text, body lines, and extracted fenced code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    /// `None` for content before the first heading.
    pub header: Option<String>,
    pub lines: Vec<String>,
    /// Inner lines of each fenced code block, when extracted.
    pub code_blocks: Vec<Vec<String>>,
}

impl Section {
    fn is_empty(&self) -> bool {
        self.header.is_none() && self.lines.is_empty() && self.code_blocks.is_empty()
    }
}

/// Heading text of an ATX heading line (`## Title`).
pub fn extract_section_header(line: &str) -> Option<String> {
    RE_HEADING
        .captures(line.trim())
        .map(|caps| caps[2].trim().to_string())
}

/// Kebab-case id from a heading: `Module / Plugin first` -> `module-plugin-first`.
pub fn slugify(text: &str) -> String {
    let text = RE_HEADING_MARKS.replace(text, "");
    let text = text.replace("**", "").to_lowercase();
    RE_NON_SLUG
        .replace_all(text.trim(), "-")
        .trim_matches('-')
        .to_string()
}

/// Truncate a slug to `max` chars without leaving a dangling hyphen.
pub fn truncate_slug(slug: &str, max: usize) -> String {
    let cut: String = slug.chars().take(max).collect();
    cut.trim_end_matches('-').to_string()
}

/// Remove markdown bold/italic markers.
pub fn strip_markdown_formatting(text: &str) -> String {
    let text = text.replace("**", "").replace("__", "");
    let text = RE_ITALIC_STAR.replace_all(&text, "$1");
    RE_ITALIC_UNDERSCORE
        .replace_all(&text, "${1}${2}${3}")
        .into_owned()
}

/// Remove a leading `- ` or `* ` bullet marker. Also trims.
pub fn strip_bullet_prefix(line: &str) -> &str {
    let stripped = line.trim();
    stripped
        .strip_prefix("- ")
        .or_else(|| stripped.strip_prefix("* "))
        .unwrap_or(stripped)
}

/// Collapse runs of spaces/tabs into one space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    RE_HSPACE.replace_all(text, " ").trim().to_string()
}

/// Line index ranges (inclusive) of terminated ``` fences.
fn fence_ranges(lines: &[&str]) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        if lines[i].trim_start().starts_with(FENCE) {
            let close = (i + 1..lines.len()).find(|&j| lines[j].trim_start().starts_with(FENCE));
            if let Some(j) = close {
                ranges.push((i, j));
                i = j + 1;
                continue;
            }
        }
        i += 1;
    }
    ranges
}

/// Split markdown into sections at headings. Headings inside fenced code are
/// ignored. With `extract_code`, fenced code bodies go to `code_blocks`
/// unless they contain a heredoc close marker.
pub fn split_sections(text: &str, extract_code: bool) -> Vec<Section> {
    let lines: Vec<&str> = text.lines().collect();
    let fences = fence_ranges(&lines);

    let mut sections: Vec<Section> = Vec::new();
    let mut current = Section::default();
    let mut i = 0;

    while i < lines.len() {
        if let Some(&(start, end)) = fences.iter().find(|(s, _)| *s == i) {
            let inner = &lines[start + 1..end];
            let extractable = extract_code && !inner.iter().any(|l| l.trim() == HEREDOC_CLOSE);
            if extractable {
                if !inner.is_empty() {
                    current.code_blocks.push(inner.iter().map(|l| l.to_string()).collect());
                }
            } else {
                current
                    .lines
                    .extend(lines[start..=end].iter().map(|l| l.to_string()));
            }
            i = end + 1;
            continue;
        }

        match extract_section_header(lines[i]) {
            Some(header) => {
                if !current.is_empty() {
                    sections.push(std::mem::take(&mut current));
                }
                current.header = Some(header);
            }
            None => current.lines.push(lines[i].to_string()),
        }
        i += 1;
    }

    if !current.is_empty() {
        sections.push(current);
    }
    sections
}
