//! Contact/Structure Extractor — pure heuristics over raw resume text.
//!
//! Everything here is deterministic and side-effect free so the guardrail
//! pipeline can be tested independently of storage and network concerns.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[A-Z0-9._%+\-]+@[A-Z0-9.\-]+\.[A-Z]{2,}").unwrap());
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?\d{1,3}[\s\-.])?(?:\(?\d{3}\)?[\s\-.])?\d{3}[\s\-.]\d{4}").unwrap()
});
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:https?://|www\.)\S+").unwrap());
static NAME_SKIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)education|experience|projects|skills").unwrap());

const MAX_NAME_CHARS: usize = 120;
const MAX_LINKS: usize = 5;
const MAX_SECTIONS: usize = 12;

/// Canonical section names a resume heading may match (lowercased,
/// colon-stripped).
const SECTION_CANON: &[&str] = &[
    "header",
    "summary",
    "objective",
    "skills",
    "technical skills",
    "experience",
    "work experience",
    "professional experience",
    "projects",
    "education",
    "certifications",
    "awards",
    "publications",
    "activities",
    "volunteering",
];

/// Literal facts that must survive generation unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactInvariants {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub links: Vec<String>,
}

/// Pulls name/email/phone/links from raw resume text.
///
/// Name: first of the leading 6 non-empty lines that is not a section
/// keyword line. Email/phone: first regex match. Links: deduplicated in
/// first-seen order, capped.
pub fn extract_contact_bits(resume_text: &str) -> ContactInvariants {
    let text = resume_text.trim();
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut name = String::new();
    for line in lines.iter().take(6) {
        if !NAME_SKIP_RE.is_match(line) {
            name = line.chars().take(MAX_NAME_CHARS).collect();
            break;
        }
    }

    let email = EMAIL_RE
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    let phone = PHONE_RE
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    let mut links = Vec::new();
    for m in LINK_RE.find_iter(text) {
        let link = m.as_str();
        if !links.iter().any(|l| l == link) {
            links.push(link.to_string());
        }
        if links.len() == MAX_LINKS {
            break;
        }
    }

    ContactInvariants {
        name,
        email,
        phone,
        links,
    }
}

/// Strips surrounding punctuation and collapses internal whitespace.
pub fn normalize_heading(heading: &str) -> String {
    let trimmed = heading
        .trim_matches(|c: char| matches!(c, ' ' | '\t' | ':' | '-' | '•' | '—'))
        .trim();
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercased, colon-stripped dedup/ordering key for a heading.
pub fn heading_key(heading: &str) -> String {
    normalize_heading(heading)
        .to_lowercase()
        .trim_end_matches(':')
        .to_string()
}

fn is_all_uppercase(s: &str) -> bool {
    let mut has_cased = false;
    for c in s.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            has_cased = true;
        }
    }
    has_cased
}

fn is_title_case(s: &str) -> bool {
    let mut has_cased = false;
    let mut prev_cased = false;
    for c in s.chars() {
        if c.is_uppercase() {
            if prev_cased {
                return false;
            }
            has_cased = true;
            prev_cased = true;
        } else if c.is_lowercase() {
            if !prev_cased {
                return false;
            }
            has_cased = true;
            prev_cased = true;
        } else {
            prev_cased = false;
        }
    }
    has_cased
}

/// A line is a heading when it is short, and either visually cased like a
/// heading (≤6 words, all-caps or title-case) or a canonical section name.
pub fn looks_like_heading(line: &str) -> bool {
    let s = line.trim();
    let char_count = s.chars().count();
    if !(3..=80).contains(&char_count) {
        return false;
    }
    let s = s.strip_suffix(':').unwrap_or(s);
    let words = s.split_whitespace().count();
    if words <= 6 && (is_all_uppercase(s) || is_title_case(s)) {
        return true;
    }
    SECTION_CANON.contains(&s.to_lowercase().as_str())
}

/// Detects the resume's section heading order: normalized headings,
/// deduplicated by key preserving first occurrence, capped.
pub fn detect_section_order(resume_text: &str) -> Vec<String> {
    let mut order = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for raw in resume_text.lines() {
        if !looks_like_heading(raw) {
            continue;
        }
        let heading = normalize_heading(raw);
        let key = heading_key(&heading);
        if seen.insert(key) {
            order.push(heading);
            if order.len() == MAX_SECTIONS {
                break;
            }
        }
    }
    order
}
