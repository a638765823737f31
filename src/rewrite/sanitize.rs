//! Text cleaning for rewrite-provider output.
//!
//! Both cleaners are pure and idempotent: `clean(clean(x)) == clean(x)`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Leading markup or label on a line: `# `, `**Title:**`, `Headline:`.
static RE_TITLE_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:#+\s*|(?:title|headline)\s*:\s*)").expect("title prefix regex")
});

/// Trailing ` - Source` / ` — Source` attribution.
static RE_TITLE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s[-\u{2013}\u{2014}]\s.*$").expect("title suffix regex"));

/// `Title:` label at the start of a body line, optionally bolded.
static RE_BODY_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*[*_]*\s*title\s*:\s*[*_]*\s*").expect("body label regex")
});

/// `Authored by <outlet> — <anything>` lines echoed by the generator. The dash
/// must stand alone, so prose like `Authored by well-known researchers` stays.
static RE_ATTRIBUTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[\s*_]*authored by\s+\S.*?\s+[-\u{2013}\u{2014}](?:\s.*)?$")
        .expect("attribution regex")
});

/// Clean a generated headline down to a single plain-text line.
pub fn clean_title(raw: &str) -> String {
    let line = raw
        .lines()
        .map(strip_title_prefixes)
        .find(|l| !l.is_empty())
        .unwrap_or_default();
    RE_TITLE_SUFFIX.replace(&line, "").trim().to_string()
}

fn strip_title_prefixes(line: &str) -> String {
    let mut out = line.replace('*', "").trim().to_string();
    while let Some(m) = RE_TITLE_PREFIX.find(&out) {
        if m.end() == 0 {
            break;
        }
        out = out[m.end()..].trim().to_string();
    }
    out
}

/// Drop echoed attribution lines and stray `Title:` labels from a body.
pub fn clean_body(raw: &str) -> String {
    let kept: Vec<String> = raw
        .lines()
        .map(strip_body_label)
        .filter(|l| !RE_ATTRIBUTION.is_match(l))
        .collect();
    kept.join("\n").trim().to_string()
}

fn strip_body_label(line: &str) -> String {
    let mut out = line.to_string();
    while let Some(m) = RE_BODY_LABEL.find(&out) {
        if m.end() == 0 {
            break;
        }
        out = out[m.end()..].to_string();
    }
    out
}
