// src/rewrite/mod.rs
//! Rewrite provider abstraction plus the parse contract for its output.

pub mod openai;
pub mod sanitize;

use anyhow::Result;
use serde::Deserialize;

use crate::article::RawArticle;

pub use openai::OpenAiRewriter;
pub use sanitize::{clean_body, clean_title};

#[async_trait::async_trait]
pub trait RewriteProvider: Send + Sync {
    /// Return the provider's raw generated text for `article`.
    async fn rewrite(&self, article: &RawArticle) -> Result<String>;
    fn name(&self) -> &'static str;
}

/// Headline/body pair extracted from generated text, before cleaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArticle {
    pub headline: String,
    pub body: String,
}

#[derive(Deserialize)]
struct GeneratedJson {
    #[serde(alias = "title")]
    headline: String,
    #[serde(alias = "content", alias = "article")]
    body: String,
}

/// Split generated text into headline and body.
///
/// Preferred shape is a JSON object `{"headline", "body"}` (optionally inside a
/// Markdown code fence). Plain text falls back to "headline, blank line, body".
pub fn parse_generated(text: &str) -> Option<GeneratedArticle> {
    let normalized = text.replace("\r\n", "\n");
    let trimmed = strip_code_fence(normalized.trim());
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.starts_with('{') {
        if let Ok(v) = serde_json::from_str::<GeneratedJson>(trimmed) {
            return Some(GeneratedArticle {
                headline: v.headline,
                body: v.body,
            });
        }
    }

    match trimmed.find("\n\n") {
        Some(idx) if idx > 0 => Some(GeneratedArticle {
            headline: trimmed[..idx].trim().to_string(),
            body: trimmed[idx..].trim().to_string(),
        }),
        _ => Some(GeneratedArticle {
            headline: trimmed.lines().next().unwrap_or_default().to_string(),
            body: trimmed.to_string(),
        }),
    }
}

fn strip_code_fence(s: &str) -> &str {
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    // Drop the info string (```json) on the opening line.
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Deterministic trailer citing the original article.
pub fn sources_trailer(article: &RawArticle) -> String {
    format!("\n\nSources:\n- {} ({})", article.title, article.url)
}

/// Turn raw generated text into a stored `(title, body)` pair.
///
/// Returns `None` when nothing usable survives cleaning; callers then fall back
/// to the original article text.
pub fn finish_rewrite(article: &RawArticle, generated: &str) -> Option<(String, String)> {
    let parsed = parse_generated(generated)?;
    let body = clean_body(&parsed.body);
    if body.is_empty() {
        return None;
    }
    let mut title = clean_title(&parsed.headline);
    if title.is_empty() {
        title = article.title.clone();
    }
    Some((title, body + &sources_trailer(article)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article() -> RawArticle {
        RawArticle {
            title: "Original headline".into(),
            description: Some("desc".into()),
            content: None,
            source: "Wire".into(),
            url: "https://example.com/a".into(),
            published_at: "2024-05-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn parses_json_object_inside_fence() {
        let text = "```json\n{\"headline\": \"H\", \"body\": \"B\"}\n```";
        assert_eq!(
            parse_generated(text),
            Some(GeneratedArticle {
                headline: "H".into(),
                body: "B".into()
            })
        );
    }

    #[test]
    fn falls_back_to_blank_line_split() {
        let g = parse_generated("**Title:** Big News\r\n\r\nPara one.\n\nPara two.").unwrap();
        assert_eq!(g.headline, "**Title:** Big News");
        assert_eq!(g.body, "Para one.\n\nPara two.");
    }

    #[test]
    fn single_block_uses_first_line_as_headline() {
        let g = parse_generated("Only line\nsecond line").unwrap();
        assert_eq!(g.headline, "Only line");
        assert_eq!(g.body, "Only line\nsecond line");
    }

    #[test]
    fn empty_output_is_not_a_rewrite() {
        assert_eq!(parse_generated("   "), None);
        assert_eq!(finish_rewrite(&article(), r#"{"headline":"H","body":"  "}"#), None);
    }

    #[test]
    fn finish_cleans_and_appends_sources() {
        let (title, body) = finish_rewrite(
            &article(),
            r#"{"headline":"**Title:** Fresh Take - NWO News","body":"Authored by NWO News — desk\nText."}"#,
        )
        .unwrap();
        assert_eq!(title, "Fresh Take");
        assert_eq!(
            body,
            "Text.\n\nSources:\n- Original headline (https://example.com/a)"
        );
    }

    #[test]
    fn empty_headline_keeps_original_title() {
        let (title, _) = finish_rewrite(&article(), r#"{"headline":"","body":"x"}"#).unwrap();
        assert_eq!(title, "Original headline");
    }
}
