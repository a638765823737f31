// src/ingest/mod.rs
pub mod newsapi;

use anyhow::Result;
use once_cell::sync::OnceCell;

use crate::article::RawArticle;
use crate::config::topics::QueryProfile;

pub use newsapi::NewsApiProvider;

#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    /// Fetch raw articles matching `profile`, in provider order.
    async fn search(&self, profile: &QueryProfile) -> Result<Vec<RawArticle>>;
    fn name(&self) -> &'static str;
}

/// Render keywords as a quoted OR query: `"war" OR "cold war"`.
pub fn build_query(keywords: &[String]) -> String {
    keywords
        .iter()
        .map(|k| format!("\"{}\"", k.replace('"', "")))
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// Normalize provider text: decode HTML entities, strip tags, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[a-z][^>]*>").expect("tags regex"));
    let out = re_tags.replace_all(&decoded, "");

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"[ \t\u{a0}]+").expect("ws regex"));
    re_ws.replace_all(&out, " ").trim().to_string()
}
