// src/article.rs
use serde::{Deserialize, Serialize};

/// Article as returned by the search provider, before rewriting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub source: String,       // outlet name, e.g. "Reuters"
    pub url: String,          // identity key once stored
    pub published_at: String, // ISO-8601
}

impl RawArticle {
    /// Original text used for rewriting and as the fallback body.
    pub fn original_text(&self) -> &str {
        self.content
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(self.description.as_deref())
            .unwrap_or("")
    }
}

/// How the stored body was produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewriteStatus {
    #[default]
    Rewritten,
    Fallback,
}

/// One persisted article inside a shard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    /// Original source URL; unique across a topic's history.
    pub id: String,
    pub title: String,
    pub source: String,
    pub published_at: String,
    pub rewritten_body: String,
    pub original_url: String,
    #[serde(default)]
    pub rewrite: RewriteStatus,
}

/// Public projection of [`ArticleRecord`] served by the read API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleView {
    pub id: String,
    pub title: String,
    pub source: String,
    pub published_at: String,
    pub rewritten_body: String,
    pub original_url: String,
}

impl From<ArticleRecord> for ArticleView {
    fn from(r: ArticleRecord) -> Self {
        Self {
            id: r.id,
            title: r.title,
            source: r.source,
            published_at: r.published_at,
            rewritten_body: r.rewritten_body,
            original_url: r.original_url,
        }
    }
}
