// src/ingest/newsapi.rs
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use metrics::counter;
use serde::Deserialize;

use crate::article::RawArticle;
use crate::config::topics::QueryProfile;
use crate::ingest::{build_query, normalize_text, SearchProvider};

const DEFAULT_BASE_URL: &str = "https://newsapi.org";

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    articles: Vec<Item>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Item {
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
    source: Option<ItemSource>,
}

#[derive(Debug, Deserialize)]
struct ItemSource {
    name: Option<String>,
}

/// NewsAPI.org search provider.
pub struct NewsApiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    page_size: u32,
}

impl NewsApiProvider {
    pub fn new(api_key: impl Into<String>, page_size: u32) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("topic-news/0.1")
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()
            .context("building newsapi http client")?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: page_size.clamp(1, 100),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request(&self, profile: &QueryProfile) -> reqwest::RequestBuilder {
        let page_size = self.page_size.to_string();
        let q = build_query(&profile.keywords);
        match (&profile.category, profile.keywords.is_empty()) {
            (Some(category), true) => self
                .client
                .get(format!("{}/v2/top-headlines", self.base_url))
                .query(&[
                    ("category", category.as_str()),
                    ("language", "en"),
                    ("pageSize", page_size.as_str()),
                ]),
            _ => self
                .client
                .get(format!("{}/v2/everything", self.base_url))
                .query(&[
                    ("q", q.as_str()),
                    ("language", "en"),
                    ("sortBy", "publishedAt"),
                    ("pageSize", page_size.as_str()),
                ]),
        }
    }
}

/// Map provider items into raw articles, dropping items without a URL.
fn into_articles(env: Envelope) -> Vec<RawArticle> {
    env.articles
        .into_iter()
        .filter_map(|it| {
            let url = it.url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())?;
            Some(RawArticle {
                title: normalize_text(it.title.as_deref().unwrap_or_default()),
                description: it.description.as_deref().map(normalize_text),
                content: it.content.as_deref().map(normalize_text),
                source: it
                    .source
                    .and_then(|s| s.name)
                    .unwrap_or_else(|| "Unknown".to_string()),
                url,
                published_at: it.published_at.unwrap_or_default(),
            })
        })
        .collect()
}

#[async_trait]
impl SearchProvider for NewsApiProvider {
    async fn search(&self, profile: &QueryProfile) -> Result<Vec<RawArticle>> {
        if self.api_key.is_empty() {
            bail!("NEWS_API_KEY not configured");
        }

        let resp = match self
            .request(profile)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                counter!("search_provider_errors_total").increment(1);
                return Err(e).context("newsapi get()");
            }
        };

        let status = resp.status();
        if !status.is_success() {
            counter!("search_provider_errors_total").increment(1);
            let body = resp.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            bail!("newsapi returned {status}: {snippet}");
        }

        let env: Envelope = resp.json().await.context("decoding newsapi response")?;
        Ok(into_articles(env))
    }

    fn name(&self) -> &'static str {
        "newsapi"
    }
}
