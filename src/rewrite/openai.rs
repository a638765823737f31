//! OpenAI Chat Completions rewrite provider.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

use super::RewriteProvider;
use crate::article::RawArticle;

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

pub struct OpenAiRewriter {
    http: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAiRewriter {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("topic-news/0.1")
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(60))
            .build()
            .context("building openai http client")?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }

    /// Point the client at a compatible endpoint (proxies, local gateways).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

const SYSTEM_PROMPT: &str = "You rewrite news articles into detailed, engaging, multi-paragraph \
pieces. Respond with a JSON object only: {\"headline\": \"...\", \"body\": \"...\"}. \
The headline is plain text without labels or source names. The body is plain text \
paragraphs separated by blank lines, without a sources section or author byline.";

/// User prompt built from the article's metadata and original text.
pub fn build_prompt(article: &RawArticle) -> String {
    format!(
        "Article headline: \"{}\"\nArticle source: {}\nArticle published date: {}\n\nArticle content:\n{}\n",
        article.title,
        article.source,
        article.published_at,
        article.original_text()
    )
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Deserialize)]
struct Resp {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMsg,
}

#[derive(Deserialize)]
struct ChoiceMsg {
    content: Option<String>,
}

#[async_trait::async_trait]
impl RewriteProvider for OpenAiRewriter {
    async fn rewrite(&self, article: &RawArticle) -> Result<String> {
        if self.api_key.is_empty() {
            bail!("OPENAI_API_KEY not configured");
        }

        let prompt = build_prompt(article);
        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Msg {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: 0.85,
            max_tokens: 1200,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .context("openai request")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            bail!("openai returned {status}: {snippet}");
        }

        let body: Resp = resp.json().await.context("decoding openai response")?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| anyhow!("openai returned an empty completion"))
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_includes_metadata_and_fallback_text() {
        let a = RawArticle {
            title: "T".into(),
            description: Some("D".into()),
            content: None,
            source: "S".into(),
            url: "https://u".into(),
            published_at: "2024-01-01T00:00:00Z".into(),
        };
        let p = build_prompt(&a);
        assert!(p.contains("\"T\""));
        assert!(p.contains("Article source: S"));
        assert!(p.ends_with("D\n"));
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let r = OpenAiRewriter::new("", "gpt-4o-mini").unwrap();
        let err = r.rewrite(&RawArticle::default()).await.unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
