// tests/providers_newsapi.rs
//
// NewsApiProvider against a local stub of the NewsAPI endpoints.

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode, Uri},
    routing::get,
    Json, Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};

use common::serve;
use topic_news::config::QueryProfile;
use topic_news::ingest::{NewsApiProvider, SearchProvider};

#[derive(Debug, Clone)]
struct SeenRequest {
    path: String,
    query: HashMap<String, String>,
    api_key: Option<String>,
}

#[derive(Clone, Default)]
struct Seen(Arc<Mutex<Vec<SeenRequest>>>);

async fn articles(
    State(seen): State<Seen>,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<Value> {
    seen.0.lock().push(SeenRequest {
        path: uri.path().to_string(),
        query,
        api_key: headers
            .get("x-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    });
    Json(json!({
        "status": "ok",
        "totalResults": 2,
        "articles": [
            {"source": {"id": null, "name": "Wire"}, "title": "Fleet &amp; drills",
             "description": "<p>Naval drills</p>", "content": "Full text",
             "url": "https://news.example/fleet", "publishedAt": "2024-05-01T10:00:00Z"},
            {"source": {"name": "Wire"}, "title": "Removed", "url": null}
        ]
    }))
}

async fn stub() -> (Seen, String) {
    let seen = Seen::default();
    let app = Router::new()
        .route("/v2/everything", get(articles))
        .route("/v2/top-headlines", get(articles))
        .with_state(seen.clone());
    (seen, serve(app).await)
}

#[tokio::test]
async fn keyword_profile_queries_everything_with_key_header() {
    let (seen, base) = stub().await;
    let provider = NewsApiProvider::new("k-123", 5).unwrap().with_base_url(base);

    let out = provider
        .search(&QueryProfile::keywords(["war", "cold war"]))
        .await
        .expect("search ok");

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].title, "Fleet & drills");
    assert_eq!(out[0].description.as_deref(), Some("Naval drills"));
    assert_eq!(out[0].source, "Wire");
    assert_eq!(out[0].url, "https://news.example/fleet");

    let reqs = seen.0.lock().clone();
    assert_eq!(reqs.len(), 1);
    let req = &reqs[0];
    assert_eq!(req.path, "/v2/everything");
    assert_eq!(req.query["q"], r#""war" OR "cold war""#);
    assert_eq!(req.query["language"], "en");
    assert_eq!(req.query["sortBy"], "publishedAt");
    assert_eq!(req.query["pageSize"], "5");
    assert_eq!(req.api_key.as_deref(), Some("k-123"));
}

#[tokio::test]
async fn category_profile_uses_top_headlines() {
    let (seen, base) = stub().await;
    let provider = NewsApiProvider::new("k-123", 20).unwrap().with_base_url(base);
    let profile = QueryProfile {
        keywords: vec![],
        category: Some("science".into()),
    };

    let out = provider.search(&profile).await.expect("search ok");
    assert_eq!(out.len(), 1);

    let reqs = seen.0.lock().clone();
    assert_eq!(reqs[0].path, "/v2/top-headlines");
    assert_eq!(reqs[0].query["category"], "science");
    assert!(!reqs[0].query.contains_key("q"));
}

#[tokio::test]
async fn non_success_status_is_an_error_with_snippet() {
    let app = Router::new().route(
        "/v2/everything",
        get(|| async {
            (
                StatusCode::TOO_MANY_REQUESTS,
                r#"{"status":"error","code":"rateLimited"}"#,
            )
        }),
    );
    let base = serve(app).await;
    let provider = NewsApiProvider::new("k-123", 20).unwrap().with_base_url(base);

    let err = provider
        .search(&QueryProfile::keywords(["war"]))
        .await
        .unwrap_err()
        .to_string();
    assert!(err.contains("429"), "{err}");
    assert!(err.contains("rateLimited"), "{err}");
}
