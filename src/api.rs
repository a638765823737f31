use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::article::ArticleView;
use crate::query::{QueryService, DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::refresh::{RefreshError, RefreshOrchestrator, RefreshOutcome};
use crate::store::today_utc;
use crate::topic::Topic;

#[derive(Clone)]
pub struct AppState {
    pub query: Arc<QueryService>,
    pub orchestrator: Arc<RefreshOrchestrator>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/topics", get(list_topics))
        .route("/news/{topic}", get(get_news))
        .route("/refresh", post(refresh_all))
        .route("/refresh/{topic}", post(refresh_topic))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, error) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
        };
        (
            code,
            Json(ErrorBody {
                error,
                status: "error",
            }),
        )
            .into_response()
    }
}

fn parse_topic(raw: &str) -> Result<Topic, ApiError> {
    raw.parse::<Topic>()
        .map_err(|_| ApiError::BadRequest("Invalid topic".to_string()))
}

async fn list_topics() -> Json<Vec<&'static str>> {
    Json(Topic::ALL.iter().map(|t| t.as_str()).collect())
}

#[derive(Debug, Deserialize)]
struct PageParams {
    page: Option<String>,
    #[serde(rename = "pageSize")]
    page_size: Option<String>,
}

/// Lenient positive integer: missing, non-numeric or zero → `default`.
fn positive_or(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

async fn get_news(
    State(state): State<AppState>,
    Path(topic): Path<String>,
    Query(q): Query<PageParams>,
) -> Result<Json<Vec<ArticleView>>, ApiError> {
    let topic = parse_topic(&topic)?;
    let page = positive_or(q.page.as_deref(), DEFAULT_PAGE);
    let page_size = positive_or(q.page_size.as_deref(), DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);

    let records = state
        .query
        .get_page(topic, page, page_size, today_utc())
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, %topic, "reading shards failed");
            ApiError::Internal("Failed to load articles".to_string())
        })?;
    Ok(Json(records.into_iter().map(ArticleView::from).collect()))
}

#[derive(Debug, Serialize)]
struct TopicRefresh {
    topic: Topic,
    status: &'static str,
    added: usize,
    total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl TopicRefresh {
    fn from_result(topic: Topic, res: &Result<RefreshOutcome, RefreshError>) -> Self {
        let (status, added, total, error) = match res {
            Ok(RefreshOutcome::Refreshed { added, total }) => ("refreshed", *added, *total, None),
            Ok(RefreshOutcome::QuotaMet { total }) => ("quota_met", 0, *total, None),
            Ok(RefreshOutcome::AlreadyRunning) => ("already_running", 0, 0, None),
            Err(e) => ("failed", 0, 0, Some(e.to_string())),
        };
        Self {
            topic,
            status,
            added,
            total,
            error,
        }
    }
}

#[derive(Debug, Serialize)]
struct RefreshBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    results: Vec<TopicRefresh>,
}

fn refresh_response(results: Vec<(Topic, Result<RefreshOutcome, RefreshError>)>) -> Response {
    let failed = results.iter().filter(|(_, r)| r.is_err()).count();
    let rows = results
        .iter()
        .map(|(t, r)| TopicRefresh::from_result(*t, r))
        .collect();

    if failed == 0 {
        let body = RefreshBody {
            message: Some(format!("Refreshed {} topic(s).", results.len())),
            error: None,
            results: rows,
        };
        (StatusCode::OK, Json(body)).into_response()
    } else {
        let body = RefreshBody {
            message: None,
            error: Some(format!("Failed to refresh {failed} topic(s).")),
            results: rows,
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

async fn refresh_all(State(state): State<AppState>) -> Response {
    let results = state.orchestrator.refresh_all().await;
    refresh_response(results)
}

async fn refresh_topic(
    State(state): State<AppState>,
    Path(topic): Path<String>,
) -> Result<Response, ApiError> {
    let topic = parse_topic(&topic)?;
    let res = state.orchestrator.run_topic(topic).await;
    Ok(refresh_response(vec![(topic, res)]))
}
