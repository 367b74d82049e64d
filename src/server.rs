//! JSON HTTP surface over the analyzer

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::analyze::{self, StatusPolicy};
use crate::config::ScoringConfig;
use crate::error::{ErrorBody, LpError, Result};

pub struct ServerState {
    pub scoring: ScoringConfig,
    pub policy: StatusPolicy,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeQuery {
    url: Option<String>,
}

pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/api/analyze", get(analyze_get).post(analyze_post))
        .route("/api/ping", get(ping))
        .route("/api/weights", get(weights))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Bind and serve until the process is stopped
pub async fn serve(addr: &str, state: ServerState) -> Result<()> {
    let app = router(Arc::new(state));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local: SocketAddr = listener.local_addr()?;
    log::info!("lpcheck API listening on http://{}", local);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn analyze_get(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<AnalyzeQuery>,
) -> Response {
    run_analysis(state, params.url).await
}

async fn analyze_post(State(state): State<Arc<ServerState>>, body: Bytes) -> Response {
    // an unreadable body is treated like a missing url
    let params: AnalyzeQuery = serde_json::from_slice(&body).unwrap_or_default();
    run_analysis(state, params.url).await
}

async fn run_analysis(state: Arc<ServerState>, url: Option<String>) -> Response {
    let Some(url) = url.filter(|u| !u.trim().is_empty()) else {
        return error_response(&LpError::InvalidUrl("missing url".into()));
    };

    let worker_state = state.clone();
    let target = url.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        analyze::analyze_url(&target, &worker_state.scoring, worker_state.policy)
    })
    .await;

    match outcome {
        Ok(Ok(analysis)) => {
            log::info!(
                "analyzed {} -> {:.1} ({})",
                url,
                analysis.result.scores.overall,
                analysis.status
            );
            Json(analysis).into_response()
        }
        Ok(Err(err)) => {
            log::warn!("analyze {} failed: {}", url, err);
            error_response(&err)
        }
        Err(join_err) => {
            log::warn!("analyzer task for {} aborted: {}", url, join_err);
            let mut body = ErrorBody::new("Analyzer failed");
            body.detail = Some(join_err.to_string());
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

fn error_response(err: &LpError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorBody::from(err))).into_response()
}

async fn ping() -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "ping": "up" }))
}

async fn weights(State(state): State<Arc<ServerState>>) -> Json<ScoringConfig> {
    Json(state.scoring.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> Arc<ServerState> {
        Arc::new(ServerState {
            scoring: ScoringConfig::default(),
            policy: StatusPolicy::Reject,
        })
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_missing_url_is_bad_request() {
        let response = analyze_get(State(state()), Query(AnalyzeQuery::default())).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Provide a full URL starting with http(s)://");
    }

    #[tokio::test]
    async fn test_post_rejects_relative_url() {
        let body = Bytes::from_static(br#"{"url":"example.com/landing"}"#);
        let response = analyze_post(State(state()), body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_post_with_garbage_body() {
        let response = analyze_post(State(state()), Bytes::from_static(b"not json")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_ping() {
        let Json(value) = ping().await;
        assert_eq!(value, json!({ "ok": true, "ping": "up" }));
    }

    #[tokio::test]
    async fn test_weights_exposes_policy() {
        let Json(config) = weights(State(state())).await;
        assert_eq!(config, ScoringConfig::default());
    }
}
