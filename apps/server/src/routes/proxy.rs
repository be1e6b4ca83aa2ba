//! # Proxy
//!
//! `GET /api/proxy?url=<target>` fetches an external resource and streams
//! it back with the upstream `content-type`.
//!
//! ```text
//! url missing / empty          → 400 {"error": "..."}
//! not an absolute http(s) URL  → 500 {"error": "..."}
//! upstream unreachable         → 500 {"error": "..."}
//! otherwise                    → upstream status, content-type, streamed body
//! ```

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/proxy", get(proxy))
}

#[derive(Debug, Deserialize)]
pub struct ProxyQuery {
    pub url: Option<String>,
}

async fn proxy(State(state): State<Arc<AppState>>, Query(query): Query<ProxyQuery>) -> Response {
    let Some(target) = query.url.filter(|u| !u.trim().is_empty()) else {
        return failure(StatusCode::BAD_REQUEST, "Missing url parameter");
    };

    let url = match Url::parse(target.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url,
        _ => {
            warn!(%target, "Proxy target is not an http(s) URL");
            return failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch resource");
        }
    };

    let upstream = match state.http.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            warn!(%url, error = %e, "Proxy fetch failed");
            return failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch resource");
        }
    };

    debug!(%url, status = %upstream.status(), "Proxying upstream response");

    let status = upstream.status();
    let content_type = upstream.headers().get(CONTENT_TYPE).cloned();

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    if let Some(content_type) = content_type {
        response.headers_mut().insert(CONTENT_TYPE, content_type);
    }
    response
}

fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
