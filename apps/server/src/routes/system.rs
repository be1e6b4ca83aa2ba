//! Health check and the maintenance page.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::middleware::MAINTENANCE_PATH;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route(MAINTENANCE_PATH, get(maintenance_page))
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub database: bool,
    pub version: &'static str,
}

/// GET /health. 503 when the database does not answer.
async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Health>) {
    let database = state.db.health_check().await;
    let (status, label) = if database {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(Health {
            status: label,
            database,
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

const MAINTENANCE_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>BizTrack - Maintenance</title>
</head>
<body style="font-family: system-ui, sans-serif; text-align: center; padding: 4rem 1rem;">
  <h1>We'll be right back</h1>
  <p>BizTrack is undergoing scheduled maintenance. Please check again shortly.</p>
</body>
</html>
"#;

async fn maintenance_page() -> Html<&'static str> {
    Html(MAINTENANCE_HTML)
}
