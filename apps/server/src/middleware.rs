//! # Maintenance Gate
//!
//! With `MAINTENANCE_MODE` on, every page and API request is answered with a
//! temporary redirect to `/maintenance`. Static assets pass through so the
//! maintenance page itself can load its styles and icons.
//!
//! ```text
//! /dashboard              → 307 /maintenance
//! /api/products           → 307 /maintenance
//! /maintenance            → pass
//! /_next/static/app.js    → pass
//! /static/…, /assets/…    → pass
//! /favicon.ico, /logo.png → pass (file extension)
//! ```

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::debug;

use crate::state::AppState;

pub const MAINTENANCE_PATH: &str = "/maintenance";

const ASSET_PREFIXES: &[&str] = &["/_next/", "/static/", "/assets/"];

pub async fn maintenance_gate(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if state.config.maintenance_mode && !is_exempt(request.uri().path()) {
        debug!(path = %request.uri().path(), "Maintenance redirect");
        return Redirect::temporary(MAINTENANCE_PATH).into_response();
    }
    next.run(request).await
}

/// Paths served even during maintenance.
pub fn is_exempt(path: &str) -> bool {
    path == MAINTENANCE_PATH
        || path == "/favicon.ico"
        || ASSET_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
        || has_extension(path)
}

fn has_extension(path: &str) -> bool {
    let last = path.rsplit('/').next().unwrap_or("");
    match last.rsplit_once('.') {
        Some((stem, ext)) => !stem.is_empty() && !ext.is_empty(),
        None => false,
    }
}
