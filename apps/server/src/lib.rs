//! # BizTrack Server
//!
//! axum HTTP server exposing the server actions as JSON routes.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Request Pipeline                                │
//! │                                                                         │
//! │  request ──► TraceLayer ──► maintenance_gate ──► route                  │
//! │                                  │                 │                    │
//! │                         307 /maintenance           ├── Session (JWT)    │
//! │                                                    ├── ActionJson<T>    │
//! │                                                    ├── validate()       │
//! │                                                    ├── repository call  │
//! │                                                    ▼                    │
//! │                                   200 { success, data | error }         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (see [`ServerConfig`]):
//! - `BIZTRACK_HOST` / `BIZTRACK_PORT` - bind address (default 0.0.0.0:3000)
//! - `DATABASE_PATH` - SQLite file (default ./biztrack.db)
//! - `JWT_SECRET` - session signing secret
//! - `SESSION_LIFETIME_SECS` - session lifetime (default 604800)
//! - `MAINTENANCE_MODE` - redirect everything to /maintenance
//! - `OTP_TTL_MINUTES` - verification code lifetime (default 10)
//! - `APP_URL` - public base URL for invitation links
//! - `MAIL_API_URL` / `MAIL_API_KEY` / `MAIL_FROM` - mail API; unset logs mail

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod mailer;
pub mod middleware;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::{Json, Router};
use biztrack_core::ActionResponse;
use tower_http::trace::TraceLayer;

// Re-exports
pub use config::{ConfigError, MailConfig, ServerConfig};
pub use error::{ActionError, ErrorCode};
pub use mailer::{Email, HttpMailer, LogMailer, MailError, Mailer};
pub use state::AppState;

/// Builds the full application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    routes::router()
        // Before the gate so unknown paths are redirected during maintenance too.
        .fallback(not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::maintenance_gate,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> (StatusCode, Json<ActionResponse<()>>) {
    (StatusCode::NOT_FOUND, Json(ActionResponse::fail("Not found")))
}
