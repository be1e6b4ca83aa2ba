//! Shared application state.

use std::sync::Arc;

use biztrack_db::Database;

use crate::auth::JwtManager;
use crate::config::ServerConfig;
use crate::mailer::{HttpMailer, LogMailer, Mailer};

/// Everything a handler can reach. Immutable after startup; handlers
/// receive it as `State<Arc<AppState>>`.
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
    pub jwt: JwtManager,
    pub mailer: Arc<dyn Mailer>,
    /// Shared outbound client (proxy upstream, mail API)
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig, mailer: Arc<dyn Mailer>) -> Self {
        AppState {
            jwt: JwtManager::new(&config.jwt_secret, config.session_lifetime_secs),
            db,
            config,
            mailer,
            http: reqwest::Client::new(),
        }
    }

    /// State with the mailer chosen by configuration.
    pub fn from_config(db: Database, config: ServerConfig) -> Self {
        let http = reqwest::Client::new();
        let mailer: Arc<dyn Mailer> = match &config.mail {
            Some(mail) => Arc::new(HttpMailer::new(http.clone(), mail.clone())),
            None => Arc::new(LogMailer),
        };

        AppState {
            jwt: JwtManager::new(&config.jwt_secret, config.session_lifetime_secs),
            db,
            config,
            mailer,
            http,
        }
    }
}
