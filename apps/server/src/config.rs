//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. `main` loads an optional `.env` file first (dotenvy).

use std::env;
use std::net::SocketAddr;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: 0.0.0.0)
    pub host: String,

    /// HTTP port (default: 3000)
    pub port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Secret for signing session tokens
    pub jwt_secret: String,

    /// Session token lifetime in seconds (default: 7 days)
    pub session_lifetime_secs: i64,

    /// Redirect every page request to /maintenance
    pub maintenance_mode: bool,

    /// Verification code lifetime
    pub otp_ttl_minutes: i64,

    /// Public base URL, used in invitation links
    pub app_url: String,

    /// Mail API settings; `None` logs outgoing mail instead of sending it
    pub mail: Option<MailConfig>,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub from: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_path: "./biztrack.db".to_string(),
            jwt_secret: "biztrack-dev-secret-change-in-production".to_string(),
            session_lifetime_secs: 604_800,
            maintenance_mode: false,
            otp_ttl_minutes: 10,
            app_url: "http://localhost:3000".to_string(),
            mail: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from any key lookup. `load` passes the process
    /// environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServerConfig::default();

        let config = ServerConfig {
            host: lookup("BIZTRACK_HOST").unwrap_or(defaults.host),

            port: parse_or("BIZTRACK_PORT", lookup("BIZTRACK_PORT"), defaults.port)?,

            database_path: lookup("DATABASE_PATH").unwrap_or(defaults.database_path),

            jwt_secret: lookup("JWT_SECRET").unwrap_or(defaults.jwt_secret),

            session_lifetime_secs: parse_or(
                "SESSION_LIFETIME_SECS",
                lookup("SESSION_LIFETIME_SECS"),
                defaults.session_lifetime_secs,
            )?,

            maintenance_mode: lookup("MAINTENANCE_MODE")
                .map(|v| is_truthy(&v))
                .unwrap_or(false),

            otp_ttl_minutes: parse_or(
                "OTP_TTL_MINUTES",
                lookup("OTP_TTL_MINUTES"),
                defaults.otp_ttl_minutes,
            )?,

            app_url: lookup("APP_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.app_url),

            mail: match lookup("MAIL_API_URL").filter(|u| !u.is_empty()) {
                Some(api_url) => Some(MailConfig {
                    api_url,
                    api_key: lookup("MAIL_API_KEY"),
                    from: lookup("MAIL_FROM")
                        .ok_or_else(|| ConfigError::MissingRequired("MAIL_FROM".to_string()))?,
                }),
                None => None,
            },
        };

        if config.jwt_secret.is_empty() {
            return Err(ConfigError::InvalidValue("JWT_SECRET".to_string()));
        }
        if config.session_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("SESSION_LIFETIME_SECS".to_string()));
        }
        if config.otp_ttl_minutes <= 0 {
            return Err(ConfigError::InvalidValue("OTP_TTL_MINUTES".to_string()));
        }

        Ok(config)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("BIZTRACK_HOST".to_string()))
    }

    pub fn otp_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.otp_ttl_minutes)
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.database_path, "./biztrack.db");
        assert_eq!(config.session_lifetime_secs, 604_800);
        assert_eq!(config.otp_ttl_minutes, 10);
        assert!(!config.maintenance_mode);
        assert!(config.mail.is_none());
        assert_eq!(config.bind_addr().unwrap().port(), 3000);
    }

    #[test]
    fn test_maintenance_flag_values() {
        assert!(load(&[("MAINTENANCE_MODE", "true")]).unwrap().maintenance_mode);
        assert!(load(&[("MAINTENANCE_MODE", "1")]).unwrap().maintenance_mode);
        assert!(!load(&[("MAINTENANCE_MODE", "off")]).unwrap().maintenance_mode);
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[("BIZTRACK_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(key) if key == "BIZTRACK_PORT"));
    }

    #[test]
    fn test_mail_requires_from() {
        let err = load(&[("MAIL_API_URL", "https://mail.example/send")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired(_)));

        let config = load(&[
            ("MAIL_API_URL", "https://mail.example/send"),
            ("MAIL_FROM", "no-reply@biztrack.app"),
        ])
        .unwrap();
        assert_eq!(config.mail.unwrap().from, "no-reply@biztrack.app");
    }

    #[test]
    fn test_app_url_trailing_slash() {
        let config = load(&[("APP_URL", "https://biztrack.app/")]).unwrap();
        assert_eq!(config.app_url, "https://biztrack.app");
    }
}
