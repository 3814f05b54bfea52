use std::time::Duration;

use serde::Deserialize;

use cisne_core::config::Config;

/// API service configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    /// Database connection URL (PostgreSQL in production, SQLite accepted).
    pub database_url: String,
    /// HS256 signing secret for session tokens. Env var: `JWT_SECRET`.
    pub jwt_secret: String,
    /// Session lifetime in seconds (default seven days). Env var: `JWT_TTL_SECS`.
    #[serde(default = "default_jwt_ttl_secs")]
    pub jwt_ttl_secs: u64,
    /// TCP port for the HTTP server (default 8080). Env var: `API_PORT`.
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// Comma-separated CORS origins; empty disables cross-origin access.
    #[serde(default)]
    pub cors_allowed_origins: String,
    /// Apply pending migrations at startup (default true).
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

fn default_jwt_ttl_secs() -> u64 {
    7 * 24 * 60 * 60
}

fn default_api_port() -> u16 {
    8080
}

fn default_run_migrations() -> bool {
    true
}

impl Config for ApiConfig {}

impl ApiConfig {
    pub fn jwt_ttl(&self) -> Duration {
        Duration::from_secs(self.jwt_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn should_apply_defaults() {
        let config = ApiConfig::from_vars(vars(&[
            ("DATABASE_URL", "postgres://localhost/cisne"),
            ("JWT_SECRET", "s3cret"),
        ]))
        .unwrap();
        assert_eq!(config.api_port, 8080);
        assert_eq!(config.jwt_ttl(), Duration::from_secs(604_800));
        assert!(config.cors_allowed_origins.is_empty());
        assert!(config.run_migrations);
    }

    #[test]
    fn should_read_overrides() {
        let config = ApiConfig::from_vars(vars(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("JWT_SECRET", "s3cret"),
            ("JWT_TTL_SECS", "60"),
            ("API_PORT", "3000"),
            ("CORS_ALLOWED_ORIGINS", "http://localhost:8081"),
            ("RUN_MIGRATIONS", "false"),
        ]))
        .unwrap();
        assert_eq!(config.api_port, 3000);
        assert_eq!(config.jwt_ttl_secs, 60);
        assert_eq!(config.cors_allowed_origins, "http://localhost:8081");
        assert!(!config.run_migrations);
    }

    #[test]
    fn should_require_jwt_secret() {
        let result = ApiConfig::from_vars(vars(&[("DATABASE_URL", "sqlite::memory:")]));
        assert!(result.is_err());
    }
}
