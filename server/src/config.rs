use std::{env, str::FromStr, time::Duration};

use tracing::warn;

/// Runtime settings read from the environment once at start-up.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub cleanup_interval: Duration,
    pub inactive_timeout_secs: u64,
    pub active_timeout_secs: u64,
    pub games_per_minute: u32,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            cleanup_interval: Duration::from_secs(60),
            inactive_timeout_secs: 600,
            active_timeout_secs: 86400,
            games_per_minute: 10,
            cors_allowed_origins: vec!["http://localhost:5173".to_string()],
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring unparsable {}={:?}", key, value);
            default
        }),
        Err(_) => default,
    }
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|value| parse_origins(&value))
            .unwrap_or(defaults.cors_allowed_origins);

        Self {
            cleanup_interval: Duration::from_secs(env_or(
                "CLEANUP_INTERVAL_SECONDS",
                defaults.cleanup_interval.as_secs(),
            )),
            inactive_timeout_secs: env_or(
                "INACTIVE_GAME_TIMEOUT_SECONDS",
                defaults.inactive_timeout_secs,
            ),
            active_timeout_secs: env_or("ACTIVE_GAME_TIMEOUT_SECONDS", defaults.active_timeout_secs),
            games_per_minute: env_or("RATE_LIMIT_GAMES_PER_MINUTE", defaults.games_per_minute),
            cors_allowed_origins,
        }
    }
}
