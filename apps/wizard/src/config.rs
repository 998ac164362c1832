use std::time::Duration;

use anyhow::{ensure, Context, Result};

const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed numbers abort startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the remote analysis gateway (keywords, CV generation, PDF download).
    pub api_url: String,
    pub port: u16,
    pub rust_log: String,
    pub request_timeout: Duration,
    /// Quiet period before a job description edit triggers keyword extraction.
    pub extraction_debounce: Duration,
    /// Artificial latency of the local fallback simulators.
    pub fallback_delay: Duration,
    /// Sessions not touched for this long are dropped.
    pub session_ttl: Duration,
    pub session_sweep_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let session_sweep_interval = Duration::from_secs(parse_env("SESSION_SWEEP_SECS", 60)?);
        ensure!(
            !session_sweep_interval.is_zero(),
            "SESSION_SWEEP_SECS must be greater than zero"
        );

        Ok(Config {
            api_url: std::env::var("RESUME_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            port: parse_env("PORT", 3000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            request_timeout: Duration::from_secs(parse_env("REQUEST_TIMEOUT_SECS", 30)?),
            extraction_debounce: Duration::from_millis(parse_env("EXTRACTION_DEBOUNCE_MS", 1000)?),
            fallback_delay: Duration::from_millis(parse_env("FALLBACK_DELAY_MS", 2000)?),
            session_ttl: Duration::from_secs(parse_env("SESSION_TTL_SECS", 1800)?),
            session_sweep_interval,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: DEFAULT_API_URL.to_string(),
            port: 3000,
            rust_log: "info".to_string(),
            request_timeout: Duration::from_secs(30),
            extraction_debounce: Duration::from_millis(1000),
            fallback_delay: Duration::from_millis(2000),
            session_ttl: Duration::from_secs(1800),
            session_sweep_interval: Duration::from_secs(60),
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_documented_values() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.extraction_debounce, Duration::from_secs(1));
        assert_eq!(config.fallback_delay, Duration::from_secs(2));
        assert_eq!(config.session_ttl, Duration::from_secs(30 * 60));
        assert_eq!(config.session_sweep_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_parse_env_missing_uses_default() {
        let value: u64 = parse_env("RESUME_WIZARD_TEST_UNSET_VAR", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("RESUME_WIZARD_TEST_BAD_PORT", "eighty");
        let result: Result<u16> = parse_env("RESUME_WIZARD_TEST_BAD_PORT", 3000);
        assert!(result.is_err());
        std::env::remove_var("RESUME_WIZARD_TEST_BAD_PORT");
    }
}
