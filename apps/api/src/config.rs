use anyhow::{bail, Context, Result};

pub const DEFAULT_SNAPSHOT_KEY_PREFIX: &str = "pathway:progress";
pub const DEFAULT_TRACKER_CACHE_CAPACITY: usize = 10_000;

/// Application configuration loaded from environment variables.
/// Fails at startup if no generation backend is configured.
#[derive(Debug, Clone)]
pub struct Config {
    /// Absent → snapshots live in process memory only.
    pub redis_url: Option<String>,
    pub anthropic_api_key: Option<String>,
    /// Takes precedence over the LLM backend when set.
    pub roadmap_function_url: Option<String>,
    pub roadmap_function_key: Option<String>,
    pub snapshot_key_prefix: String,
    /// Learners kept in memory before idle ones are evicted.
    pub tracker_cache_capacity: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            redis_url: optional_env("REDIS_URL"),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            roadmap_function_url: optional_env("ROADMAP_FUNCTION_URL"),
            roadmap_function_key: optional_env("ROADMAP_FUNCTION_KEY"),
            snapshot_key_prefix: optional_env("SNAPSHOT_KEY_PREFIX")
                .unwrap_or_else(|| DEFAULT_SNAPSHOT_KEY_PREFIX.to_string()),
            tracker_cache_capacity: optional_env("TRACKER_CACHE_CAPACITY")
                .map(|v| v.parse::<usize>())
                .transpose()
                .context("TRACKER_CACHE_CAPACITY must be a positive integer")?
                .unwrap_or(DEFAULT_TRACKER_CACHE_CAPACITY),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.roadmap_function_url.is_none() && self.anthropic_api_key.is_none() {
            bail!("Set either ROADMAP_FUNCTION_URL or ANTHROPIC_API_KEY to enable roadmap generation");
        }
        if self.tracker_cache_capacity == 0 {
            bail!("TRACKER_CACHE_CAPACITY must be at least 1");
        }
        Ok(())
    }
}

/// Reads an env var, treating empty values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
