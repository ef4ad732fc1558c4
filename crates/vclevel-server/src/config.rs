//! Server configuration
//!
//! One environment variable per setting; a `.env` file in the working
//! directory is loaded first when present.

use anyhow::{bail, Context, Result};
use std::net::SocketAddr;
use std::time::Duration;

use vclevel::LevelRewards;
use vclevel_integration_discord::DiscordConfig;

const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
const DEFAULT_PREFIX: &str = "!";
const DEFAULT_TICK_INTERVAL_SECS: u64 = 60;
const DEFAULT_STORE_TIMEOUT_MS: u64 = 5000;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub discord: DiscordConfig,
    pub database_url: String,
    pub redis_url: String,
    pub rewards: LevelRewards,
    pub tick_interval: Duration,
    pub store_timeout: Duration,
    pub http_bind: Option<SocketAddr>,
}

impl AppConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {:?}", path);
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let lookup = |key: &str| get(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| lookup(key).with_context(|| format!("{} is not set", key));

        let token = required("DISCORD_TOKEN")?;
        let guild_id = required("DISCORD_GUILD_ID")?
            .trim()
            .parse::<u64>()
            .context("DISCORD_GUILD_ID must be a numeric guild id")?;
        if guild_id == 0 {
            bail!("DISCORD_GUILD_ID must not be 0");
        }

        let prefix = lookup("COMMAND_PREFIX").unwrap_or_else(|| DEFAULT_PREFIX.to_string());
        let discord = DiscordConfig::new(token, guild_id).with_prefix(prefix);

        let rewards = match lookup("LEVEL_ROLES") {
            Some(raw) => raw
                .parse::<LevelRewards>()
                .context("LEVEL_ROLES must be level:role_id pairs separated by commas")?,
            None => LevelRewards::default(),
        };

        let tick_interval = Duration::from_secs(parse_or(
            &lookup,
            "TICK_INTERVAL_SECS",
            DEFAULT_TICK_INTERVAL_SECS,
        )?);
        if tick_interval.is_zero() {
            bail!("TICK_INTERVAL_SECS must be greater than 0");
        }

        let store_timeout = Duration::from_millis(parse_or(
            &lookup,
            "STORE_TIMEOUT_MS",
            DEFAULT_STORE_TIMEOUT_MS,
        )?);

        let http_bind = lookup("HTTP_BIND")
            .map(|v| v.trim().parse::<SocketAddr>())
            .transpose()
            .context("HTTP_BIND must be a socket address such as 0.0.0.0:8080")?;

        Ok(Self {
            discord,
            database_url: required("DATABASE_URL")?,
            redis_url: lookup("REDIS_URL").unwrap_or_else(|| DEFAULT_REDIS_URL.to_string()),
            rewards,
            tick_interval,
            store_timeout,
            http_bind,
        })
    }
}

fn parse_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Result<u64> {
    match lookup(key) {
        Some(v) => v
            .trim()
            .parse()
            .with_context(|| format!("{} must be a non-negative integer", key)),
        None => Ok(default),
    }
}
