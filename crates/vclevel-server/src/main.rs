//! VC Level bot
//!
//! Wires the Postgres durable store, the Redis fast store, the Discord
//! gateway and the progression engine together.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from the environment
//! 3. Connect PostgreSQL and run migrations, connect Redis
//! 4. Flush the Redis cache
//! 5. Build the Discord client, sink and progression engine
//! 6. Serve the status API (optional) and run the gateway

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use vclevel::{
    DurableStore, EngineConfig, FastStore, MembershipTracker, ProgressionEngine,
    ProgressionRepository, RepositoryConfig,
};
use vclevel_integration_discord::{intents, DiscordClient, DiscordHandler, DiscordSink};

mod adapters;
mod config;
mod routes;

use adapters::{PgProgressStore, RedisProgressCache};
use config::AppConfig;

/// Repository with the concrete store implementations
pub type AppRepository = ProgressionRepository<PgProgressStore, RedisProgressCache>;

/// Application state shared across all routes
pub struct AppState<D: DurableStore, F: FastStore> {
    pub repository: Arc<ProgressionRepository<D, F>>,
    pub membership: MembershipTracker,
}

impl<D: DurableStore, F: FastStore> Clone for AppState<D, F> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            membership: self.membership.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    tracing::info!("🎧 VC Level initializing...");

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    tracing::info!(
        guild_id = config.discord.guild_id,
        tick_interval_secs = config.tick_interval.as_secs(),
        level_rewards = config.rewards.len(),
        "Configuration loaded"
    );

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(config.store_timeout)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("✅ Database migrations completed");

    let cache = RedisProgressCache::connect(&config.redis_url)
        .await
        .context("Failed to connect to Redis")?;

    let repository: Arc<AppRepository> = Arc::new(ProgressionRepository::new(
        Arc::new(PgProgressStore::new(pool)),
        Arc::new(cache),
        Some(RepositoryConfig {
            store_timeout: config.store_timeout,
        }),
    ));

    // Anything cached by a previous run may disagree with Postgres
    repository.reset_cache().await;

    let membership = MembershipTracker::new();

    let handler = DiscordHandler::new(
        repository.clone(),
        membership.clone(),
        config.discord.clone(),
    );
    let mut client = serenity::Client::builder(&config.discord.token, intents())
        .event_handler(handler)
        .await
        .context("Failed to build Discord client")?;

    let sink = Arc::new(DiscordSink::new(
        DiscordClient::from_http(client.http.clone()),
        config.discord.guild_id,
    ));

    let engine = ProgressionEngine::new(
        repository.clone(),
        membership.clone(),
        sink,
        Some(EngineConfig {
            interval: config.tick_interval,
            rewards: config.rewards.clone(),
            ..Default::default()
        }),
    );
    let _engine = engine.start();

    if let Some(addr) = config.http_bind {
        let router = routes::router(AppState {
            repository,
            membership,
        });
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind status API on {}", addr))?;

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!(error = %e, "Status API stopped");
            }
        });

        tracing::info!("🌐 Status API listening on {}", addr);
    }

    tracing::info!("✅ VC Level ready - connecting to Discord");

    client
        .start()
        .await
        .context("Discord client stopped")?;

    Ok(())
}
