//! Discord Integration for VC Level
//!
//! Presence events and the level command come in through the gateway
//! handler; level-up notifications and role grants go out through the sink.
//!
//! # Usage
//!
//! ```rust,ignore
//! use vclevel_integration_discord::{intents, DiscordConfig, DiscordHandler, DiscordSink};
//!
//! let handler = DiscordHandler::new(repository, membership, config.clone());
//! let client = serenity::Client::builder(&config.token, intents())
//!     .event_handler(handler)
//!     .await?;
//! let sink = DiscordSink::new(DiscordClient::from_http(client.http.clone()), config.guild_id);
//! ```

mod client;
mod command;
mod config;
mod handler;
mod sink;

pub use client::DiscordClient;
pub use command::{level_reply, parse_command, Command};
pub use config::DiscordConfig;
pub use handler::{intents, DiscordHandler};
pub use sink::DiscordSink;
