//! Gateway event handling
//!
//! Feeds voice-state updates into the membership tracker and answers the
//! level command from the progression repository.

use async_trait::async_trait;
use serenity::client::{Context, EventHandler};
use serenity::model::channel::Message;
use serenity::model::gateway::{GatewayIntents, Ready};
use serenity::model::id::GuildId;
use serenity::model::voice::VoiceState;
use std::sync::Arc;
use tracing::{debug, warn};
use vclevel::{
    DurableStore, FastStore, MembershipTracker, PresenceChange, ProgressionRepository, VoiceFlags,
    VoiceSnapshot,
};

use crate::command::{level_reply, parse_command, Command};
use crate::config::DiscordConfig;

/// Intents needed by [`DiscordHandler`]
pub fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_VOICE_STATES
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
}

/// Convert serenity VoiceState to the domain snapshot
fn voice_snapshot(state: &VoiceState) -> VoiceSnapshot {
    VoiceSnapshot {
        channel: state.channel_id.map(|c| c.get()),
        flags: VoiceFlags {
            deaf: state.deaf,
            mute: state.mute,
            self_mute: state.self_mute,
            self_deaf: state.self_deaf,
        },
    }
}

/// Whether an event belongs to the configured guild
fn in_guild(guild_id: Option<GuildId>, configured: u64) -> bool {
    guild_id.is_some_and(|g| g.get() == configured)
}

/// Serenity event handler for presence and commands
pub struct DiscordHandler<D: DurableStore, F: FastStore> {
    repository: Arc<ProgressionRepository<D, F>>,
    membership: MembershipTracker,
    config: DiscordConfig,
}

impl<D: DurableStore, F: FastStore> DiscordHandler<D, F> {
    pub fn new(
        repository: Arc<ProgressionRepository<D, F>>,
        membership: MembershipTracker,
        config: DiscordConfig,
    ) -> Self {
        Self {
            repository,
            membership,
            config,
        }
    }
}

#[async_trait]
impl<D, F> EventHandler for DiscordHandler<D, F>
where
    D: DurableStore + 'static,
    F: FastStore + 'static,
{
    async fn ready(&self, _ctx: Context, ready: Ready) {
        tracing::info!("🤖 Discord gateway ready as {}", ready.user.name);
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let Some(command) = parse_command(&self.config.prefix, &msg.content) else {
            return;
        };

        match command {
            Command::Level => {
                let record = self.repository.get_record(&msg.author.id.to_string()).await;
                debug!(user_id = %record.id, level = record.level, exp = record.exp, "Level command");

                if let Err(e) = msg.reply(&ctx, level_reply(&record)).await {
                    warn!(error = %e, channel_id = %msg.channel_id, "Failed to reply to level command");
                }
            }
        }
    }

    async fn voice_state_update(&self, _ctx: Context, old: Option<VoiceState>, new: VoiceState) {
        if !in_guild(new.guild_id, self.config.guild_id) {
            return;
        }

        let before = old.as_ref().map(voice_snapshot);
        let change = PresenceChange::classify(before.as_ref(), &voice_snapshot(&new));

        debug!(user_id = %new.user_id, change = ?change, "Voice state update");
        self.membership.apply(&new.user_id.to_string(), change);
    }
}
