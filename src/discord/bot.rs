//! Discord gateway event handler.

use std::sync::Arc;

use serenity::async_trait;
use serenity::model::application::{Command, Interaction};
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::id::{ChannelId, GuildId};
use serenity::prelude::*;
use tracing::{error, info};

use crate::discord::{commands, router};
use crate::engine::Substituter;
use crate::store::WatchStore;

/// Event handler wiring the gateway to the watch store and the engine.
pub struct Bot {
    store: Arc<WatchStore>,
    engine: Substituter,
}

impl Bot {
    pub fn new(store: Arc<WatchStore>, engine: Substituter) -> Self {
        Self { store, engine }
    }
}

#[async_trait]
impl EventHandler for Bot {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Discord bot connected as {}", ready.user.name);

        // Registration failure is logged in full but never aborts startup;
        // message routing works without the commands.
        match Command::set_global_commands(&ctx.http, commands::definitions()).await {
            Ok(registered) => info!("Registered {} slash commands", registered.len()),
            Err(e) => error!("Error registering slash commands: {:?}", e),
        }

        // Seed the watch store. Destinations pointing at channels that no
        // longer exist fall back to replying in place; guilds missing from
        // the cache at this point are given the benefit of the doubt.
        let cache = ctx.cache.clone();
        let resolve = move |community: GuildId, channel: ChannelId| {
            cache
                .guild(community)
                .map(|guild| guild.channels.contains_key(&channel))
                .unwrap_or(true)
        };
        match self.store.load(resolve).await {
            Ok(count) => info!("Loaded {} watch entries", count),
            Err(e) => error!("Failed to load watch entries: {}", e),
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        // Never route our own output, even if someone registers the bot.
        if msg.author.id == ctx.cache.current_user().id {
            return;
        }
        router::route(&self.store, &self.engine, &ctx, &msg).await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            let result = match command.data.name.as_str() {
                commands::REGISTER => commands::handle_register(&self.store, &ctx, &command).await,
                commands::CLEAR => commands::handle_clear(&self.store, &ctx, &command).await,
                _ => Ok(()),
            };
            if let Err(e) = result {
                error!("Command '{}' failed: {}", command.data.name, e);
            }
        }
    }
}
