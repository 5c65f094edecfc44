//! Discord Gateway integration.
//!
//! Connects to Discord as a bot, registers the slash commands on Ready, and
//! dispatches each command interaction to its handler. Token is resolved by
//! the config module (env, then .config.env) and never logged.

pub mod commands;

use crate::config::Config;
use crate::ollama::OllamaClient;
use anyhow::{Context as _, Result};
use serenity::client::{Client, Context, EventHandler};
use serenity::gateway::ShardManager;
use serenity::model::application::{Command, Interaction};
use serenity::model::gateway::{GatewayIntents, Ready};
use std::sync::{Arc, OnceLock};
use tracing::{error, info, warn};

/// Shared shard manager for graceful disconnect on ctrl-c (bot appears offline).
static SHARD_MANAGER: OnceLock<Arc<ShardManager>> = OnceLock::new();

struct Handler {
    config: Arc<Config>,
    ollama: OllamaClient,
}

#[serenity::async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, data_about_bot: Ready) {
        info!(
            "Discord: Bot connected as {} (id: {})",
            data_about_bot.user.name, data_about_bot.user.id
        );

        match Command::set_global_commands(&ctx.http, commands::registered_commands()).await {
            Ok(registered) => info!("Discord: Registered {} slash commands", registered.len()),
            Err(e) => error!("Discord: Slash command registration failed: {}", e),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            info!(
                "Discord: /{} from {} (channel {})",
                command.data.name, command.user.name, command.channel_id
            );
            commands::dispatch(&ctx, &command, &self.config, &self.ollama).await;
        }
    }
}

/// Run the Discord client until the gateway stops or ctrl-c arrives.
/// Token must be non-empty.
pub async fn run_discord_client(
    token: String,
    config: Arc<Config>,
    ollama: OllamaClient,
) -> Result<()> {
    if token.trim().is_empty() {
        anyhow::bail!("Discord token is empty");
    }

    info!("Discord: Connecting to Discord Gateway (discord.com)…");

    // Slash commands arrive as interactions; no message-content intents needed.
    let intents = GatewayIntents::GUILDS;

    let mut client = Client::builder(&token, intents)
        .event_handler(Handler { config, ollama })
        .await
        .context("Discord client build failed")?;

    let _ = SHARD_MANAGER.set(client.shard_manager.clone());

    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            disconnect();
        } else {
            warn!("Discord: ctrl-c listener failed, no graceful shutdown");
        }
    });

    info!("Discord: Gateway client built, starting connection…");
    client.start().await.context("Discord gateway error")?;
    Ok(())
}

/// Shut down the gateway so the bot appears offline. Safe to call even if the
/// gateway never started.
fn disconnect() {
    let Some(manager) = SHARD_MANAGER.get() else {
        return;
    };
    info!("Discord: Logging off (shutting down gateway)…");
    let manager = manager.clone();
    tokio::spawn(async move {
        manager.shutdown_all().await;
        info!("Discord: Gateway shut down (bot offline)");
    });
}
