//! Bot layer - Discord-specific interface.
//!
//! Builds the poise framework, registers the `pin` context-menu command and
//! turns per-interaction failures into a generic reply so one bad interaction
//! never takes the process down.

/// Discord command implementations
pub mod commands;

use crate::cloudflare::CloudflareApi;
use crate::config::AppConfig;
use crate::errors::{Error, Result};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Reply sent when a command fails; details go to the log only.
pub const GENERIC_FAILURE_REPLY: &str = "Failed to pin the message.";

/// Shared data available to all bot commands.
///
/// Everything in here is fixed at startup and only read afterwards.
pub struct BotData {
    /// Validated application configuration
    pub config: Arc<AppConfig>,
    /// Cloudflare API client
    pub api: Arc<dyn CloudflareApi>,
    /// Identifier of the provisioned D1 database
    pub database_id: String,
}

impl BotData {
    /// Creates the shared data from startup results.
    #[must_use]
    pub fn new(config: Arc<AppConfig>, api: Arc<dyn CloudflareApi>, database_id: String) -> Self {
        Self {
            config,
            api,
            database_id,
        }
    }
}

/// Poise context used by every command.
pub type Context<'a> = poise::Context<'a, BotData, Error>;

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup {
            error, framework, ..
        } => {
            error!("Failed to start bot: {}", error);
            framework.shard_manager().shutdown_all().await;
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {}", ctx.command().name, error);
            if let Err(e) = ctx.say(GENERIC_FAILURE_REPLY).await {
                error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Connects to Discord and runs until the gateway closes or Ctrl-C is pressed.
#[instrument(skip(data))]
pub async fn run_bot(data: BotData) -> Result<()> {
    let token = data.config.discord.token.clone();
    let guild_id = data.config.discord.guild_id;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![commands::pin()],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                let commands = &framework.options().commands;
                if let Some(guild_id) = guild_id {
                    poise::builtins::register_in_guild(ctx, commands, guild_id).await?;
                    info!("Registered commands in guild {}", guild_id);
                } else {
                    poise::builtins::register_globally(ctx, commands).await?;
                    info!("Registered commands globally");
                }
                Ok(data)
            })
        })
        .build();

    // Context-menu interactions carry the target message, so no privileged intents.
    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {}", e))?;

    let shard_manager = Arc::clone(&client.shard_manager);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl-C, shutting down");
                shard_manager.shutdown_all().await;
            }
            Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {}", e))?;
    Ok(())
}
