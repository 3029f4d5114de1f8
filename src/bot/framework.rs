//! Client construction and the run loop.

use crate::{
    bot::{BotData, commands, dispatch},
    config::AppConfig,
    core::{access::AccessPolicy, guild::upsert_guild, non_fatal::NonFatal},
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Presence text shown under the bot's name.
const ACTIVITY: &str = "with slash commands";

/// Gateway events the bot reacts to outside of commands.
async fn event_handler(
    _ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, BotData, Error>,
    data: &BotData,
) -> Result<()> {
    if let serenity::FullEvent::GuildCreate { guild, .. } = event {
        if upsert_guild(&data.database, &guild.id.to_string(), &guild.name)
            .await
            .non_fatal("record guild")
            .is_some()
        {
            debug!(guild_id = %guild.id, name = %guild.name, "Guild recorded");
        }
    }
    Ok(())
}

/// Registers commands globally or in the development guild.
async fn register_commands(
    ctx: &serenity::Context,
    commands: &[commands::Command],
    config: &AppConfig,
) -> Result<()> {
    match config.discord.dev_guild_id {
        Some(guild_id) if !config.discord.register_commands_globally => {
            let guild_id = serenity::GuildId::new(guild_id);
            poise::builtins::register_in_guild(ctx, commands, guild_id).await?;
            info!(guild_id = %guild_id, count = commands.len(), "Registered commands in guild");
        }
        _ => {
            poise::builtins::register_globally(ctx, commands).await?;
            info!(count = commands.len(), "Registered commands globally");
        }
    }
    Ok(())
}

/// Builds the framework and runs the client until shutdown.
///
/// Ctrl-C stops every shard; the caller then closes the database.
#[instrument(skip(token, config, database))]
pub async fn run_bot(
    token: String,
    config: Arc<AppConfig>,
    database: DatabaseConnection,
) -> Result<()> {
    let (commands, registry) = commands::build(commands::catalog())?;
    let policy = AccessPolicy::from(&config.access);
    info!(count = registry.len(), "Command registry built");

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands,
            command_check: Some(|ctx| Box::pin(dispatch::command_check(ctx))),
            pre_command: |ctx| Box::pin(dispatch::pre_command(ctx)),
            on_error: |error| Box::pin(dispatch::on_error(error)),
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!(
                    bot = %ready.user.name,
                    guilds = ready.guilds.len(),
                    "Logged in"
                );
                ctx.set_activity(Some(serenity::ActivityData::playing(ACTIVITY)));
                register_commands(ctx, &framework.options().commands, &config).await?;
                Ok(BotData::new(database, policy, registry))
            })
        })
        .build();

    let intents = serenity::GatewayIntents::GUILDS | serenity::GatewayIntents::GUILD_MESSAGES;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;

    let shard_manager = Arc::clone(&client.shard_manager);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
            return;
        }
        info!("Shutdown signal received, stopping shards");
        shard_manager.shutdown_all().await;
    });

    info!("Starting bot client...");
    client.start().await?;
    info!("Bot client stopped");
    Ok(())
}
