//! Framework hooks that route every slash command through the core dispatcher.
//!
//! `command_check` admits or refuses the invocation, `pre_command` logs usage for
//! admitted ones, and `on_error` turns handler failures into a single ephemeral reply.
//! Store writes are detached tasks; none of these hooks waits on the database.

use crate::{
    bot::{BotData, Context, say_ephemeral},
    core::{
        access::OWNER_ONLY_MESSAGE,
        dispatch::{
            Admission, GuildIdentity, Invocation, UserIdentity, admit, spawn_identity,
            spawn_usage,
        },
        guild::GuildDefaults,
    },
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use std::num::NonZeroU16;
use tracing::{debug, error, warn};

/// Reply for guild-only commands used in direct messages.
pub const GUILD_ONLY_MESSAGE: &str = "This command can only be used in a server!";

/// Four-digit legacy tag, `"0000"` for accounts migrated to unique usernames.
#[must_use]
pub fn discriminator_tag(discriminator: Option<NonZeroU16>) -> String {
    discriminator.map_or_else(|| "0000".to_string(), |tag| format!("{:04}", tag.get()))
}

/// Identity fields of a platform user.
#[must_use]
pub fn user_identity(user: &serenity::User) -> UserIdentity {
    UserIdentity {
        id: user.id.to_string(),
        username: user.name.clone(),
        discriminator: discriminator_tag(user.discriminator),
    }
}

/// Captures the identity and command fields the core dispatcher needs.
#[must_use]
pub fn invocation_from(ctx: Context<'_>) -> Invocation {
    let root = ctx
        .parent_commands()
        .first()
        .copied()
        .unwrap_or_else(|| ctx.command());

    let guild = ctx.guild_id().map(|guild_id| GuildIdentity {
        id: guild_id.to_string(),
        name: ctx
            .guild()
            .map_or_else(|| GuildDefaults::default().name, |guild| guild.name.clone()),
    });

    Invocation {
        command_name: root.name.clone(),
        user: user_identity(ctx.author()),
        guild,
    }
}

/// Global check run before every command.
///
/// poise calls it once per parent command and once for the leaf with the same
/// context, so it writes nothing on success. A refusal stops the chain on its first
/// call, which makes it the single place to record a refused caller.
pub async fn command_check(ctx: Context<'_>) -> Result<bool> {
    let data = ctx.data();
    let invocation = invocation_from(ctx);

    match admit(&data.registry, &data.policy, &invocation) {
        Admission::Admitted => Ok(true),
        Admission::UnknownCommand => {
            drop(spawn_identity(data.database.clone(), invocation.user));
            Ok(false)
        }
        Admission::OwnerOnly => {
            drop(spawn_identity(data.database.clone(), invocation.user));
            say_ephemeral(ctx, OWNER_ONLY_MESSAGE).await?;
            Ok(false)
        }
    }
}

/// Records identity and usage once the invocation passed every check.
///
/// Runs in the background so a slow store never delays the handler's acknowledgement.
pub async fn pre_command(ctx: Context<'_>) {
    let invocation = invocation_from(ctx);
    debug!(
        command = %invocation.command_name,
        user_id = %invocation.user.id,
        "Dispatching command"
    );
    drop(spawn_usage(ctx.data().database.clone(), invocation));
}

/// Framework error handler.
pub async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!(error = %error, "Failed to start bot");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!(
                command = %ctx.command().qualified_name,
                error = %error,
                "Error executing command"
            );
            let reply = error.user_message().to_string();
            if let Err(e) = say_ephemeral(ctx, reply).await {
                error!(error = %e, "Failed to send error reply");
            }
        }
        poise::FrameworkError::CommandCheckFailed { error: None, .. } => {}
        poise::FrameworkError::GuildOnly { ctx, .. } => {
            drop(spawn_identity(
                ctx.data().database.clone(),
                user_identity(ctx.author()),
            ));
            if let Err(e) = say_ephemeral(ctx, GUILD_ONLY_MESSAGE).await {
                error!(error = %e, "Failed to send guild-only reply");
            }
        }
        poise::FrameworkError::UnknownInteraction {
            interaction,
            framework,
            ..
        } => {
            drop(spawn_identity(
                framework.user_data.database.clone(),
                user_identity(&interaction.user),
            ));
            warn!(
                command = %interaction.data.name,
                "No command matching this interaction"
            );
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!(error = %e, "Error while handling error");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discriminator_tag() {
        assert_eq!(discriminator_tag(None), "0000");
        assert_eq!(discriminator_tag(NonZeroU16::new(7)), "0007");
        assert_eq!(discriminator_tag(NonZeroU16::new(1234)), "1234");
    }

    #[test]
    fn test_user_identity() {
        let mut user = serenity::User::default();
        user.id = serenity::UserId::new(42);
        user.name = "sock".to_string();

        let identity = user_identity(&user);
        assert_eq!(identity.id, "42");
        assert_eq!(identity.username, "sock");
        assert_eq!(identity.discriminator, "0000");
    }
}
