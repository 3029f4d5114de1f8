//! Information commands - `/server`, `/user` and `/stats`.
//!
//! Each command merges live platform data (cache and member lookups) with the rows the
//! bot keeps about guilds, users and command usage. Embed construction is kept in plain
//! functions so the layout can be tested without a gateway connection.

use crate::{
    bot::{datetime_tag, timestamp_tag},
    core::usage::{CommandStat, format_top_commands},
    entities::{guild, user},
};
use poise::serenity_prelude as serenity;
use std::time::Duration;

use super::general::INFO_COLOR;

/// Reply when the server lookup fails.
pub const SERVER_INFO_FAILED_MESSAGE: &str =
    "Failed to fetch server information. Please try again later.";
/// Reply when the user lookup fails.
pub const USER_INFO_FAILED_MESSAGE: &str =
    "Failed to fetch user information. Please try again later.";
/// Reply when the statistics lookup fails.
pub const STATS_FAILED_MESSAGE: &str = "Failed to fetch bot statistics. Please try again later.";

/// Uptime as `{d}d {h}h {m}m {s}s`.
#[must_use]
pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;
    format!("{days}d {hours}h {minutes}m {seconds}s")
}

/// "Top Commands" field body, with a placeholder when nothing was logged yet.
#[must_use]
pub fn top_commands_field(stats: &[CommandStat]) -> String {
    if stats.is_empty() {
        "No commands used yet".to_string()
    } else {
        format_top_commands(stats)
    }
}

/// Live guild fields copied out of the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildSnapshot {
    /// Guild id
    pub id: serenity::GuildId,
    /// Server name
    pub name: String,
    /// Owner's user id
    pub owner_id: serenity::UserId,
    /// Approximate member count
    pub member_count: u64,
    /// Number of channels
    pub channel_count: usize,
    /// Number of roles
    pub role_count: usize,
}

impl GuildSnapshot {
    /// Copies the fields out so no cache guard is held across an await.
    #[must_use]
    pub fn from_guild(guild: &serenity::Guild) -> Self {
        Self {
            id: guild.id,
            name: guild.name.clone(),
            owner_id: guild.owner_id,
            member_count: guild.member_count,
            channel_count: guild.channels.len(),
            role_count: guild.roles.len(),
        }
    }
}

/// Embed for `/server`.
#[must_use]
pub fn server_embed(
    snapshot: &GuildSnapshot,
    record: Option<&guild::Model>,
    stats: &[CommandStat],
) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::default()
        .title(format!("Server Information: {}", snapshot.name))
        .color(INFO_COLOR)
        .field("Server ID", snapshot.id.to_string(), true)
        .field("Owner", format!("<@{}>", snapshot.owner_id), true)
        .field(
            "Created",
            timestamp_tag(snapshot.id.created_at().unix_timestamp(), 'R'),
            true,
        )
        .field("Members", snapshot.member_count.to_string(), true)
        .field("Channels", snapshot.channel_count.to_string(), true)
        .field("Roles", snapshot.role_count.to_string(), true);

    if let Some(record) = record {
        embed = embed.field("Bot Joined", datetime_tag(record.joined_at, 'R'), true);
    }

    embed.field("Top Commands", top_commands_field(stats), false)
}

/// Member-only fields for `/user`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSnapshot {
    /// When the member joined the server, as a unix timestamp
    pub joined_at: Option<i64>,
    /// Role ids held by the member
    pub roles: Vec<serenity::RoleId>,
}

/// Embed for `/user`.
#[must_use]
pub fn user_embed(
    target: &serenity::User,
    member: Option<&MemberSnapshot>,
    record: Option<(&user::Model, u64)>,
) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::default()
        .title(format!("User Information: {}", target.name))
        .thumbnail(target.face())
        .color(INFO_COLOR)
        .field("Username", target.name.clone(), true)
        .field("User ID", target.id.to_string(), true)
        .field(
            "Account Created",
            timestamp_tag(target.id.created_at().unix_timestamp(), 'R'),
            true,
        );

    if let Some(member) = member {
        if let Some(joined_at) = member.joined_at {
            embed = embed.field("Joined Server", timestamp_tag(joined_at, 'R'), true);
        }
        let roles = if member.roles.is_empty() {
            "None".to_string()
        } else {
            member
                .roles
                .iter()
                .map(|role| format!("<@&{role}>"))
                .collect::<Vec<_>>()
                .join(", ")
        };
        embed = embed.field("Roles", roles, false);
    }

    match record {
        Some((row, total)) => embed
            .field(
                "First Interaction",
                datetime_tag(row.first_interaction, 'R'),
                true,
            )
            .field(
                "Last Interaction",
                datetime_tag(row.last_interaction, 'R'),
                true,
            )
            .field("Commands Used", total.to_string(), true),
        None => embed.field(
            "Bot Data",
            "No database records found for this user",
            false,
        ),
    }
}

/// Live process counters for `/stats`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotCounters {
    /// Time since startup
    pub uptime: Duration,
    /// Guilds in the cache
    pub guilds: usize,
    /// Users in the cache
    pub users: usize,
}

/// Embed for `/stats`.
#[must_use]
pub fn stats_embed(counters: &BotCounters, stats: &[CommandStat]) -> serenity::CreateEmbed {
    serenity::CreateEmbed::default()
        .title("Bot Statistics")
        .color(INFO_COLOR)
        .field("Uptime", format_uptime(counters.uptime), true)
        .field("Servers", counters.guilds.to_string(), true)
        .field("Users", counters.users.to_string(), true)
        .field("Version", env!("CARGO_PKG_VERSION"), true)
        .field("Platform", std::env::consts::OS, true)
        .field("Top Commands", top_commands_field(stats), false)
}

mod inner {
    #![allow(missing_docs)]

    use super::{
        BotCounters, GuildSnapshot, MemberSnapshot, SERVER_INFO_FAILED_MESSAGE,
        STATS_FAILED_MESSAGE, USER_INFO_FAILED_MESSAGE, server_embed, stats_embed, user_embed,
    };
    use crate::{
        bot::{BotData, fail_deferred},
        core::{
            guild::get_guild,
            non_fatal::NonFatal,
            usage::{TOP_COMMANDS_LIMIT, count_commands_for_user, get_command_stats},
            user::get_user,
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use tracing::error;

    /// Display information about the server
    #[poise::command(slash_command, guild_only, rename = "server")]
    pub async fn server_info(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.defer().await?;

        let Some(snapshot) = ctx.guild().map(|guild| GuildSnapshot::from_guild(&guild)) else {
            return fail_deferred(ctx, SERVER_INFO_FAILED_MESSAGE).await;
        };

        let db = &ctx.data().database;
        let guild_id = snapshot.id.to_string();
        let lookup = async {
            let record = get_guild(db, &guild_id).await?;
            let stats = get_command_stats(db, Some(&guild_id), None, TOP_COMMANDS_LIMIT).await?;
            Ok::<_, Error>((record, stats))
        }
        .await;

        match lookup {
            Ok((record, stats)) => {
                let embed = server_embed(&snapshot, record.as_ref(), &stats);
                ctx.send(poise::CreateReply::default().embed(embed)).await?;
            }
            Err(err) => {
                error!(guild_id = %guild_id, error = %err, "Server info lookup failed");
                fail_deferred(ctx, SERVER_INFO_FAILED_MESSAGE).await?;
            }
        }
        Ok(())
    }

    /// Display information about a user
    #[poise::command(slash_command, rename = "user")]
    pub async fn user_info(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "The user to get info about (defaults to you)"] target: Option<
            serenity::User,
        >,
    ) -> Result<()> {
        ctx.defer().await?;
        let target = target.unwrap_or_else(|| ctx.author().clone());

        let member = match ctx.guild_id() {
            Some(guild_id) => guild_id
                .member(ctx, target.id)
                .await
                .map_err(Error::from)
                .non_fatal("fetch member")
                .map(|member| MemberSnapshot {
                    joined_at: member.joined_at.map(|at| at.unix_timestamp()),
                    roles: member.roles,
                }),
            None => None,
        };

        let db = &ctx.data().database;
        let user_id = target.id.to_string();
        let lookup = async {
            match get_user(db, &user_id).await? {
                Some(row) => {
                    let total = count_commands_for_user(db, &user_id).await?;
                    Ok::<_, Error>(Some((row, total)))
                }
                None => Ok(None),
            }
        }
        .await;

        match lookup {
            Ok(record) => {
                let embed = user_embed(
                    &target,
                    member.as_ref(),
                    record.as_ref().map(|(row, total)| (row, *total)),
                );
                ctx.send(poise::CreateReply::default().embed(embed)).await?;
            }
            Err(err) => {
                error!(user_id = %user_id, error = %err, "User info lookup failed");
                fail_deferred(ctx, USER_INFO_FAILED_MESSAGE).await?;
            }
        }
        Ok(())
    }

    /// Display bot statistics
    #[poise::command(slash_command)]
    pub async fn stats(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.defer().await?;

        let cache = &ctx.serenity_context().cache;
        let counters = BotCounters {
            uptime: ctx.data().started_at.elapsed(),
            guilds: cache.guild_count(),
            users: cache.user_count(),
        };

        match get_command_stats(&ctx.data().database, None, None, TOP_COMMANDS_LIMIT).await {
            Ok(stats) => {
                let embed = stats_embed(&counters, &stats);
                ctx.send(poise::CreateReply::default().embed(embed)).await?;
            }
            Err(err) => {
                error!(error = %err, "Bot statistics lookup failed");
                fail_deferred(ctx, STATS_FAILED_MESSAGE).await?;
            }
        }
        Ok(())
    }
}

pub use inner::*;
