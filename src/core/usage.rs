//! Command usage repository - the append-only usage log and its aggregate view.
//!
//! `get_command_stats` is the only aggregation query in the bot. Rows are grouped by
//! command name and ordered by use count descending; equal counts are ordered by
//! command name ascending so the result never depends on store ordering.

use crate::{
    core::{
        guild::{GuildDefaults, get_or_create_guild},
        user::{UserDefaults, get_or_create_user},
    },
    entities::{CommandUsage, command_usage},
    errors::Result,
};
use chrono::Utc;
use sea_orm::{FromQueryResult, QueryOrder, QuerySelect, Set, prelude::*};
use tracing::{debug, instrument};

/// Number of rows shown in the "Top Commands" embed fields.
pub const TOP_COMMANDS_LIMIT: u64 = 5;

/// Aggregated use count for one command name.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct CommandStat {
    /// Top-level command name
    pub command_name: String,
    /// Number of logged invocations
    pub uses: i64,
}

/// Appends one usage event, creating the referenced user and guild rows first.
///
/// The user and guild are created with placeholder defaults when they are not yet
/// known, so the insert can never violate the foreign keys. Callers on the dispatch
/// path wrap this in [`NonFatal`](crate::core::non_fatal::NonFatal).
#[instrument(skip(db))]
pub async fn log_command_usage(
    db: &DatabaseConnection,
    command_name: &str,
    user_id: &str,
    guild_id: Option<&str>,
) -> Result<command_usage::Model> {
    get_or_create_user(db, user_id, &UserDefaults::default()).await?;
    if let Some(guild_id) = guild_id {
        get_or_create_guild(db, guild_id, &GuildDefaults::default()).await?;
    }

    let event = command_usage::ActiveModel {
        command_name: Set(command_name.to_string()),
        user_id: Set(user_id.to_string()),
        guild_id: Set(guild_id.map(str::to_string)),
        used_at: Set(Utc::now()),
        ..Default::default()
    };

    let inserted = event.insert(db).await?;
    debug!(id = inserted.id, "Command usage logged");
    Ok(inserted)
}

/// Returns use counts per command, optionally filtered by guild and user.
///
/// Ordered by count descending, then command name ascending, truncated to `limit`.
pub async fn get_command_stats(
    db: &DatabaseConnection,
    guild_id: Option<&str>,
    user_id: Option<&str>,
    limit: u64,
) -> Result<Vec<CommandStat>> {
    let mut query = CommandUsage::find()
        .select_only()
        .column(command_usage::Column::CommandName)
        .column_as(command_usage::Column::Id.count(), "uses");

    if let Some(guild_id) = guild_id {
        query = query.filter(command_usage::Column::GuildId.eq(guild_id));
    }
    if let Some(user_id) = user_id {
        query = query.filter(command_usage::Column::UserId.eq(user_id));
    }

    query
        .group_by(command_usage::Column::CommandName)
        .order_by_desc(command_usage::Column::Id.count())
        .order_by_asc(command_usage::Column::CommandName)
        .limit(limit)
        .into_model::<CommandStat>()
        .all(db)
        .await
        .map_err(Into::into)
}

/// Total number of commands a user has invoked.
pub async fn count_commands_for_user(db: &DatabaseConnection, user_id: &str) -> Result<u64> {
    CommandUsage::find()
        .filter(command_usage::Column::UserId.eq(user_id))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Formats stats as the "Top Commands" field body, one `/name: N uses` line each.
#[must_use]
pub fn format_top_commands(stats: &[CommandStat]) -> String {
    stats
        .iter()
        .map(|stat| format!("/{}: {} uses", stat.command_name, stat.uses))
        .collect::<Vec<_>>()
        .join("\n")
}
