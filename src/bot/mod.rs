//! Bot layer - Discord-specific interface and command handlers
//!
//! This module adapts poise/serenity to the core layer: it builds the command
//! catalogue and registry, gates every interaction through the dispatcher and renders
//! core results as Discord replies.

/// Discord command implementations (general, random, info, form)
pub mod commands;
/// Interaction gating hooks and the framework error handler
pub mod dispatch;
/// Framework construction and the client run loop
pub mod framework;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    core::{access::AccessPolicy, registry::CommandRegistry},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use std::time::Instant;

/// Poise context used by every command.
pub type Context<'a> = poise::Context<'a, BotData, Error>;

/// Shared data available to all bot commands.
/// This structure holds the database connection and the resolved policy and registry.
pub struct BotData {
    /// Database connection pool for all database operations
    pub database: DatabaseConnection,
    /// Owner gate and elevated-role rules
    pub policy: AccessPolicy,
    /// Descriptors of every registered command
    pub registry: CommandRegistry,
    /// When the bot finished starting, for the uptime display
    pub started_at: Instant,
}

impl BotData {
    /// Creates a new `BotData` instance; the uptime clock starts now.
    #[must_use]
    pub fn new(
        database: DatabaseConnection,
        policy: AccessPolicy,
        registry: CommandRegistry,
    ) -> Self {
        Self {
            database,
            policy,
            registry,
            started_at: Instant::now(),
        }
    }
}

/// Discord timestamp markup, rendered in each viewer's local time zone.
#[must_use]
pub fn timestamp_tag(unix_seconds: i64, style: char) -> String {
    format!("<t:{unix_seconds}:{style}>")
}

/// [`timestamp_tag`] for a chrono instant.
#[must_use]
pub fn datetime_tag(at: DateTime<Utc>, style: char) -> String {
    timestamp_tag(at.timestamp(), style)
}

/// Text reply only the invoking user can see.
#[must_use]
pub fn ephemeral_reply(content: impl Into<String>) -> poise::CreateReply {
    poise::CreateReply::default()
        .content(content.into())
        .ephemeral(true)
}

/// Sends a reply only the invoking user can see.
pub async fn say_ephemeral(ctx: Context<'_>, content: impl Into<String>) -> Result<()> {
    ctx.send(ephemeral_reply(content)).await?;
    Ok(())
}

/// Reports a failure after a public `defer()`.
///
/// The deferred placeholder is public and the first reply would only edit it, so it is
/// deleted first and the notice goes out as an ephemeral follow-up.
pub async fn fail_deferred(ctx: Context<'_>, content: impl Into<String>) -> Result<()> {
    if let poise::Context::Application(app) = ctx {
        app.interaction.delete_response(ctx.http()).await?;
    }
    say_ephemeral(ctx, content).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_tags() {
        assert_eq!(timestamp_tag(1_700_000_000, 'F'), "<t:1700000000:F>");
        let at = Utc.with_ymd_and_hms(2026, 10, 20, 23, 59, 0).unwrap();
        assert_eq!(datetime_tag(at, 'R'), format!("<t:{}:R>", at.timestamp()));
    }

    #[test]
    fn test_ephemeral_reply() {
        let reply = ephemeral_reply("Failed to fetch bot statistics.");
        assert_eq!(reply.content.as_deref(), Some("Failed to fetch bot statistics."));
        assert_eq!(reply.ephemeral, Some(true));
        assert!(reply.embeds.is_empty());
    }
}
