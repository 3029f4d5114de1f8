//! Shared test utilities for the bot.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test records with sensible defaults.

use crate::{
    core::{form::NewFormLink, usage},
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Builds a form link input with sensible defaults.
///
/// # Defaults
/// * `title`: "Weekly Form"
/// * `description`: "Please fill out this form by the deadline."
/// * `created_by`: `"test_user"`
pub fn test_form_link(guild_id: &str, form_url: &str, expires_at: DateTime<Utc>) -> NewFormLink {
    NewFormLink {
        guild_id: guild_id.to_string(),
        form_url: form_url.to_string(),
        expires_at,
        title: crate::core::form::DEFAULT_TITLE.to_string(),
        description: crate::core::form::DEFAULT_DESCRIPTION.to_string(),
        created_by: "test_user".to_string(),
    }
}

/// Logs `times` usage events for one command.
pub async fn log_usage_times(
    db: &DatabaseConnection,
    command_name: &str,
    user_id: &str,
    guild_id: Option<&str>,
    times: usize,
) -> Result<()> {
    for _ in 0..times {
        usage::log_command_usage(db, command_name, user_id, guild_id).await?;
    }
    Ok(())
}
