//! Guild repository - get-or-create and name refresh for observed guilds.

use crate::{
    entities::{Guild, guild},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Set, prelude::*, sea_query::OnConflict};
use tracing::instrument;

/// Fields used when a guild row has to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildDefaults {
    /// Server name stored on creation
    pub name: String,
    /// Legacy prefix stored on creation
    pub prefix: String,
}

impl Default for GuildDefaults {
    fn default() -> Self {
        Self {
            name: "Unknown Server".to_string(),
            prefix: "!".to_string(),
        }
    }
}

impl GuildDefaults {
    /// Defaults carrying a known server name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Looks up a guild by Discord id.
pub async fn get_guild(db: &DatabaseConnection, guild_id: &str) -> Result<Option<guild::Model>> {
    Guild::find_by_id(guild_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the existing guild row, creating it from `defaults` when absent.
#[instrument(skip(db, defaults))]
pub async fn get_or_create_guild(
    db: &DatabaseConnection,
    guild_id: &str,
    defaults: &GuildDefaults,
) -> Result<guild::Model> {
    if let Some(existing) = get_guild(db, guild_id).await? {
        return Ok(existing);
    }

    let model = guild::ActiveModel {
        id: Set(guild_id.to_string()),
        name: Set(defaults.name.clone()),
        prefix: Set(defaults.prefix.clone()),
        joined_at: Set(Utc::now()),
    };

    Guild::insert(model)
        .on_conflict(OnConflict::column(guild::Column::Id).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;

    get_guild(db, guild_id).await?.ok_or_else(|| Error::NotFound {
        what: format!("guild {guild_id}"),
    })
}

/// Records a guild seen through the gateway, refreshing its name but not `joined_at`.
#[instrument(skip(db))]
pub async fn upsert_guild(db: &DatabaseConnection, guild_id: &str, name: &str) -> Result<()> {
    let model = guild::ActiveModel {
        id: Set(guild_id.to_string()),
        name: Set(name.to_string()),
        prefix: Set(GuildDefaults::default().prefix),
        joined_at: Set(Utc::now()),
    };

    Guild::insert(model)
        .on_conflict(
            OnConflict::column(guild::Column::Id)
                .update_column(guild::Column::Name)
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_get_or_create_guild_defaults() -> Result<()> {
        let db = setup_test_db().await?;

        let created = get_or_create_guild(&db, "500", &GuildDefaults::default()).await?;
        assert_eq!(created.name, "Unknown Server");
        assert_eq!(created.prefix, "!");
        Ok(())
    }

    #[tokio::test]
    async fn test_get_or_create_guild_is_write_once() -> Result<()> {
        let db = setup_test_db().await?;

        let first = get_or_create_guild(&db, "500", &GuildDefaults::named("Base One")).await?;
        let second = get_or_create_guild(&db, "500", &GuildDefaults::named("Renamed")).await?;

        assert_eq!(first, second);
        assert_eq!(Guild::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_guild_refreshes_name_only() -> Result<()> {
        let db = setup_test_db().await?;

        upsert_guild(&db, "600", "Old Name").await?;
        let before = get_guild(&db, "600").await?.unwrap();

        upsert_guild(&db, "600", "New Name").await?;
        let after = get_guild(&db, "600").await?.unwrap();

        assert_eq!(after.name, "New Name");
        assert_eq!(after.joined_at, before.joined_at);
        assert_eq!(Guild::find().count(&db).await?, 1);
        Ok(())
    }
}
