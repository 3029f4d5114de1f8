//! User repository - get-or-create and identity refresh for Discord users.

use crate::{
    entities::{User, user},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Set, prelude::*, sea_query::OnConflict};
use tracing::instrument;

/// Display fields used when a user row has to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDefaults {
    /// Username stored on creation
    pub username: String,
    /// Discriminator stored on creation
    pub discriminator: String,
}

impl Default for UserDefaults {
    fn default() -> Self {
        Self {
            username: "Unknown".to_string(),
            discriminator: "0000".to_string(),
        }
    }
}

/// Looks up a user by Discord id.
pub async fn get_user(db: &DatabaseConnection, user_id: &str) -> Result<Option<user::Model>> {
    User::find_by_id(user_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the existing user row, creating it from `defaults` when absent.
///
/// Creation is write-once: an existing row is returned unchanged even if `defaults`
/// differ. Concurrent callers racing on the same id both end up with the single row
/// because the insert ignores key conflicts.
#[instrument(skip(db, defaults))]
pub async fn get_or_create_user(
    db: &DatabaseConnection,
    user_id: &str,
    defaults: &UserDefaults,
) -> Result<user::Model> {
    if let Some(existing) = get_user(db, user_id).await? {
        return Ok(existing);
    }

    let now = Utc::now();
    let model = user::ActiveModel {
        id: Set(user_id.to_string()),
        username: Set(defaults.username.clone()),
        discriminator: Set(defaults.discriminator.clone()),
        first_interaction: Set(now),
        last_interaction: Set(now),
    };

    User::insert(model)
        .on_conflict(OnConflict::column(user::Column::Id).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;

    get_user(db, user_id).await?.ok_or_else(|| Error::NotFound {
        what: format!("user {user_id}"),
    })
}

/// Records the latest identity of an interacting user in one atomic statement.
///
/// Inserts the row on first sight; afterwards refreshes username, discriminator and
/// last-seen while keeping the first-seen timestamp.
#[instrument(skip(db))]
pub async fn upsert_user_identity(
    db: &DatabaseConnection,
    user_id: &str,
    username: &str,
    discriminator: &str,
) -> Result<()> {
    let now = Utc::now();
    let model = user::ActiveModel {
        id: Set(user_id.to_string()),
        username: Set(username.to_string()),
        discriminator: Set(discriminator.to_string()),
        first_interaction: Set(now),
        last_interaction: Set(now),
    };

    User::insert(model)
        .on_conflict(
            OnConflict::column(user::Column::Id)
                .update_columns([
                    user::Column::Username,
                    user::Column::Discriminator,
                    user::Column::LastInteraction,
                ])
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
    async fn test_get_or_create_user_creates_with_defaults() -> Result<()> {
        let db = setup_test_db().await?;

        let created = get_or_create_user(&db, "100", &UserDefaults::default()).await?;
        assert_eq!(created.id, "100");
        assert_eq!(created.username, "Unknown");
        assert_eq!(created.discriminator, "0000");
        Ok(())
    }

    #[tokio::test]
    async fn test_get_or_create_user_is_write_once() -> Result<()> {
        let db = setup_test_db().await?;

        let first = get_or_create_user(
            &db,
            "100",
            &UserDefaults {
                username: "alice".to_string(),
                discriminator: "0001".to_string(),
            },
        )
        .await?;
        let second = get_or_create_user(
            &db,
            "100",
            &UserDefaults {
                username: "mallory".to_string(),
                discriminator: "9999".to_string(),
            },
        )
        .await?;

        assert_eq!(first, second);
        assert_eq!(second.username, "alice");
        assert_eq!(User::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_identity_refreshes_name_and_keeps_first_seen() -> Result<()> {
        let db = setup_test_db().await?;

        upsert_user_identity(&db, "200", "old_name", "0000").await?;
        let before = get_user(&db, "200").await?.unwrap();

        upsert_user_identity(&db, "200", "new_name", "1234").await?;
        let after = get_user(&db, "200").await?.unwrap();

        assert_eq!(after.username, "new_name");
        assert_eq!(after.discriminator, "1234");
        assert_eq!(after.first_interaction, before.first_interaction);
        assert!(after.last_interaction >= before.last_interaction);
        assert_eq!(User::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_user_missing() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(get_user(&db, "404").await?.is_none());
        Ok(())
    }
}
