//! Interaction admission and usage bookkeeping.
//!
//! Admission is decided without touching the store: [`admit`] confirms the command is
//! registered and applies the owner gate. Identity upserts and usage logging run as
//! spawned background tasks ([`spawn_identity`], [`spawn_usage`]) so the handler can
//! acknowledge the interaction immediately. Each task is additionally capped at
//! [`BOOKKEEPING_TIMEOUT`], and every failure goes through [`NonFatal`].

use crate::{
    core::{
        access::AccessPolicy,
        guild::{GuildDefaults, get_or_create_guild},
        non_fatal::NonFatal,
        registry::CommandRegistry,
        usage::log_command_usage,
        user::upsert_user_identity,
    },
    entities::command_usage,
};
use sea_orm::DatabaseConnection;
use std::{future::Future, time::Duration};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Upper bound for one bookkeeping task, well below the pool's acquire timeout.
pub const BOOKKEEPING_TIMEOUT: Duration = Duration::from_secs(2);

/// Identity fields of the invoking user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    /// Discord user id
    pub id: String,
    /// Current username
    pub username: String,
    /// Legacy tag, `"0000"` when absent
    pub discriminator: String,
}

/// Guild the command was invoked in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildIdentity {
    /// Discord guild id
    pub id: String,
    /// Current server name
    pub name: String,
}

/// A single inbound command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Top-level command name
    pub command_name: String,
    /// Invoking user
    pub user: UserIdentity,
    /// Guild context, `None` in direct messages
    pub guild: Option<GuildIdentity>,
}

/// Outcome of [`admit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Proceed to usage logging and the handler
    Admitted,
    /// The name is not registered; nothing is sent to the user
    UnknownCommand,
    /// The owner gate refused the caller; reply with the fixed refusal
    OwnerOnly,
}

/// Resolves the command and applies the owner gate, in that order.
#[must_use]
pub fn admit(registry: &CommandRegistry, policy: &AccessPolicy, invocation: &Invocation) -> Admission {
    if !registry.contains(&invocation.command_name) {
        warn!(
            command = %invocation.command_name,
            "No registered command matches this invocation"
        );
        return Admission::UnknownCommand;
    }

    if !policy.admits_invoker(&invocation.user.id) {
        info!(
            command = %invocation.command_name,
            user_id = %invocation.user.id,
            "Owner gate refused invocation"
        );
        return Admission::OwnerOnly;
    }

    Admission::Admitted
}

async fn bounded<T, F>(activity: &'static str, work: F) -> Option<T>
where
    F: Future<Output = Option<T>>,
{
    if let Ok(outcome) = tokio::time::timeout(BOOKKEEPING_TIMEOUT, work).await {
        outcome
    } else {
        warn!(
            activity,
            timeout_ms = BOOKKEEPING_TIMEOUT.as_millis(),
            "Bookkeeping timed out"
        );
        None
    }
}

/// Records the caller's latest identity. Returns whether the write succeeded.
pub async fn record_identity(db: &DatabaseConnection, user: &UserIdentity) -> bool {
    bounded("record user identity", async {
        upsert_user_identity(db, &user.id, &user.username, &user.discriminator)
            .await
            .non_fatal("record user identity")
    })
    .await
    .is_some()
}

/// Records the caller's identity, then appends the usage event for an admitted
/// invocation.
///
/// Known guild names are recorded before logging so the usage row's guild carries a
/// real name rather than the placeholder.
pub async fn record_usage(
    db: &DatabaseConnection,
    invocation: &Invocation,
) -> Option<command_usage::Model> {
    bounded("log command usage", async {
        let user = &invocation.user;
        upsert_user_identity(db, &user.id, &user.username, &user.discriminator)
            .await
            .non_fatal("record user identity");

        if let Some(guild) = &invocation.guild {
            get_or_create_guild(db, &guild.id, &GuildDefaults::named(guild.name.clone()))
                .await
                .non_fatal("record guild");
        }

        log_command_usage(
            db,
            &invocation.command_name,
            &user.id,
            invocation.guild.as_ref().map(|g| g.id.as_str()),
        )
        .await
        .non_fatal("log command usage")
    })
    .await
}

/// Runs [`record_identity`] in the background.
pub fn spawn_identity(db: DatabaseConnection, user: UserIdentity) -> JoinHandle<bool> {
    tokio::spawn(async move { record_identity(&db, &user).await })
}

/// Runs [`record_usage`] in the background.
pub fn spawn_usage(
    db: DatabaseConnection,
    invocation: Invocation,
) -> JoinHandle<Option<command_usage::Model>> {
    tokio::spawn(async move { record_usage(&db, &invocation).await })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        config::database::create_tables,
        core::{
            guild::get_guild,
            registry::{CommandCategory, CommandDescriptor},
            user::get_user,
        },
        entities::CommandUsage,
        errors::Result,
        test_utils::*,
    };
    use sea_orm::{ConnectOptions, Database, EntityTrait, PaginatorTrait, TransactionTrait};
    use std::time::Instant;

    fn registry() -> CommandRegistry {
        CommandRegistry::build([CommandDescriptor {
            name: "ping".to_string(),
            description: "Replies with Pong".to_string(),
            category: CommandCategory::Utility,
            options: Vec::new(),
            subcommands: Vec::new(),
        }])
        .unwrap()
    }

    fn invocation(command: &str, user_id: &str, guild: Option<(&str, &str)>) -> Invocation {
        Invocation {
            command_name: command.to_string(),
            user: UserIdentity {
                id: user_id.to_string(),
                username: format!("user{user_id}"),
                discriminator: "0000".to_string(),
            },
            guild: guild.map(|(id, name)| GuildIdentity {
                id: id.to_string(),
                name: name.to_string(),
            }),
        }
    }

    #[test]
    fn test_admit_known_command() {
        let outcome = admit(&registry(), &AccessPolicy::default(), &invocation("ping", "1", None));
        assert_eq!(outcome, Admission::Admitted);
    }

    #[test]
    fn test_admit_unknown_command() {
        let outcome = admit(&registry(), &AccessPolicy::default(), &invocation("nope", "1", None));
        assert_eq!(outcome, Admission::UnknownCommand);
    }

    #[test]
    fn test_owner_gate_refuses_others() {
        let policy = AccessPolicy::new(true, Some("owner".to_string()), &[]);
        assert_eq!(
            admit(&registry(), &policy, &invocation("ping", "1", None)),
            Admission::OwnerOnly
        );
        assert_eq!(
            admit(&registry(), &policy, &invocation("ping", "owner", None)),
            Admission::Admitted
        );
    }

    #[tokio::test]
    async fn test_record_identity() -> Result<()> {
        let db = setup_test_db().await?;
        let call = invocation("ping", "1", None);

        assert!(record_identity(&db, &call.user).await);
        assert_eq!(get_user(&db, "1").await?.unwrap().username, "user1");
        assert_eq!(CommandUsage::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_record_usage_creates_user_and_guild_with_real_names() -> Result<()> {
        let db = setup_test_db().await?;
        let event = record_usage(&db, &invocation("ping", "1", Some(("g1", "Base One"))))
            .await
            .unwrap();

        assert_eq!(event.guild_id.as_deref(), Some("g1"));
        assert_eq!(get_guild(&db, "g1").await?.unwrap().name, "Base One");
        assert_eq!(get_user(&db, "1").await?.unwrap().username, "user1");
        Ok(())
    }

    #[tokio::test]
    async fn test_spawned_usage_is_logged_once() -> Result<()> {
        let db = setup_test_db().await?;
        let event = spawn_usage(db.clone(), invocation("ping", "1", None))
            .await
            .unwrap();

        assert!(event.is_some());
        assert_eq!(CommandUsage::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_tables_do_not_fail_bookkeeping() -> Result<()> {
        // Connected but without tables: every bookkeeping write fails.
        let db = Database::connect("sqlite::memory:").await?;
        let call = invocation("ping", "1", Some(("g1", "Base One")));

        assert!(!record_identity(&db, &call.user).await);
        assert!(record_usage(&db, &call).await.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_exhausted_pool_returns_within_timeout() -> Result<()> {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options
            .max_connections(1)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(30));
        let db = Database::connect(options).await?;
        create_tables(&db).await?;

        // The only pooled connection stays checked out for the whole test.
        let held = db.begin().await?;
        let call = invocation("ping", "1", Some(("g1", "Base One")));

        let started = Instant::now();
        assert_eq!(
            admit(&registry(), &AccessPolicy::default(), &call),
            Admission::Admitted
        );
        assert!(!record_identity(&db, &call.user).await);
        assert!(record_usage(&db, &call).await.is_none());
        assert!(started.elapsed() < BOOKKEEPING_TIMEOUT * 2 + Duration::from_secs(1));

        held.rollback().await?;
        Ok(())
    }
}
