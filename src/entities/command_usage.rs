//! Command usage entity - Append-only log of dispatched commands.
//!
//! One row per admitted invocation, written before the handler runs. Rows are
//! aggregated by `command_name` for the stats views and never updated.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Command usage database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "command_usage")]
pub struct Model {
    /// Unique identifier for the event
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Top-level slash command name
    pub command_name: String,
    /// Invoking user
    pub user_id: String,
    /// Guild the command ran in, `None` for direct messages
    pub guild_id: Option<String>,
    /// When the command was invoked
    pub used_at: DateTimeUtc,
}

/// Defines relationships between `CommandUsage` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each event belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// Each guild event belongs to one guild
    #[sea_orm(
        belongs_to = "super::guild::Entity",
        from = "Column::GuildId",
        to = "super::guild::Column::Id"
    )]
    Guild,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::guild::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Guild.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
