//! User entity - Every Discord user that has interacted with the bot.
//!
//! Rows are created on first interaction and refreshed (name, tag, last seen) on every
//! later one. They are never deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Discord user snowflake
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Display name at the last interaction
    pub username: String,
    /// Legacy four digit tag, `"0000"` for migrated accounts
    pub discriminator: String,
    /// When the user first interacted with the bot
    pub first_interaction: DateTimeUtc,
    /// When the user last interacted with the bot
    pub last_interaction: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user has many command usage events
    #[sea_orm(has_many = "super::command_usage::Entity")]
    CommandUsage,
}

impl Related<super::command_usage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CommandUsage.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
