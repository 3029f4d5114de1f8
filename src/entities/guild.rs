//! Guild entity - Discord servers the bot has observed.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Guild database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "guilds")]
pub struct Model {
    /// Discord guild snowflake
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Server name as last seen
    pub name: String,
    /// Legacy text-command prefix, unused by slash commands
    pub prefix: String,
    /// When the bot first recorded this guild
    pub joined_at: DateTimeUtc,
}

/// Defines relationships between Guild and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One guild has many command usage events
    #[sea_orm(has_many = "super::command_usage::Entity")]
    CommandUsage,
}

impl Related<super::command_usage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CommandUsage.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
