//! Form link entity - The single weekly form configured per guild.
//!
//! `guild_id` is unique, so a guild holds at most one row; `set` overwrites it in place.
//! Expiry is derived at read time and never deletes the row.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Form link database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "form_links")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning guild, one row per guild
    #[sea_orm(unique)]
    pub guild_id: String,
    /// Link opened by the "Open Form" button
    #[sea_orm(column_type = "Text")]
    pub form_url: String,
    /// Submission deadline
    pub expires_at: DateTimeUtc,
    /// Embed title
    pub title: String,
    /// Embed description
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// Discord user that last set the link
    pub created_by: String,
    /// When the link was last set
    pub created_at: DateTimeUtc,
}

/// `FormLink` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
