//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod command_usage;
pub mod form_link;
pub mod guild;
pub mod user;

// Re-export specific types to avoid conflicts
pub use command_usage::{
    Column as CommandUsageColumn, Entity as CommandUsage, Model as CommandUsageModel,
};
pub use form_link::{Column as FormLinkColumn, Entity as FormLink, Model as FormLinkModel};
pub use guild::{Column as GuildColumn, Entity as Guild, Model as GuildModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
