//! Discord command implementations organized by category.
//!
//! [`catalog`] is the single static list of commands. [`build`] turns it into the poise
//! command vector and the [`CommandRegistry`] that help and dispatch read from.

/// Weekly form commands
pub mod form;

/// General utility commands
pub mod general;

/// Server, user and bot information commands
pub mod info;

/// Random generation commands
pub mod random;

use crate::{
    bot::BotData,
    core::registry::{CommandCategory, CommandDescriptor, CommandRegistry, OptionDescriptor},
    errors::{Error, Result},
};

/// Poise command type used by this bot.
pub type Command = poise::Command<BotData, Error>;

/// Every command the bot offers, tagged with its help category.
#[must_use]
pub fn catalog() -> Vec<(CommandCategory, Command)> {
    vec![
        (CommandCategory::Admin, form::edit_wk_form()),
        (CommandCategory::Fun, random::random()),
        (CommandCategory::Info, info::server_info()),
        (CommandCategory::Info, info::user_info()),
        (CommandCategory::Utility, form::wk_form()),
        (CommandCategory::Utility, general::help()),
        (CommandCategory::Utility, general::ping()),
        (CommandCategory::Utility, info::stats()),
    ]
}

/// Builds a descriptor from a poise command definition.
#[must_use]
pub fn describe(command: &Command, category: CommandCategory) -> CommandDescriptor {
    CommandDescriptor {
        name: command.name.clone(),
        description: command
            .description
            .clone()
            .unwrap_or_else(|| "No description available".to_string()),
        category,
        options: command
            .parameters
            .iter()
            .map(|parameter| OptionDescriptor {
                name: parameter.name.clone(),
                description: parameter.description.clone().unwrap_or_default(),
                required: parameter.required,
            })
            .collect(),
        subcommands: command
            .subcommands
            .iter()
            .map(|sub| describe(sub, category))
            .collect(),
    }
}

/// Splits the catalogue into poise commands and the registry, rejecting duplicates.
pub fn build(catalog: Vec<(CommandCategory, Command)>) -> Result<(Vec<Command>, CommandRegistry)> {
    let registry = CommandRegistry::build(
        catalog
            .iter()
            .map(|(category, command)| describe(command, *category)),
    )?;
    let commands = catalog.into_iter().map(|(_, command)| command).collect();
    Ok((commands, registry))
}
