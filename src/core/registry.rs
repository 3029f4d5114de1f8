//! Command registry.
//!
//! Built once at startup from the static command catalogue. Each entry is a typed
//! descriptor keyed by name; registering the same name twice fails construction instead
//! of silently replacing the earlier command. The help command and the dispatcher both
//! read from it.

use crate::errors::{Error, Result};
use std::collections::BTreeMap;

/// Help-listing group of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CommandCategory {
    /// Restricted management commands
    Admin,
    /// Games and random utilities
    Fun,
    /// Server, user and bot lookups
    Info,
    /// General helpers
    Utility,
}

impl CommandCategory {
    /// Heading used in the help listing.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Fun => "Fun",
            Self::Info => "Info",
            Self::Utility => "Utility",
        }
    }
}

/// One argument of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDescriptor {
    /// Argument name
    pub name: String,
    /// Argument help text
    pub description: String,
    /// Whether the argument must be supplied
    pub required: bool,
}

/// Static description of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor {
    /// Slash command name
    pub name: String,
    /// Help text
    pub description: String,
    /// Help-listing group
    pub category: CommandCategory,
    /// Direct arguments
    pub options: Vec<OptionDescriptor>,
    /// Nested subcommands
    pub subcommands: Vec<CommandDescriptor>,
}

impl CommandDescriptor {
    /// Usage line: `/name <required> [optional]`, or `/name <sub|sub>` for groups.
    #[must_use]
    pub fn usage(&self) -> String {
        let mut usage = format!("/{}", self.name);
        if !self.subcommands.is_empty() {
            let names: Vec<&str> = self.subcommands.iter().map(|s| s.name.as_str()).collect();
            usage.push_str(&format!(" <{}>", names.join("|")));
        }
        for option in &self.options {
            if option.required {
                usage.push_str(&format!(" <{}>", option.name));
            } else {
                usage.push_str(&format!(" [{}]", option.name));
            }
        }
        usage
    }
}

/// Name-keyed set of command descriptors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandRegistry {
    commands: BTreeMap<String, CommandDescriptor>,
}

impl CommandRegistry {
    /// Builds the registry, rejecting duplicate names.
    pub fn build<I>(descriptors: I) -> Result<Self>
    where
        I: IntoIterator<Item = CommandDescriptor>,
    {
        let mut commands = BTreeMap::new();
        for descriptor in descriptors {
            if commands.contains_key(&descriptor.name) {
                return Err(Error::DuplicateCommand {
                    name: descriptor.name,
                });
            }
            commands.insert(descriptor.name.clone(), descriptor);
        }
        Ok(Self { commands })
    }

    /// Looks up a command by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.get(name)
    }

    /// Whether a command with this name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Number of registered commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the registry holds no commands.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Commands grouped by category; groups and members are sorted by name.
    #[must_use]
    pub fn by_category(&self) -> BTreeMap<CommandCategory, Vec<&CommandDescriptor>> {
        let mut groups: BTreeMap<CommandCategory, Vec<&CommandDescriptor>> = BTreeMap::new();
        for descriptor in self.commands.values() {
            groups.entry(descriptor.category).or_default().push(descriptor);
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn command(name: &str, category: CommandCategory) -> CommandDescriptor {
        CommandDescriptor {
            name: name.to_string(),
            description: format!("{name} description"),
            category,
            options: Vec::new(),
            subcommands: Vec::new(),
        }
    }

    fn option(name: &str, required: bool) -> OptionDescriptor {
        OptionDescriptor {
            name: name.to_string(),
            description: String::new(),
            required,
        }
    }

    #[test]
    fn test_build_and_lookup() {
        let registry = CommandRegistry::build([
            command("ping", CommandCategory::Utility),
            command("random", CommandCategory::Fun),
        ])
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("ping"));
        assert!(!registry.contains("pong"));
        assert_eq!(registry.get("random").unwrap().category, CommandCategory::Fun);
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let result = CommandRegistry::build([
            command("ping", CommandCategory::Utility),
            command("ping", CommandCategory::Fun),
        ]);
        assert!(matches!(result, Err(Error::DuplicateCommand { name }) if name == "ping"));
    }

    #[test]
    fn test_by_category_sorts_groups_and_names() {
        let registry = CommandRegistry::build([
            command("wk-form", CommandCategory::Utility),
            command("help", CommandCategory::Utility),
            command("edit-wk-form", CommandCategory::Admin),
        ])
        .unwrap();

        let groups = registry.by_category();
        let keys: Vec<_> = groups.keys().copied().collect();
        assert_eq!(keys, vec![CommandCategory::Admin, CommandCategory::Utility]);
        let utility: Vec<&str> = groups[&CommandCategory::Utility]
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(utility, vec!["help", "wk-form"]);
    }

    #[test]
    fn test_usage_line() {
        let mut set = command("set", CommandCategory::Admin);
        set.options = vec![option("url", true), option("expires", true), option("title", false)];
        assert_eq!(set.usage(), "/set <url> <expires> [title]");

        let mut group = command("edit-wk-form", CommandCategory::Admin);
        group.subcommands = vec![set, command("status", CommandCategory::Admin)];
        assert_eq!(group.usage(), "/edit-wk-form <set|status>");

        assert_eq!(command("ping", CommandCategory::Utility).usage(), "/ping");
    }
}
