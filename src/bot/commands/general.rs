//! General Discord commands - ping and help.
//! Help text is rendered from the command registry, so new commands show up without
//! touching this module.

use crate::core::registry::{CommandDescriptor, CommandRegistry};
use std::fmt::Write as _;

/// Embed colour shared by the informational replies.
pub const INFO_COLOR: u32 = 0x0099FF;

/// Renders the grouped command listing: one `(heading, body)` pair per category.
#[must_use]
pub fn help_overview(registry: &CommandRegistry) -> Vec<(String, String)> {
    registry
        .by_category()
        .into_iter()
        .map(|(category, commands)| {
            let body = commands
                .iter()
                .map(|command| format!("`/{}` - {}", command.name, command.description))
                .collect::<Vec<_>>()
                .join("\n");
            (category.label().to_string(), body)
        })
        .collect()
}

/// Renders the detail view of one command: usage line, options and subcommands.
pub fn help_detail(command: &CommandDescriptor) -> Result<String, std::fmt::Error> {
    let mut text = String::new();
    writeln!(text, "{}", command.description)?;
    writeln!(text, "\n**Usage:** `{}`", command.usage())?;

    if !command.options.is_empty() {
        writeln!(text, "\n**Options:**")?;
        for option in &command.options {
            let marker = if option.required { "required" } else { "optional" };
            writeln!(
                text,
                "• `{}` ({marker}) - {}",
                option.name, option.description
            )?;
        }
    }

    if !command.subcommands.is_empty() {
        writeln!(text, "\n**Subcommands:**")?;
        for sub in &command.subcommands {
            let usage = sub.usage().replacen('/', &format!("/{} ", command.name), 1);
            writeln!(text, "• `{usage}` - {}", sub.description)?;
        }
    }

    Ok(text.trim_end().to_string())
}

/// Reply for a help lookup that matched nothing.
#[must_use]
pub fn unknown_command_message(name: &str) -> String {
    format!("I couldn't find any command called `{name}`")
}

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use super::{INFO_COLOR, help_detail, help_overview, unknown_command_message};
    use crate::{
        bot::{BotData, handlers::autocomplete::autocomplete_command_name, say_ephemeral},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::time::Instant;

    /// Replies with Pong and the bot's latency.
    ///
    /// Round-trip latency is measured around the initial reply; API latency is the
    /// gateway heartbeat.
    #[poise::command(slash_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let started = Instant::now();
        let handle = ctx.say("Pinging...").await?;
        let round_trip = started.elapsed().as_millis();
        let gateway = ctx.ping().await.as_millis();

        handle
            .edit(
                ctx,
                poise::CreateReply::default().content(format!(
                    "Pong! 🏓\nBot Latency: {round_trip}ms\nAPI Latency: {gateway}ms"
                )),
            )
            .await?;
        Ok(())
    }

    /// List all commands or info about a specific command
    #[poise::command(slash_command)]
    pub async fn help(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "The specific command to get info about"]
        #[autocomplete = "autocomplete_command_name"]
        command: Option<String>,
    ) -> Result<()> {
        let registry = &ctx.data().registry;

        let Some(name) = command else {
            let mut embed = serenity::CreateEmbed::default()
                .title("Available Commands")
                .description("Use `/help <command>` for details about a specific command.")
                .color(INFO_COLOR);
            for (heading, body) in help_overview(registry) {
                embed = embed.field(heading, body, false);
            }
            ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
                .await?;
            return Ok(());
        };

        let Some(descriptor) = registry.get(name.trim().to_lowercase().as_str()) else {
            return say_ephemeral(ctx, unknown_command_message(&name)).await;
        };

        let embed = serenity::CreateEmbed::default()
            .title(format!("Command: /{}", descriptor.name))
            .description(help_detail(descriptor)?)
            .field("Category", descriptor.category.label(), true)
            .color(INFO_COLOR);
        ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::registry::{CommandCategory, OptionDescriptor};

    fn descriptor(name: &str, category: CommandCategory) -> CommandDescriptor {
        CommandDescriptor {
            name: name.to_string(),
            description: format!("Does {name}"),
            category,
            options: Vec::new(),
            subcommands: Vec::new(),
        }
    }

    #[test]
    fn test_help_overview_groups_by_category() {
        let registry = CommandRegistry::build([
            descriptor("ping", CommandCategory::Utility),
            descriptor("random", CommandCategory::Fun),
            descriptor("help", CommandCategory::Utility),
        ])
        .unwrap();

        let overview = help_overview(&registry);
        assert_eq!(overview.len(), 2);
        assert_eq!(overview[0].0, "Fun");
        assert_eq!(overview[1].0, "Utility");
        assert_eq!(overview[1].1, "`/help` - Does help\n`/ping` - Does ping");
    }

    #[test]
    fn test_help_detail_lists_options_and_subcommands() {
        let mut number = descriptor("number", CommandCategory::Fun);
        number.options = vec![OptionDescriptor {
            name: "min".to_string(),
            description: "Lower bound".to_string(),
            required: false,
        }];
        let mut random = descriptor("random", CommandCategory::Fun);
        random.subcommands = vec![number, descriptor("coin", CommandCategory::Fun)];

        let text = help_detail(&random).unwrap();
        assert!(text.starts_with("Does random"));
        assert!(text.contains("**Usage:** `/random <number|coin>`"));
        assert!(text.contains("• `/random number [min]` - Does number"));
        assert!(text.contains("• `/random coin` - Does coin"));
        assert!(!text.contains("**Options:**"));
    }

    #[test]
    fn test_help_detail_marks_required_options() {
        let mut set = descriptor("set", CommandCategory::Admin);
        set.options = vec![OptionDescriptor {
            name: "url".to_string(),
            description: "Form link".to_string(),
            required: true,
        }];
        let text = help_detail(&set).unwrap();
        assert!(text.contains("• `url` (required) - Form link"));
    }

    #[test]
    fn test_unknown_command_message() {
        assert_eq!(
            unknown_command_message("nope"),
            "I couldn't find any command called `nope`"
        );
    }
}
