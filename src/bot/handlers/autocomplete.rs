//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggestions come from the command registry, so `/help` only ever offers names that
//! actually resolve.

use crate::bot::Context;

/// Discord's cap on autocomplete choices.
const MAX_CHOICES: usize = 25;

/// Filters registered command names by the user's partial input (case-insensitive).
#[must_use]
pub fn matching_command_names<'a, I>(names: I, partial: &str) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let partial_lower = partial.to_lowercase();
    names
        .into_iter()
        .filter(|name| name.to_lowercase().contains(&partial_lower))
        .map(str::to_string)
        .take(MAX_CHOICES)
        .collect()
}

/// Provides autocomplete suggestions for command names.
pub async fn autocomplete_command_name(ctx: Context<'_>, partial: &str) -> Vec<String> {
    let registry = &ctx.data().registry;
    let names: Vec<&str> = registry
        .by_category()
        .into_values()
        .flatten()
        .map(|descriptor| descriptor.name.as_str())
        .collect();

    let mut matching = matching_command_names(names, partial);
    // Sort alphabetically for consistent UX
    matching.sort();
    matching
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_command_names() {
        let names = ["ping", "wk-form", "edit-wk-form", "stats"];
        assert_eq!(
            matching_command_names(names, "FORM"),
            vec!["wk-form".to_string(), "edit-wk-form".to_string()]
        );
        assert_eq!(matching_command_names(names, "").len(), 4);
        assert!(matching_command_names(names, "zzz").is_empty());
    }
}
