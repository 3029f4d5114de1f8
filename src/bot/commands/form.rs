//! Weekly form commands.
//!
//! `/edit-wk-form set|status` manage the guild's single form link and require the
//! elevated tier. `/wk-form` is public and shows the link with an "Open Form" button
//! while it is still open.

use crate::{
    bot::datetime_tag,
    core::form::{FormTiming, FormView, Urgency},
    entities::form_link,
};
use poise::serenity_prelude as serenity;

/// Reply when no form link was ever set for the guild.
pub const FORM_NOT_SET_MESSAGE: &str =
    "No form has been added for this rotation. Please ask an officer to set up the form.";
/// Reply when the stored form link is past its deadline.
pub const FORM_EXPIRED_MESSAGE: &str =
    "This form has expired and is no longer available for submissions.";
/// Admin status reply when no form link exists.
pub const NO_FORM_STATUS_MESSAGE: &str = "No form has been set up yet.";
/// Reply when storing the link fails.
pub const SET_FAILED_MESSAGE: &str = "An error occurred while setting the form link.";
/// Reply when reading the link fails.
pub const READ_FAILED_MESSAGE: &str = "An error occurred while fetching the form.";

/// Embed colour for an urgency tier.
#[must_use]
pub const fn urgency_color(urgency: Urgency) -> u32 {
    match urgency {
        Urgency::Urgent => 0xFF0000,
        Urgency::Soon => 0xFFA500,
        Urgency::Relaxed => 0x00FF00,
    }
}

/// Confirmation sent after a successful `set`.
#[must_use]
pub fn set_confirmation(link: &form_link::Model) -> String {
    format!(
        "✅ Form link set successfully! Expires: {}",
        datetime_tag(link.expires_at, 'F')
    )
}

/// Value of the admin embed's "Status" field.
#[must_use]
pub const fn status_label(timing: FormTiming) -> &'static str {
    if timing.expired { "❌ Expired" } else { "✅ Active" }
}

/// Admin status embed.
#[must_use]
pub fn status_embed(
    link: &form_link::Model,
    timing: FormTiming,
    creator: &str,
) -> serenity::CreateEmbed {
    let status = status_label(timing);
    serenity::CreateEmbed::default()
        .title("Form Status")
        .color(urgency_color(timing.status_urgency()))
        .field("Title", link.title.clone(), false)
        .field("URL", link.form_url.clone(), false)
        .field(
            "Expires",
            format!("{} ({})", datetime_tag(link.expires_at, 'F'), timing.status_text()),
            false,
        )
        .field("Created By", creator, true)
        .field("Created At", datetime_tag(link.created_at, 'F'), true)
        .field("Status", status, true)
}

/// Reply for `/wk-form`. Only an open form gets the link button.
#[must_use]
pub fn show_reply(view: &FormView) -> poise::CreateReply {
    match view {
        FormView::NotSet => poise::CreateReply::default()
            .content(FORM_NOT_SET_MESSAGE)
            .ephemeral(true),
        FormView::Expired(_) => poise::CreateReply::default()
            .content(FORM_EXPIRED_MESSAGE)
            .ephemeral(true),
        FormView::Active { link, timing } => {
            let embed = serenity::CreateEmbed::default()
                .title(link.title.clone())
                .description(link.description.clone())
                .color(urgency_color(timing.display_urgency()))
                .field(
                    "Deadline",
                    format!(
                        "{}\n{}",
                        datetime_tag(link.expires_at, 'F'),
                        timing.countdown_text()
                    ),
                    false,
                )
                .footer(serenity::CreateEmbedFooter::new(
                    "Click the button below to open the form",
                ));
            let button = serenity::CreateButton::new_link(link.form_url.clone())
                .label("Open Form")
                .emoji('📝');

            poise::CreateReply::default()
                .embed(embed)
                .components(vec![serenity::CreateActionRow::Buttons(vec![button])])
        }
    }
}

/// Parses a stored creator id; zero or non-numeric ids have no platform user.
pub(crate) fn creator_user_id(created_by: &str) -> Option<serenity::UserId> {
    created_by
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .map(serenity::UserId::new)
}

mod inner {
    #![allow(missing_docs)]

    use super::{
        NO_FORM_STATUS_MESSAGE, READ_FAILED_MESSAGE, SET_FAILED_MESSAGE, creator_user_id,
        set_confirmation, show_reply, status_embed,
    };
    use crate::{
        bot::{BotData, say_ephemeral},
        core::{
            access::PERMISSION_DENIED_MESSAGE,
            form::{
                DEFAULT_DESCRIPTION, DEFAULT_TITLE, FormTiming, FormView, NewFormLink,
                get_form_link, parse_expiration, set_form_link, validate_form_url,
            },
        },
        errors::{Error, Result},
    };
    use chrono::Utc;
    use tracing::{error, info};

    /// Checks the elevated tier: administrator permission or an allow-listed role.
    async fn has_form_admin_permission(ctx: poise::Context<'_, BotData, Error>) -> bool {
        let Some(member) = ctx.author_member().await else {
            return false;
        };

        let is_administrator = member
            .permissions
            .is_some_and(|permissions| permissions.administrator());
        let role_names: Vec<String> = ctx
            .guild()
            .map(|guild| {
                member
                    .roles
                    .iter()
                    .filter_map(|role_id| guild.roles.get(role_id).map(|role| role.name.clone()))
                    .collect()
            })
            .unwrap_or_default();

        ctx.data()
            .policy
            .grants_elevated(is_administrator, role_names.iter().map(String::as_str))
    }

    /// Manage the weekly form link
    #[poise::command(
        slash_command,
        guild_only,
        rename = "edit-wk-form",
        subcommands("set", "status"),
        subcommand_required
    )]
    pub async fn edit_wk_form(_ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        Ok(())
    }

    /// Set the weekly form link
    #[poise::command(slash_command, guild_only)]
    pub async fn set(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "The form URL"] url: String,
        #[description = "Expiration date (YYYY-MM-DD or YYYY-MM-DD HH:MM, UTC)"] expires: String,
        #[description = "Form title (default: Weekly Form)"] title: Option<String>,
        #[description = "Form description"] description: Option<String>,
    ) -> Result<()> {
        if !has_form_admin_permission(ctx).await {
            return say_ephemeral(ctx, PERMISSION_DENIED_MESSAGE).await;
        }
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };

        if let Err(err) = validate_form_url(&url) {
            return say_ephemeral(ctx, err.user_message().to_string()).await;
        }
        let expires_at = match parse_expiration(&expires) {
            Ok(expires_at) => expires_at,
            Err(err) => return say_ephemeral(ctx, err.user_message().to_string()).await,
        };

        let link = NewFormLink {
            guild_id: guild_id.to_string(),
            form_url: url.trim().to_string(),
            expires_at,
            title: title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            description: description.unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            created_by: ctx.author().id.to_string(),
        };

        match set_form_link(&ctx.data().database, link).await {
            Ok(saved) => {
                info!(guild_id = %guild_id, user_id = %ctx.author().id, "Weekly form link updated");
                say_ephemeral(ctx, set_confirmation(&saved)).await
            }
            Err(err) => {
                error!(guild_id = %guild_id, error = %err, "Failed to store form link");
                say_ephemeral(ctx, SET_FAILED_MESSAGE).await
            }
        }
    }

    /// Check the current form status
    #[poise::command(slash_command, guild_only)]
    pub async fn status(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        if !has_form_admin_permission(ctx).await {
            return say_ephemeral(ctx, PERMISSION_DENIED_MESSAGE).await;
        }
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };

        let link = match get_form_link(&ctx.data().database, &guild_id.to_string()).await {
            Ok(Some(link)) => link,
            Ok(None) => return say_ephemeral(ctx, NO_FORM_STATUS_MESSAGE).await,
            Err(err) => {
                error!(guild_id = %guild_id, error = %err, "Failed to read form link");
                return say_ephemeral(ctx, READ_FAILED_MESSAGE).await;
            }
        };

        let creator = match creator_user_id(&link.created_by) {
            Some(user_id) => match user_id.to_user(ctx).await {
                Ok(user) => user.name,
                Err(_) => "Unknown User".to_string(),
            },
            None => "Unknown User".to_string(),
        };

        let timing = FormTiming::evaluate(link.expires_at, Utc::now());
        ctx.send(
            poise::CreateReply::default()
                .embed(status_embed(&link, timing, &creator))
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

    /// Get the current weekly form link
    #[poise::command(slash_command, guild_only, rename = "wk-form")]
    pub async fn wk_form(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };

        let link = match get_form_link(&ctx.data().database, &guild_id.to_string()).await {
            Ok(link) => link,
            Err(err) => {
                error!(guild_id = %guild_id, error = %err, "Failed to read form link");
                return say_ephemeral(ctx, READ_FAILED_MESSAGE).await;
            }
        };

        let view = FormView::resolve(link, Utc::now());
        ctx.send(show_reply(&view)).await?;
        Ok(())
    }
}

pub use inner::*;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::{Duration, Utc};

    fn link(expires_in: Duration) -> form_link::Model {
        let now = Utc::now();
        form_link::Model {
            id: 1,
            guild_id: "g1".to_string(),
            form_url: "https://forms.example.com/weekly".to_string(),
            expires_at: now + expires_in,
            title: "Weekly Form".to_string(),
            description: "Please fill out this form by the deadline.".to_string(),
            created_by: "123".to_string(),
            created_at: now,
        }
    }

    #[test]
    fn test_active_form_has_open_button() {
        let view = FormView::resolve(Some(link(Duration::days(5))), Utc::now());
        let reply = show_reply(&view);

        assert_eq!(reply.embeds.len(), 1);
        assert_eq!(reply.components.as_ref().map(Vec::len), Some(1));
        assert_ne!(reply.ephemeral, Some(true));
    }

    #[test]
    fn test_expired_form_has_no_button() {
        let view = FormView::resolve(Some(link(-Duration::hours(1))), Utc::now());
        let reply = show_reply(&view);

        assert_eq!(reply.content.as_deref(), Some(FORM_EXPIRED_MESSAGE));
        assert!(reply.components.is_none());
        assert!(reply.embeds.is_empty());
        assert_eq!(reply.ephemeral, Some(true));
    }

    #[test]
    fn test_unset_form_is_friendly_text() {
        let reply = show_reply(&FormView::NotSet);
        assert_eq!(reply.content.as_deref(), Some(FORM_NOT_SET_MESSAGE));
        assert!(reply.components.is_none());
        assert_eq!(reply.ephemeral, Some(true));
    }

    #[test]
    fn test_urgency_colors() {
        assert_eq!(urgency_color(Urgency::Urgent), 0xFF0000);
        assert_eq!(urgency_color(Urgency::Soon), 0xFFA500);
        assert_eq!(urgency_color(Urgency::Relaxed), 0x00FF00);
    }

    #[test]
    fn test_status_label() {
        let now = Utc::now();
        let open = FormTiming::evaluate(now + Duration::days(2), now);
        let closed = FormTiming::evaluate(now - Duration::hours(1), now);

        assert_eq!(status_label(open), "✅ Active");
        assert_eq!(status_label(closed), "❌ Expired");
    }

    #[test]
    fn test_creator_user_id() {
        assert_eq!(creator_user_id("123"), Some(serenity::UserId::new(123)));
        assert_eq!(creator_user_id("0"), None);
        assert_eq!(creator_user_id("test_user"), None);
    }

    #[test]
    fn test_set_confirmation_uses_full_timestamp() {
        let saved = link(Duration::days(2));
        assert_eq!(
            set_confirmation(&saved),
            format!(
                "✅ Form link set successfully! Expires: <t:{}:F>",
                saved.expires_at.timestamp()
            )
        );
    }
}
