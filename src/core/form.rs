//! Weekly form business logic.
//!
//! Each guild has at most one form link. Setting it is a single atomic upsert keyed by
//! guild id, never a read-modify-write, so concurrent `set` calls cannot interleave into
//! duplicate rows or half-applied updates. Expiry is computed when the link is read.

use crate::{
    entities::{FormLink, form_link},
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sea_orm::{Set, prelude::*, sea_query::OnConflict};
use tracing::{info, instrument};
use url::Url;

/// Title used when `set` is called without one.
pub const DEFAULT_TITLE: &str = "Weekly Form";
/// Description used when `set` is called without one.
pub const DEFAULT_DESCRIPTION: &str = "Please fill out this form by the deadline.";
/// Reply for a malformed form URL.
pub const INVALID_URL_MESSAGE: &str =
    "Please provide a valid URL including the protocol (e.g., https://docs.google.com/forms/...)";
/// Reply for an unparseable expiration.
pub const INVALID_EXPIRY_MESSAGE: &str =
    "Invalid date/time format. Please use YYYY-MM-DD or YYYY-MM-DD HH:MM.";

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

const DATE_TIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Validates a form URL. Only absolute `http`/`https` links are accepted because the
/// link button Discord renders cannot open anything else.
pub fn validate_form_url(input: &str) -> Result<Url> {
    let url = Url::parse(input.trim()).map_err(|_| Error::validation(INVALID_URL_MESSAGE))?;
    match url.scheme() {
        "http" | "https" if url.host().is_some() => Ok(url),
        _ => Err(Error::validation(INVALID_URL_MESSAGE)),
    }
}

/// Parses an expiration given as a date or a date with time, in UTC.
///
/// A bare date resolves to 23:59 of that day.
pub fn parse_expiration(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();

    for format in DATE_TIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(parsed.and_utc());
        }
    }

    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| Error::validation(INVALID_EXPIRY_MESSAGE))?;
    let last_minute =
        NaiveTime::from_hms_opt(23, 59, 0).ok_or_else(|| Error::validation(INVALID_EXPIRY_MESSAGE))?;
    Ok(date.and_time(last_minute).and_utc())
}

/// Input for [`set_form_link`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFormLink {
    /// Guild the link belongs to
    pub guild_id: String,
    /// Validated form URL
    pub form_url: String,
    /// Absolute deadline
    pub expires_at: DateTime<Utc>,
    /// Embed title
    pub title: String,
    /// Embed description
    pub description: String,
    /// User setting the link
    pub created_by: String,
}

/// Stores the guild's form link, replacing every field of any previous one.
#[instrument(skip(db, link), fields(guild_id = %link.guild_id))]
pub async fn set_form_link(db: &DatabaseConnection, link: NewFormLink) -> Result<form_link::Model> {
    let guild_id = link.guild_id.clone();
    let model = form_link::ActiveModel {
        guild_id: Set(link.guild_id),
        form_url: Set(link.form_url),
        expires_at: Set(link.expires_at),
        title: Set(link.title),
        description: Set(link.description),
        created_by: Set(link.created_by),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    FormLink::insert(model)
        .on_conflict(
            OnConflict::column(form_link::Column::GuildId)
                .update_columns([
                    form_link::Column::FormUrl,
                    form_link::Column::ExpiresAt,
                    form_link::Column::Title,
                    form_link::Column::Description,
                    form_link::Column::CreatedBy,
                    form_link::Column::CreatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    info!("Form link stored");
    get_form_link(db, &guild_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            what: format!("form link for guild {guild_id}"),
        })
}

/// Returns the guild's form link, if one was ever set.
pub async fn get_form_link(
    db: &DatabaseConnection,
    guild_id: &str,
) -> Result<Option<form_link::Model>> {
    FormLink::find()
        .filter(form_link::Column::GuildId.eq(guild_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Display tier derived from the time left; the bot layer maps it to an embed colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    /// Red
    Urgent,
    /// Orange
    Soon,
    /// Green
    Relaxed,
}

/// Expiry state of a form link at a given instant. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormTiming {
    /// `expires_at` lies before `now`
    pub expired: bool,
    /// Ceiling of the remaining time in days; zero or negative once expired
    pub days_remaining: i64,
}

impl FormTiming {
    /// Evaluates `expires_at` against `now`.
    #[must_use]
    pub fn evaluate(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let remaining_ms = (expires_at - now).num_milliseconds();
        let mut days_remaining = remaining_ms.div_euclid(MILLIS_PER_DAY);
        if remaining_ms.rem_euclid(MILLIS_PER_DAY) > 0 {
            days_remaining += 1;
        }

        Self {
            expired: expires_at < now,
            days_remaining,
        }
    }

    /// Tier for the admin status view.
    #[must_use]
    pub const fn status_urgency(&self) -> Urgency {
        if self.expired {
            Urgency::Urgent
        } else if self.days_remaining <= 1 {
            Urgency::Soon
        } else {
            Urgency::Relaxed
        }
    }

    /// Tier for the public form view.
    #[must_use]
    pub const fn display_urgency(&self) -> Urgency {
        if self.days_remaining <= 1 {
            Urgency::Urgent
        } else if self.days_remaining <= 3 {
            Urgency::Soon
        } else {
            Urgency::Relaxed
        }
    }

    /// Countdown shown next to the deadline in the public view.
    #[must_use]
    pub fn countdown_text(&self) -> String {
        match self.days_remaining {
            d if d <= 0 => "Expires today!".to_string(),
            1 => "Expires tomorrow!".to_string(),
            d => format!("Expires in {d} days"),
        }
    }

    /// Remaining-time text shown in the admin status view.
    #[must_use]
    pub fn status_text(&self) -> String {
        if self.expired {
            "EXPIRED".to_string()
        } else {
            format!("{} days remaining", self.days_remaining)
        }
    }
}

/// What the public `wk-form` command should present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormView {
    /// No link was ever set for the guild
    NotSet,
    /// A link exists but its deadline has passed
    Expired(form_link::Model),
    /// A link is open for submissions
    Active {
        /// The stored link
        link: form_link::Model,
        /// Timing at read time
        timing: FormTiming,
    },
}

impl FormView {
    /// Classifies a stored link at `now`.
    #[must_use]
    pub fn resolve(link: Option<form_link::Model>, now: DateTime<Utc>) -> Self {
        match link {
            None => Self::NotSet,
            Some(link) => {
                let timing = FormTiming::evaluate(link.expires_at, now);
                if timing.expired {
                    Self::Expired(link)
                } else {
                    Self::Active { link, timing }
                }
            }
        }
    }
}
