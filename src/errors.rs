//! Unified error type for the bot.
//!
//! Validation faults carry a message meant for the invoking user; every other variant is
//! logged server-side and replaced by a generic reply before it reaches Discord.

use thiserror::Error;

/// Reply used whenever an error must not leak internal detail.
pub const GENERIC_FAILURE_MESSAGE: &str = "There was an error while executing this command!";

/// All errors produced by the bot.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// The persistence store rejected or failed an operation
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// User input failed validation; the message is shown to the user verbatim
    #[error("{message}")]
    Validation {
        /// Corrective message for the user
        message: String,
    },

    /// A record that must exist was missing
    #[error("Not found: {what}")]
    NotFound {
        /// Description of the missing record
        what: String,
    },

    /// Two commands were registered under the same name
    #[error("Duplicate command name: {name}")]
    DuplicateCommand {
        /// The conflicting name
        name: String,
    },

    /// A required environment variable was missing or not unicode
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Formatting a reply failed
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Serenity/Poise framework failure
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

impl Error {
    /// Shorthand for a user-facing validation fault.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Text that may be shown to the invoking user for this error.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Validation { message } => message,
            _ => GENERIC_FAILURE_MESSAGE,
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_is_shown_verbatim() {
        let err = Error::validation("The minimum value must be less than the maximum value.");
        assert_eq!(
            err.user_message(),
            "The minimum value must be less than the maximum value."
        );
    }

    #[test]
    fn test_internal_errors_are_hidden() {
        let err = Error::Database(sea_orm::DbErr::Custom("disk I/O error".to_string()));
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
        assert!(err.to_string().contains("disk I/O error"));
    }
}
