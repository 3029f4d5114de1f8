//! Side channel for best-effort bookkeeping.
//!
//! Identity upserts and usage logging must never block a user-visible reply. Instead of
//! silently discarding their errors, callers route them through [`NonFatal::non_fatal`],
//! which logs the failure at `warn` level and yields `None`.

use crate::errors::Result;
use tracing::warn;

/// Converts a fallible bookkeeping result into an optional value, logging the error.
pub trait NonFatal<T> {
    /// Returns the value on success; logs `activity` and the error otherwise.
    fn non_fatal(self, activity: &'static str) -> Option<T>;
}

impl<T> NonFatal<T> for Result<T> {
    fn non_fatal(self, activity: &'static str) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(activity, error = %error, "Non-fatal bookkeeping failure");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;

    #[test]
    fn test_non_fatal_passes_values_through() {
        let ok: Result<u8> = Ok(7);
        assert_eq!(ok.non_fatal("test"), Some(7));
    }

    #[test]
    fn test_non_fatal_swallows_errors() {
        let failed: Result<u8> = Err(Error::NotFound {
            what: "row".to_string(),
        });
        assert_eq!(failed.non_fatal("test"), None);
    }
}
