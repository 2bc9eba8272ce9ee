#![forbid(unsafe_code)]

//! Errors reported by the overlay.

use std::fmt;

/// Failures surfaced to the host.
///
/// None of these are fatal: the overlay stays dismissable after each one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpotlightError {
    /// `set_targets` was called with no targets.
    EmptySequence,
    /// The host element behind `page` is gone or detached, so its rectangle
    /// could not be refreshed.
    UnresolvableTarget { page: usize },
    /// A tour is already running.
    TourActive,
}

impl fmt::Display for SpotlightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySequence => write!(f, "walkthrough needs at least one target"),
            Self::UnresolvableTarget { page } => {
                write!(f, "target for page {page} is no longer attached")
            }
            Self::TourActive => write!(f, "a walkthrough is already running"),
        }
    }
}

impl std::error::Error for SpotlightError {}

/// Result alias for overlay operations.
pub type Result<T> = std::result::Result<T, SpotlightError>;

#[cfg(test)]
mod tests {
    use super::SpotlightError;

    #[test]
    fn display_names_the_page() {
        let err = SpotlightError::UnresolvableTarget { page: 3 };
        assert_eq!(err.to_string(), "target for page 3 is no longer attached");
    }

    #[test]
    fn is_std_error() {
        fn assert_error<E: std::error::Error>(_: &E) {}
        assert_error(&SpotlightError::EmptySequence);
    }
}
