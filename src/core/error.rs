//! Error types for campus-route
//!
//! Every failure of the routing core is converted at its boundary into one of
//! these kinds, then into a localized notice or a silent no-op.

use std::fmt;

use strsim::{jaro_winkler, normalized_levenshtein};

use crate::core::selection::Role;

/// Main error type for campus-route operations
#[derive(Debug)]
pub enum Error {
    /// Route planning was triggered before both endpoints were chosen
    MissingWaypoint(Role),

    /// Transport failure or non-success status from the routing service
    RouteFetchFailed(String),

    /// Routing service answered but returned no usable path
    NoRouteFound,

    /// Routing profile outside the supported set
    UnsupportedProfile {
        value: String,
        suggestion: Option<String>,
    },

    /// Basemap style outside the supported set
    UnsupportedStyle {
        value: String,
        suggestion: Option<String>,
    },

    /// A style swap was requested while another one is still running
    StyleSwapInProgress,

    /// The map library reported an error while loading a basemap style
    StyleLoadFailed(String),

    /// Remote geocoding failed; the resolver degrades this to "no suggestions"
    GeocodeUnavailable(String),

    /// The map library rejected a source or layer mutation
    MapError(String),

    /// Invalid configuration or parameters
    InvalidInput(String),

    /// Configuration could not be read or parsed
    ConfigError(String),

    /// File I/O error
    IoError(std::io::Error),
}

impl Error {
    /// Locale key of the notice shown to the user, if this kind is user-facing
    pub fn notice_key(&self) -> Option<&'static str> {
        match self {
            Error::MissingWaypoint(_) => Some("noticeMissingWaypoint"),
            Error::RouteFetchFailed(_) => Some("noticeFetchFailed"),
            Error::NoRouteFound => Some("noticeNoRoute"),
            Error::StyleLoadFailed(_) => Some("noticeStyleFailed"),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingWaypoint(role) => {
                write!(f, "No {role} selected; choose both start and end locations")
            }
            Error::RouteFetchFailed(msg) => {
                write!(f, "Failed to fetch route: {msg}")
            }
            Error::NoRouteFound => {
                write!(f, "No route found")
            }
            Error::UnsupportedProfile { value, suggestion } => {
                write!(f, "Routing profile '{value}' is not supported")?;
                if let Some(suggestion) = suggestion {
                    write!(f, ". Did you mean '{suggestion}'?")?;
                }
                Ok(())
            }
            Error::UnsupportedStyle { value, suggestion } => {
                write!(f, "Basemap style '{value}' is not supported")?;
                if let Some(suggestion) = suggestion {
                    write!(f, ". Did you mean '{suggestion}'?")?;
                }
                Ok(())
            }
            Error::StyleSwapInProgress => {
                write!(f, "A basemap style change is already in progress")
            }
            Error::StyleLoadFailed(msg) => {
                write!(f, "Basemap style failed to load: {msg}")
            }
            Error::GeocodeUnavailable(msg) => {
                write!(f, "Geocoding unavailable: {msg}")
            }
            Error::MapError(msg) => {
                write!(f, "Map error: {msg}")
            }
            Error::InvalidInput(msg) => {
                write!(f, "Invalid input: {msg}")
            }
            Error::ConfigError(msg) => {
                write!(f, "Configuration error: {msg}")
            }
            Error::IoError(err) => {
                write!(f, "I/O error: {err}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::RouteFetchFailed(format!("request timed out: {err}"))
        } else {
            Error::RouteFetchFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}

/// Convenience result type for campus-route operations
pub type Result<T> = std::result::Result<T, Error>;

/// Suggest the closest known identifier for a misspelled one
///
/// Scores each candidate with Jaro-Winkler (70%) and normalized Levenshtein
/// (30%) on the lowercased strings and returns the best one above 0.7.
/// An exact case-insensitive match needs no suggestion and yields `None`.
pub fn suggest_correction<'a, I>(input: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let input_lower = input.trim().to_lowercase();
    if input_lower.is_empty() {
        return None;
    }

    let mut best_match = None;
    let mut best_score = 0.0f64;
    let min_threshold = 0.7;

    for candidate in candidates {
        let candidate_lower = candidate.to_lowercase();
        if candidate_lower == input_lower {
            return None;
        }

        let score = jaro_winkler(&input_lower, &candidate_lower) * 0.7
            + normalized_levenshtein(&input_lower, &candidate_lower) * 0.3;

        if score >= min_threshold && score > best_score {
            best_score = score;
            best_match = Some(candidate.to_string());
        }
    }

    best_match
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggest_correction_typos() {
        let styles = ["detailed", "high-contrast", "satellite"];
        assert_eq!(
            suggest_correction("satelite", styles),
            Some("satellite".to_string())
        );
        assert_eq!(
            suggest_correction("hihg-contrast", styles),
            Some("high-contrast".to_string())
        );
    }

    #[test]
    fn test_suggest_correction_no_match() {
        let profiles = ["all-access", "step-free"];
        assert_eq!(suggest_correction("totally-unrelated-value", profiles), None);
        assert_eq!(suggest_correction("", profiles), None);
        // Correct spelling, just wrong case
        assert_eq!(suggest_correction("STEP-FREE", profiles), None);
    }

    #[test]
    fn test_notice_keys() {
        assert_eq!(
            Error::MissingWaypoint(Role::Origin).notice_key(),
            Some("noticeMissingWaypoint")
        );
        assert_eq!(Error::NoRouteFound.notice_key(), Some("noticeNoRoute"));
        assert_eq!(
            Error::RouteFetchFailed("HTTP 502".to_string()).notice_key(),
            Some("noticeFetchFailed")
        );
        assert_eq!(Error::GeocodeUnavailable("down".to_string()).notice_key(), None);
    }

    #[test]
    fn test_display_includes_suggestion() {
        let err = Error::UnsupportedProfile {
            value: "step-fre".to_string(),
            suggestion: Some("step-free".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Routing profile 'step-fre' is not supported. Did you mean 'step-free'?"
        );
    }
}
