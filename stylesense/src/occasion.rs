//! The closed set of occasions advice can be tailored to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Occasion the user wants outfit advice for.
///
/// Selected once per request and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occasion {
    /// A relaxed day out.
    #[serde(rename = "Casual Outing")]
    CasualOuting,
    /// Everyday campus wear.
    College,
    /// A job interview.
    Interview,
    /// A party or night out.
    Party,
    /// Attending a wedding.
    Wedding,
    /// A festival or cultural celebration.
    Festival,
}

impl Occasion {
    /// Every selectable occasion, in presentation order.
    pub const ALL: [Self; 6] = [
        Self::CasualOuting,
        Self::College,
        Self::Interview,
        Self::Party,
        Self::Wedding,
        Self::Festival,
    ];

    /// Get the display string for this occasion.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CasualOuting => "Casual Outing",
            Self::College => "College",
            Self::Interview => "Interview",
            Self::Party => "Party",
            Self::Wedding => "Wedding",
            Self::Festival => "Festival",
        }
    }
}

impl fmt::Display for Occasion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the known occasions.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown occasion `{0}` (expected one of: Casual Outing, College, Interview, Party, Wedding, Festival)")]
pub struct ParseOccasionError(String);

impl FromStr for Occasion {
    type Err = ParseOccasionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "casual outing" | "casual" => Ok(Self::CasualOuting),
            "college" => Ok(Self::College),
            "interview" => Ok(Self::Interview),
            "party" => Ok(Self::Party),
            "wedding" => Ok(Self::Wedding),
            "festival" => Ok(Self::Festival),
            _ => Err(ParseOccasionError(s.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn display_round_trips_through_from_str() {
        for occasion in Occasion::ALL {
            let parsed: Occasion = occasion.as_str().parse().unwrap();
            assert_eq!(parsed, occasion);
        }
    }

    #[test]
    fn from_str_accepts_cli_friendly_forms() {
        assert_eq!(
            "casual-outing".parse::<Occasion>().unwrap(),
            Occasion::CasualOuting
        );
        assert_eq!("PARTY".parse::<Occasion>().unwrap(), Occasion::Party);
        assert_eq!(" wedding ".parse::<Occasion>().unwrap(), Occasion::Wedding);
    }

    #[test]
    fn from_str_rejects_unknown() {
        assert!("brunch".parse::<Occasion>().is_err());
    }

    #[test]
    fn serializes_as_display_string() {
        let json = serde_json::to_string(&Occasion::CasualOuting).unwrap();
        assert_eq!(json, "\"Casual Outing\"");
    }

    #[test]
    fn all_covers_the_closed_set() {
        assert_eq!(Occasion::ALL.len(), 6);
    }
}
