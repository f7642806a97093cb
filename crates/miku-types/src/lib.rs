//! Shared types and constants for the Miku assistant.
//!
//! This crate provides the foundational domain types used across all Miku
//! crates: conversation roles, the closed emotion vocabulary, and the user and
//! message records owned by the history store.
//!
//! No crate in the workspace depends on anything *except* `miku-types` for
//! cross-cutting type definitions. This keeps the dependency graph clean and
//! prevents circular dependencies.

use serde::{Deserialize, Serialize};
use std::fmt;

mod user;
pub use user::{Message, Preferences, User, UserUpdate};

/// Name of the assistant persona. Assistant turns are stored under this role.
pub const PERSONA_NAME: &str = "miku";

/// Identifier of the single demo user served when no other identity is
/// configured.
pub const DEMO_USER_ID: UserId = UserId(1);

/// Identifies the owner of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    /// Returns the raw database identifier.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The author of a persisted conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A turn written by the human user.
    User,
    /// A turn written by the assistant persona.
    #[serde(rename = "miku")]
    Assistant,
}

impl Role {
    /// Returns the label stored in the history table.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => PERSONA_NAME,
        }
    }

    /// Maps a stored role label back to a `Role`.
    ///
    /// Only the persona name maps to [`Role::Assistant`]; every other label is
    /// treated as a user turn.
    pub fn from_stored(label: &str) -> Self {
        if label == PERSONA_NAME {
            Self::Assistant
        } else {
            Self::User
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed vocabulary of leading emotion tags a reply may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    #[default]
    Happy,
    Sad,
    Innocent,
    Crying,
    Soft,
    Excited,
}

impl Emotion {
    /// Every member of the vocabulary, in the order the persona lists them.
    pub const ALL: [Emotion; 6] = [
        Self::Happy,
        Self::Sad,
        Self::Innocent,
        Self::Crying,
        Self::Soft,
        Self::Excited,
    ];

    /// Returns the tag label for this emotion.
    pub fn label(self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Innocent => "innocent",
            Self::Crying => "crying",
            Self::Soft => "soft",
            Self::Excited => "excited",
        }
    }

    /// Parses a tag label, ignoring ASCII case and surrounding whitespace.
    ///
    /// Returns `None` for labels outside the vocabulary.
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|emotion| emotion.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emotion_labels_round_trip() {
        for emotion in Emotion::ALL {
            assert_eq!(Emotion::parse(emotion.label()), Some(emotion));
        }
    }

    #[test]
    fn emotion_parse_is_lenient_about_case_and_padding() {
        assert_eq!(Emotion::parse(" Excited "), Some(Emotion::Excited));
        assert_eq!(Emotion::parse("SAD"), Some(Emotion::Sad));
        assert_eq!(Emotion::parse("angry"), None);
        assert_eq!(Emotion::parse(""), None);
    }

    #[test]
    fn emotion_defaults_to_happy() {
        assert_eq!(Emotion::default(), Emotion::Happy);
        assert_eq!(serde_json::to_string(&Emotion::Crying).unwrap(), "\"crying\"");
    }

    #[test]
    fn role_labels() {
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Assistant.as_str(), "miku");
        assert_eq!(Role::from_stored("miku"), Role::Assistant);
        assert_eq!(Role::from_stored("user"), Role::User);
        assert_eq!(Role::from_stored("system"), Role::User);
    }
}
