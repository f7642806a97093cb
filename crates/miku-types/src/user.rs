//! User and message records.
//!
//! Both are owned by the history store. Users are created lazily with
//! default values and only change through explicit updates; messages are
//! immutable once written.

use crate::{Role, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque caller-owned preferences. The core never interprets them.
pub type Preferences = BTreeMap<String, serde_json::Value>;

/// A conversation owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Database ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Free-text interests.
    pub likes: String,
    /// Caller-owned key/value preferences.
    pub preferences: Preferences,
}

impl User {
    /// Display name given to lazily created users.
    pub const DEFAULT_NAME: &'static str = "User";
    /// Interests given to lazily created users.
    pub const DEFAULT_LIKES: &'static str = "Anime, Tech";

    /// Returns the profile a lazily created user starts with.
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            name: Self::DEFAULT_NAME.to_string(),
            likes: Self::DEFAULT_LIKES.to_string(),
            preferences: Preferences::new(),
        }
    }
}

/// A partial update to a [`User`].
///
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub likes: Option<String>,
    #[serde(default)]
    pub preferences: Option<Preferences>,
}

impl UserUpdate {
    /// Returns `true` if the update would not change anything.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.likes.is_none() && self.preferences.is_none()
    }
}

/// One persisted turn of a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Database ID. Strictly increasing in insertion order.
    pub id: i64,
    /// Owner of the conversation.
    pub user_id: UserId,
    /// Author of the turn.
    pub role: Role,
    /// Text of the turn, stored verbatim.
    pub content: String,
    /// Creation timestamp (`YYYY-MM-DD HH:MM:SS`, UTC).
    pub created_at: String,
}
