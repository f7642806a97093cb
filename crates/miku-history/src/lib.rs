//! Conversation history for the Miku assistant.
//!
//! Owns the persisted [`User`] and [`Message`] records. The free functions in
//! this module operate on a borrowed SQLite connection and are the only code
//! that touches the `users` and `messages` tables. [`SqliteHistory`] wraps
//! them behind the async [`HistoryStore`] trait consumed by the turn
//! pipeline.
//!
//! Messages are append-only. The "recent window" query returns the most
//! recent N messages by insertion order, oldest first.

mod store;

pub use store::{HistoryStore, SqliteHistory};

use miku_types::{Message, Preferences, Role, User, UserId, UserUpdate};
use rusqlite::{params, Connection, OptionalExtension, Row};
use thiserror::Error;

/// Errors that can occur during history operations.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("user not found: {0}")]
    NotFound(UserId),
    #[error("history task failed: {0}")]
    Task(String),
}

/// Retrieves a user by ID.
pub fn get_user(conn: &Connection, id: UserId) -> Result<User, HistoryError> {
    conn.query_row(
        "SELECT id, name, likes, preferences_json FROM users WHERE id = ?1",
        [id.get()],
        map_row_to_user,
    )
    .optional()?
    .ok_or(HistoryError::NotFound(id))
}

/// Retrieves a user, creating it with default values if it does not exist.
///
/// Creation uses `INSERT OR IGNORE`, so two turns racing to create the same
/// user both observe the single surviving row.
pub fn get_or_create_user(conn: &Connection, id: UserId) -> Result<User, HistoryError> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO users (id, name, likes, preferences_json)
         VALUES (?1, ?2, ?3, '{}')",
        params![id.get(), User::DEFAULT_NAME, User::DEFAULT_LIKES],
    )?;
    if inserted > 0 {
        tracing::info!(user_id = id.get(), "created user with default profile");
    }
    get_user(conn, id)
}

/// Applies a partial update to a user, creating the user first if needed.
///
/// Only fields that are `Some` in `update` are modified, using a single
/// UPDATE statement.
pub fn update_user(
    conn: &Connection,
    id: UserId,
    update: &UserUpdate,
) -> Result<User, HistoryError> {
    get_or_create_user(conn, id)?;

    let mut set_parts: Vec<String> = Vec::new();
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(name) = &update.name {
        values.push(Box::new(name.clone()));
        set_parts.push(format!("name = ?{}", values.len()));
    }
    if let Some(likes) = &update.likes {
        values.push(Box::new(likes.clone()));
        set_parts.push(format!("likes = ?{}", values.len()));
    }
    if let Some(preferences) = &update.preferences {
        values.push(Box::new(serde_json::to_string(preferences)?));
        set_parts.push(format!("preferences_json = ?{}", values.len()));
    }

    if !set_parts.is_empty() {
        values.push(Box::new(id.get()));
        let sql = format!(
            "UPDATE users SET {} WHERE id = ?{}",
            set_parts.join(", "),
            values.len()
        );
        let params: Vec<&dyn rusqlite::types::ToSql> = values.iter().map(|v| v.as_ref()).collect();
        conn.execute(&sql, params.as_slice())?;
    }

    get_user(conn, id)
}

/// Appends a message to a user's history and returns the stored record.
pub fn append_message(
    conn: &Connection,
    user_id: UserId,
    role: Role,
    content: &str,
) -> Result<Message, HistoryError> {
    let message = conn.query_row(
        "INSERT INTO messages (user_id, role, content) VALUES (?1, ?2, ?3)
         RETURNING id, user_id, role, content, created_at",
        params![user_id.get(), role.as_str(), content],
        map_row_to_message,
    )?;
    Ok(message)
}

/// Returns the `limit` most recent messages for a user, oldest first.
pub fn recent_messages(
    conn: &Connection,
    user_id: UserId,
    limit: u32,
) -> Result<Vec<Message>, HistoryError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, role, content, created_at
         FROM messages
         WHERE user_id = ?1
         ORDER BY id DESC
         LIMIT ?2",
    )?;

    let rows = stmt.query_map(params![user_id.get(), limit], map_row_to_message)?;
    let mut messages = Vec::new();
    for row in rows {
        messages.push(row?);
    }
    messages.reverse();
    Ok(messages)
}

/// Counts every message stored for a user.
pub fn count_messages(conn: &Connection, user_id: UserId) -> Result<u64, HistoryError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM messages WHERE user_id = ?1",
        [user_id.get()],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}

fn map_row_to_user(row: &Row) -> rusqlite::Result<User> {
    let preferences_str: String = row.get(3)?;
    let preferences: Preferences = serde_json::from_str(&preferences_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(User {
        id: UserId(row.get(0)?),
        name: row.get(1)?,
        likes: row.get(2)?,
        preferences,
    })
}

fn map_row_to_message(row: &Row) -> rusqlite::Result<Message> {
    let role: String = row.get(2)?;
    Ok(Message {
        id: row.get(0)?,
        user_id: UserId(row.get(1)?),
        role: Role::from_stored(&role),
        content: row.get(3)?,
        created_at: row.get(4)?,
    })
}
