//! Async history store used by the turn pipeline.

use crate::HistoryError;
use async_trait::async_trait;
use miku_db::DbPool;
use miku_types::{Message, Role, User, UserId, UserUpdate};
use rusqlite::Connection;

/// Persistence operations the turn pipeline depends on.
///
/// Implementations must be safe to share between concurrent turns. No
/// read-modify-write atomicity is promised beyond single statements.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Returns the user, creating it with default values if absent.
    async fn get_or_create_user(&self, id: UserId) -> Result<User, HistoryError>;

    /// Applies a partial profile update and returns the updated user.
    async fn update_user(&self, id: UserId, update: UserUpdate) -> Result<User, HistoryError>;

    /// Appends one turn to the user's history.
    async fn append_message(
        &self,
        user_id: UserId,
        role: Role,
        content: &str,
    ) -> Result<Message, HistoryError>;

    /// Returns the `limit` most recent messages, oldest first.
    async fn recent_messages(&self, user_id: UserId, limit: u32)
        -> Result<Vec<Message>, HistoryError>;
}

/// [`HistoryStore`] backed by the pooled SQLite database.
///
/// Every call checks out its own connection on the blocking thread pool, so
/// SQLite I/O never runs on the async executor.
#[derive(Clone)]
pub struct SqliteHistory {
    pool: DbPool,
}

impl SqliteHistory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, HistoryError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, HistoryError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            f(&conn)
        })
        .await
        .map_err(|e| HistoryError::Task(e.to_string()))?
    }
}

#[async_trait]
impl HistoryStore for SqliteHistory {
    async fn get_or_create_user(&self, id: UserId) -> Result<User, HistoryError> {
        self.with_conn(move |conn| crate::get_or_create_user(conn, id))
            .await
    }

    async fn update_user(&self, id: UserId, update: UserUpdate) -> Result<User, HistoryError> {
        self.with_conn(move |conn| crate::update_user(conn, id, &update))
            .await
    }

    async fn append_message(
        &self,
        user_id: UserId,
        role: Role,
        content: &str,
    ) -> Result<Message, HistoryError> {
        let content = content.to_string();
        self.with_conn(move |conn| crate::append_message(conn, user_id, role, &content))
            .await
    }

    async fn recent_messages(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<Message>, HistoryError> {
        self.with_conn(move |conn| crate::recent_messages(conn, user_id, limit))
            .await
    }
}
