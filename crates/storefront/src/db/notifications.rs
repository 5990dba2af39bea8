//! Notification repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use aneka_citra_core::{NotificationId, OrderId, Severity, UserId};

use super::{RepositoryError, map_constraint_error};
use crate::models::Notification;

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, order_id, title, message, severity, is_read, created_at";

/// Internal row type for `PostgreSQL` notification queries.
#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: i32,
    user_id: i32,
    order_id: Option<i32>,
    title: String,
    message: String,
    severity: Severity,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Self {
            id: NotificationId::new(row.id),
            user_id: UserId::new(row.user_id),
            order_id: row.order_id.map(OrderId::new),
            title: row.title,
            message: row.message,
            severity: row.severity,
            is_read: row.is_read,
            created_at: row.created_at,
        }
    }
}

/// Fields of a new inbox entry.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: UserId,
    pub order_id: Option<OrderId>,
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

/// Repository for notification database operations.
pub struct NotificationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NotificationRepository<'a> {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let rows = sqlx::query_as::<_, NotificationRow>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM shop.notification \
             WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Insert a notification on the given connection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user or order is gone.
    /// Returns `RepositoryError::Database` if the insert fails otherwise.
    pub async fn insert(
        conn: &mut PgConnection,
        new: &NewNotification,
    ) -> Result<Notification, RepositoryError> {
        let row = sqlx::query_as::<_, NotificationRow>(&format!(
            "INSERT INTO shop.notification (user_id, order_id, title, message, severity) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(new.user_id.as_i32())
        .bind(new.order_id.map(|id| id.as_i32()))
        .bind(&new.title)
        .bind(&new.message)
        .bind(new.severity)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| map_constraint_error(e, "notification refers to a missing user or order"))?;

        Ok(row.into())
    }

    /// Mark one of the user's notifications read. Marking twice is harmless.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the notification doesn't exist
    /// or belongs to someone else.
    pub async fn mark_read(
        &self,
        id: NotificationId,
        user_id: UserId,
    ) -> Result<Notification, RepositoryError> {
        let row = sqlx::query_as::<_, NotificationRow>(&format!(
            "UPDATE shop.notification SET is_read = TRUE \
             WHERE id = $1 AND user_id = $2 RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Mark all of a user's notifications read. Returns how many changed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn mark_all_read(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.notification SET is_read = TRUE WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id.as_i32())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
