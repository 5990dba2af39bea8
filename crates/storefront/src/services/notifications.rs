//! Notification service.

use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;

use aneka_citra_core::{NotificationId, OrderId, Severity, UserId};

use crate::db::notifications::NewNotification;
use crate::db::{NotificationRepository, OrderRepository, RepositoryError, UserRepository};
use crate::models::{Notification, NotificationList};

/// Errors that can occur during notification operations.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The request is missing a field or names something that doesn't exist.
    #[error("{0}")]
    Invalid(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for NotificationError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// A foreign-key violation on insert means the recipient or order vanished.
fn missing_reference(err: RepositoryError) -> NotificationError {
    match err {
        RepositoryError::Conflict(msg) => NotificationError::Invalid(msg),
        other => NotificationError::Repository(other),
    }
}

/// A notification written by an admin.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationInput {
    pub user_id: UserId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, alias = "type")]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub order_id: Option<OrderId>,
}

/// Notification service.
pub struct NotificationService<'a> {
    pool: &'a PgPool,
}

impl<'a> NotificationService<'a> {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's inbox, newest first, with its unread count.
    ///
    /// # Errors
    ///
    /// Returns `NotificationError::Repository` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<NotificationList, NotificationError> {
        let notifications = NotificationRepository::new(self.pool)
            .list_for_user(user_id)
            .await?;
        Ok(NotificationList::new(notifications))
    }

    /// Write a notification into a user's inbox.
    ///
    /// # Errors
    ///
    /// Returns `NotificationError::Invalid` if the title or message is blank,
    /// or the user or order does not exist.
    pub async fn create(&self, input: NotificationInput) -> Result<Notification, NotificationError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(NotificationError::Invalid("title is required".to_string()));
        }
        let message = input.message.trim();
        if message.is_empty() {
            return Err(NotificationError::Invalid("message is required".to_string()));
        }

        let new = NewNotification {
            user_id: input.user_id,
            order_id: input.order_id,
            title: title.to_string(),
            message: message.to_string(),
            severity: input.severity.unwrap_or_default(),
        };

        // The share locks keep the user and order from being deleted between
        // the check and the insert.
        let mut tx = self.pool.begin().await?;

        if !UserRepository::lock_shared(&mut tx, new.user_id).await? {
            return Err(NotificationError::Invalid(format!(
                "user {} not found",
                new.user_id
            )));
        }
        if let Some(order_id) = new.order_id
            && !OrderRepository::lock_shared(&mut tx, order_id).await?
        {
            return Err(NotificationError::Invalid(format!(
                "order {order_id} not found"
            )));
        }

        let notification = NotificationRepository::insert(&mut tx, &new)
            .await
            .map_err(missing_reference)?;

        tx.commit().await?;

        tracing::info!(
            notification_id = %notification.id,
            user_id = %notification.user_id,
            "Notification created"
        );
        Ok(notification)
    }

    /// Mark one of the caller's notifications read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` (wrapped) if it isn't theirs.
    pub async fn mark_read(
        &self,
        id: NotificationId,
        user_id: UserId,
    ) -> Result<Notification, NotificationError> {
        Ok(NotificationRepository::new(self.pool)
            .mark_read(id, user_id)
            .await?)
    }

    /// Mark all of the caller's notifications read.
    ///
    /// # Errors
    ///
    /// Returns `NotificationError::Repository` if the update fails.
    pub async fn mark_all_read(&self, user_id: UserId) -> Result<u64, NotificationError> {
        Ok(NotificationRepository::new(self.pool)
            .mark_all_read(user_id)
            .await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_reference_is_invalid() {
        let err = missing_reference(RepositoryError::Conflict(
            "notification refers to a missing user or order".to_string(),
        ));
        assert!(
            matches!(err, NotificationError::Invalid(ref msg) if msg.contains("missing user"))
        );

        let err = missing_reference(RepositoryError::NotFound);
        assert!(matches!(
            err,
            NotificationError::Repository(RepositoryError::NotFound)
        ));
    }

    #[test]
    fn test_input_defaults_severity_to_none() {
        let input: NotificationInput =
            serde_json::from_str(r#"{"userId": 3, "title": "Promo", "message": "Diskon 10%"}"#)
                .unwrap();
        assert_eq!(input.severity, None);
        assert_eq!(input.severity.unwrap_or_default(), Severity::Info);
        assert_eq!(input.order_id, None);
    }

    #[test]
    fn test_input_accepts_type_alias() {
        let input: NotificationInput = serde_json::from_str(
            r#"{"userId": 3, "title": "t", "message": "m", "type": "WARNING", "orderId": 9}"#,
        )
        .unwrap();
        assert_eq!(input.severity, Some(Severity::Warning));
        assert_eq!(input.order_id, Some(OrderId::new(9)));
    }
}
