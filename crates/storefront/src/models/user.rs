//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use aneka_citra_core::{Email, Role, UserId};

/// A storefront account (customer or admin).
///
/// Never carries the password hash; that is only read by the credential
/// lookup in [`crate::db::users`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Normalized login email.
    pub email: Email,
    /// Display name, if the user gave one.
    pub name: Option<String>,
    /// Customer or admin.
    pub role: Role,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
