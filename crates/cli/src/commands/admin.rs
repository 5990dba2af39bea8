//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! ac-cli admin create -e staff@anekacitra.com -n "Staff" -p "a-long-password"
//! ```
//!
//! Creating an admin here does not make it a super admin; that is decided by
//! `SUPER_ADMIN_EMAILS` in the storefront's environment.

use thiserror::Error;

use aneka_citra_core::UserId;
use aneka_citra_storefront::services::auth::{AuthError, AuthService, Registration};

use super::{ConnectError, connect};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Account could not be created.
    #[error("{0}")]
    Auth(#[from] AuthError),
}

/// Create a new admin user.
///
/// # Arguments
///
/// * `email` - Admin's email address
/// * `name` - Admin's display name
/// * `password` - Initial password
///
/// # Returns
///
/// The ID of the created admin user.
///
/// # Errors
///
/// Returns `AdminError::Auth` for an invalid email, a short password or an
/// email that is already registered.
pub async fn create_user(
    email: &str,
    name: Option<&str>,
    password: &str,
) -> Result<UserId, AdminError> {
    let pool = connect().await?;

    tracing::info!("Creating admin user: {email}");

    let user = AuthService::new(&pool)
        .create_admin(Registration {
            email,
            password,
            name,
        })
        .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(user.id)
}
