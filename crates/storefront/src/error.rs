//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`, and every error body is `{"error": "<message>"}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use aneka_citra_core::catalog::FieldError;
use aneka_citra_core::pricing::PricingError;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::notifications::NotificationError;
use crate::services::orders::OrderError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Order operation failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Notification operation failed.
    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),

    /// A product field failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] FieldError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// HTTP status and client-facing message.
    ///
    /// Server-side failures never leak their details.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Database(err) => repository_response(err),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, "Invalid email or password".to_string())
                }
                AuthError::UserNotFound | AuthError::InvalidToken => {
                    (StatusCode::UNAUTHORIZED, "Not authenticated".to_string())
                }
                AuthError::UserAlreadyExists => (
                    StatusCode::CONFLICT,
                    "An account with this email already exists".to_string(),
                ),
                AuthError::WeakPassword(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                AuthError::InvalidEmail(e) => {
                    (StatusCode::BAD_REQUEST, format!("Invalid email address: {e}"))
                }
                AuthError::RoleNotAllowed(_) => (
                    StatusCode::FORBIDDEN,
                    "Only super admins can register admin accounts".to_string(),
                ),
                AuthError::Repository(err) => repository_response(err),
                AuthError::TokenSigning(_) | AuthError::PasswordHash => internal(),
            },
            Self::Order(err) => match err {
                OrderError::Pricing(e @ PricingError::UnknownProduct(_)) => {
                    (StatusCode::NOT_FOUND, e.to_string())
                }
                OrderError::Pricing(e) => (StatusCode::BAD_REQUEST, e.to_string()),
                OrderError::IllegalTransition(e) => (StatusCode::CONFLICT, e.to_string()),
                OrderError::NotFound(id) => (StatusCode::NOT_FOUND, format!("Order {id} not found")),
                OrderError::Payment(_) => (
                    StatusCode::BAD_GATEWAY,
                    "Payment gateway error".to_string(),
                ),
                OrderError::Repository(err) => repository_response(err),
            },
            Self::Notification(err) => match err {
                NotificationError::Invalid(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                NotificationError::Repository(err) => repository_response(err),
            },
            Self::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        }
    }
}

fn repository_response(err: &RepositoryError) -> (StatusCode, String) {
    match err {
        RepositoryError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
        RepositoryError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => internal(),
    }
}

fn internal() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the authenticated caller.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
