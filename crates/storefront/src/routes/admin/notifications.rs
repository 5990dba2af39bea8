//! Admin notification handler.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use crate::error::AppError;
use crate::extract::ApiJson;
use crate::models::Notification;
use crate::services::notifications::{NotificationInput, NotificationService};
use crate::state::AppState;

/// Write a notification into a user's inbox.
///
/// POST /api/admin/notifications
#[instrument(skip(state, input), fields(user_id = %input.user_id))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NotificationInput>,
) -> Result<(StatusCode, Json<Notification>), AppError> {
    let notification = NotificationService::new(state.pool()).create(input).await?;
    Ok((StatusCode::CREATED, Json(notification)))
}
