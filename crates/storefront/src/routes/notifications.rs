//! Customer notification route handlers.

use axum::{Json, extract::State};
use serde_json::{Value, json};
use tracing::instrument;

use aneka_citra_core::NotificationId;

use crate::error::AppError;
use crate::extract::ApiPath;
use crate::middleware::RequireAuth;
use crate::models::{Notification, NotificationList};
use crate::services::notifications::NotificationService;
use crate::state::AppState;

/// The signed-in user's inbox, newest first.
///
/// GET /api/notifications
#[instrument(skip(state, current), fields(user_id = %current.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<NotificationList>, AppError> {
    Ok(Json(
        NotificationService::new(state.pool())
            .list(current.id)
            .await?,
    ))
}

/// Mark one of the caller's notifications read. Repeating it is harmless.
///
/// PATCH /api/notifications/{id}/read
#[instrument(skip(state, current), fields(user_id = %current.id))]
pub async fn mark_read(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    ApiPath(id): ApiPath<NotificationId>,
) -> Result<Json<Notification>, AppError> {
    Ok(Json(
        NotificationService::new(state.pool())
            .mark_read(id, current.id)
            .await?,
    ))
}

/// Mark every notification of the caller read.
///
/// POST /api/notifications/read-all
#[instrument(skip(state, current), fields(user_id = %current.id))]
pub async fn mark_all_read(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<Value>, AppError> {
    let updated = NotificationService::new(state.pool())
        .mark_all_read(current.id)
        .await?;

    Ok(Json(json!({ "updated": updated })))
}
