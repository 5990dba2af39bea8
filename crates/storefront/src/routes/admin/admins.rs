//! Admin account management (super admin only).

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::instrument;

use crate::error::AppError;
use crate::extract::ApiJson;
use crate::middleware::RequireSuperAdmin;
use crate::models::User;
use crate::services::auth::{AuthService, Registration};
use crate::state::AppState;

/// New admin account.
#[derive(Debug, Deserialize)]
pub struct CreateAdminRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// All admin accounts, newest first.
///
/// GET /api/admin/admins
#[instrument(skip(state, admin), fields(user_id = %admin.id))]
pub async fn index(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(AuthService::new(state.pool()).list_admins().await?))
}

/// Create an admin account.
///
/// POST /api/admin/admins
#[instrument(skip(state, admin, request), fields(user_id = %admin.id, email = %request.email))]
pub async fn create(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateAdminRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = AuthService::new(state.pool())
        .create_admin(Registration {
            email: &request.email,
            password: &request.password,
            name: request.name.as_deref(),
        })
        .await?;

    tracing::info!(created_by = %admin.id, admin_id = %user.id, "Admin account created");
    Ok((StatusCode::CREATED, Json(user)))
}
