//! Account and session route handlers.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use aneka_citra_core::Role;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::extract::ApiJson;
use crate::middleware::{OptionalAuth, RequireAuth, removal_cookie, session_cookie};
use crate::models::User;
use crate::services::auth::{AuthService, CurrentUser, Registrar, Registration};
use crate::state::AppState;

/// Registration form.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Defaults to `CUSTOMER`; only a super admin may ask for `ADMIN`.
    #[serde(default)]
    pub role: Option<Role>,
}

/// Login form.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body returned with a new session.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: User,
}

/// Body returned by `GET /api/auth/me`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user: User,
    pub is_super_admin: bool,
}

/// Issue a session for `user` and build the response carrying its cookie.
fn session_response(state: &AppState, user: User, status: StatusCode) -> Result<Response, AppError> {
    let token = state.tokens().issue(&user)?;
    let cookie = session_cookie(token, state.config().secure_cookies());
    set_sentry_user(&user.id, Some(user.email.as_str()));

    Ok((
        status,
        [(header::SET_COOKIE, cookie.to_string())],
        Json(SessionResponse { user }),
    )
        .into_response())
}

/// Whether `caller` may set the role of a new account.
fn registrar_for(state: &AppState, caller: Option<&CurrentUser>) -> Registrar {
    match caller {
        Some(user) if user.is_admin() && state.config().is_super_admin(&user.email) => {
            Registrar::SuperAdmin
        }
        _ => Registrar::Public,
    }
}

/// Register an account.
///
/// A visitor gets a customer account and is signed in to it. A super admin
/// may pick the role and keeps their own session.
///
/// POST /api/auth/register
#[instrument(skip(state, caller, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    OptionalAuth(caller): OptionalAuth,
    ApiJson(form): ApiJson<RegisterRequest>,
) -> Result<Response, AppError> {
    let registrar = registrar_for(&state, caller.as_ref());
    let user = AuthService::new(state.pool())
        .register(
            Registration {
                email: &form.email,
                password: &form.password,
                name: form.name.as_deref(),
            },
            form.role,
            registrar,
        )
        .await?;

    match registrar {
        Registrar::SuperAdmin => {
            tracing::info!(
                user_id = %user.id,
                role = %user.role,
                "Account registered by super admin"
            );
            Ok((StatusCode::CREATED, Json(SessionResponse { user })).into_response())
        }
        Registrar::Public => session_response(&state, user, StatusCode::CREATED),
    }
}

/// Sign in with email and password.
///
/// POST /api/auth/login
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<LoginRequest>,
) -> Result<Response, AppError> {
    let user = AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await?;

    tracing::info!(user_id = %user.id, "User logged in");
    session_response(&state, user, StatusCode::OK)
}

/// Clear the session cookie.
///
/// POST /api/auth/logout
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    clear_sentry_user();
    let cookie = removal_cookie(state.config().secure_cookies());

    (
        [(header::SET_COOKIE, cookie.to_string())],
        Json(json!({ "success": true })),
    )
}

/// The signed-in user.
///
/// GET /api/auth/me
#[instrument(skip(state, current), fields(user_id = %current.id))]
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<MeResponse>, AppError> {
    let user = AuthService::new(state.pool()).get_user(current.id).await?;
    let is_super_admin =
        user.role == Role::Admin && state.config().is_super_admin(&user.email);

    Ok(Json(MeResponse {
        user,
        is_super_admin,
    }))
}
