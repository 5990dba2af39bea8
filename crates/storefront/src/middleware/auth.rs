//! Authentication middleware and extractors.
//!
//! The caller is identified by the session token in the `ac_session` cookie.
//! [`require_admin`] guards the whole `/api/admin` tree; handlers then pick
//! the caller up with one of the extractors below.

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::set_sentry_user;
use crate::middleware::session::session_token;
use crate::services::auth::CurrentUser;
use crate::state::AppState;

/// Error returned when the caller may not use a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No valid session, or not the required role.
    Unauthorized,
    /// Authenticated admin, but not on the super admin allow-list.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Not authenticated" })),
            )
                .into_response(),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": "Only super admins can access this resource" })),
            )
                .into_response(),
        }
    }
}

/// Resolve the caller from request parts.
///
/// Reuses the user [`require_admin`] already verified, otherwise verifies the
/// session cookie. Any verification failure means "no caller".
fn current_user(parts: &Parts, state: &AppState) -> Option<CurrentUser> {
    if let Some(user) = parts.extensions.get::<CurrentUser>() {
        return Some(user.clone());
    }
    let token = session_token(&parts.headers)?;
    state.tokens().verify(&token).ok()
}

/// Extractor that requires any signed-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        current_user(parts, state)
            .map(Self)
            .ok_or(AuthRejection::Unauthorized)
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is signed in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(current_user(parts, state)))
    }
}

/// Extractor that requires an admin.
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        current_user(parts, state)
            .filter(CurrentUser::is_admin)
            .map(Self)
            .ok_or(AuthRejection::Unauthorized)
    }
}

/// Extractor that requires a super admin.
///
/// Not signed in as an admin gives 401; an admin whose email is not in
/// `SUPER_ADMIN_EMAILS` gives 403.
///
/// # Example
///
/// ```rust,ignore
/// async fn super_admin_handler(
///     RequireSuperAdmin(admin): RequireSuperAdmin,
/// ) -> impl IntoResponse {
///     format!("Hello super admin {}!", admin.email)
/// }
/// ```
pub struct RequireSuperAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireSuperAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAdmin(admin) = RequireAdmin::from_request_parts(parts, state).await?;

        if !state.config().is_super_admin(&admin.email) {
            tracing::warn!(user_id = %admin.id, "Super admin route refused");
            return Err(AuthRejection::Forbidden);
        }

        Ok(Self(admin))
    }
}

/// Gate for the admin API.
///
/// Rejects with 401 unless the session token verifies and carries the
/// `ADMIN` role. On success the verified [`CurrentUser`] is stored in the
/// request extensions.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let user = session_token(request.headers())
        .and_then(|token| state.tokens().verify(&token).ok())
        .filter(CurrentUser::is_admin);

    let Some(user) = user else {
        return AuthRejection::Unauthorized.into_response();
    };

    set_sentry_user(&user.id, Some(user.email.as_str()));
    request.extensions_mut().insert(user);

    next.run(request).await
}
