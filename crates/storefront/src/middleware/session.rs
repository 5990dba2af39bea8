//! Session cookie handling.
//!
//! The session is a signed token (see [`crate::services::auth::tokens`])
//! stored in an http-only cookie. Nothing is kept server-side.

use axum::http::{HeaderMap, header};
use cookie::{Cookie, SameSite};

use crate::services::auth::tokens::SESSION_TTL_DAYS;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "ac_session";

/// Build the cookie that carries a freshly issued session token.
#[must_use]
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(cookie::time::Duration::days(SESSION_TTL_DAYS))
        .secure(secure)
        .build()
}

/// Build the cookie that clears the session on the client.
#[must_use]
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE_NAME, ""))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(secure)
        .build();
    cookie.make_removal();
    cookie
}

/// Pull the session token out of the request's `Cookie` headers.
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}
