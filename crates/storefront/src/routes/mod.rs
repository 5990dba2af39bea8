//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                        - Liveness
//! GET    /health/ready                  - Readiness (database ping)
//!
//! # Auth (rate limited: register, login)
//! POST   /api/auth/register             - Create account (+ session unless a super admin registers)
//! POST   /api/auth/login                - Sign in + session
//! POST   /api/auth/logout               - Clear session cookie
//! GET    /api/auth/me                   - Current user
//!
//! # Catalog
//! GET    /api/products                  - Product listing
//! GET    /api/products/{id}             - Product detail
//!
//! # Orders (signed in)
//! POST   /api/orders                    - Place order, issue invoice
//! GET    /api/orders                    - Own orders
//! POST   /api/orders/payment-status     - Payment simulator callback (x-callback-token)
//!
//! # Notifications (signed in)
//! GET    /api/notifications             - Own inbox + unread count
//! PATCH  /api/notifications/{id}/read   - Mark one read
//! POST   /api/notifications/read-all    - Mark all read
//!
//! # Admin (ADMIN role, see `admin`)
//! /api/admin/...
//! ```

pub mod admin;
pub mod auth;
pub mod health;
pub mod notifications;
pub mod orders;
pub mod products;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, patch, post},
};
use tower_http::trace::TraceLayer;

use crate::middleware::{auth_rate_limiter, request_id_middleware, security_headers_middleware};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes(state: &AppState) -> Router<AppState> {
    let credentials = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(auth_rate_limiter(&state.config().rate_limit));

    Router::new()
        .merge(credentials)
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route("/payment-status", post(orders::payment_status))
}

/// Create the notification routes router.
pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(notifications::index))
        .route("/{id}/read", patch(notifications::mark_read))
        .route("/read-all", post(notifications::mark_all_read))
}

/// Create all API routes.
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/auth", auth_routes(state))
        .nest("/api/products", product_routes())
        .nest("/api/orders", order_routes())
        .nest("/api/notifications", notification_routes())
        .nest("/api/admin", admin::routes(state))
}

/// Build the application with its middleware stack.
///
/// Sentry layers are added by the binary, outside this router.
pub fn app(state: AppState) -> Router {
    routes(&state)
        .layer(axum_middleware::from_fn(security_headers_middleware))
        .layer(axum_middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
