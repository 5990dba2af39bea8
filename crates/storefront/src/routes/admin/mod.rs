//! Admin API route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /api/admin/products          - Product listing
//! POST   /api/admin/products          - Create product
//! PUT    /api/admin/products/{id}     - Replace product
//! DELETE /api/admin/products/{id}     - Delete product
//! GET    /api/admin/orders            - All orders with customer
//! PUT    /api/admin/orders/{id}       - Transition order status
//! DELETE /api/admin/orders/{id}       - Cancel order
//! POST   /api/admin/notifications     - Send notification
//!
//! # Super admin only
//! GET    /api/admin/admins            - List admins
//! POST   /api/admin/admins            - Create admin
//! POST   /api/admin/reset-data        - Delete all orders and notifications
//! ```
//!
//! The whole tree sits behind [`require_admin`], unknown paths included; the
//! super admin handlers additionally take
//! [`RequireSuperAdmin`](crate::middleware::RequireSuperAdmin).

pub mod admins;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod reset;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};

use crate::error::AppError;
use crate::middleware::require_admin;
use crate::state::AppState;

/// Unknown admin path. Only reached after the admin gate.
async fn not_found() -> AppError {
    AppError::NotFound("No such admin resource".to_string())
}

/// Create the admin routes router, gated on the `ADMIN` role.
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index).post(products::create))
        .route(
            "/products/{id}",
            put(products::update).delete(products::destroy),
        )
        .route("/orders", get(orders::index))
        .route("/orders/{id}", put(orders::update).delete(orders::cancel))
        .route("/notifications", post(notifications::create))
        .route("/admins", get(admins::index).post(admins::create))
        .route("/reset-data", post(reset::reset))
        .fallback(not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_admin,
        ))
}
