//! Demo data reset (super admin only).

use axum::{Json, extract::State};
use tracing::instrument;

use crate::db::OrderRepository;
use crate::db::orders::ResetCounts;
use crate::error::AppError;
use crate::middleware::RequireSuperAdmin;
use crate::state::AppState;

/// Delete every notification, order line and order. Users and products stay.
///
/// POST /api/admin/reset-data
#[instrument(skip(state, admin), fields(user_id = %admin.id))]
pub async fn reset(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
) -> Result<Json<ResetCounts>, AppError> {
    let counts = OrderRepository::new(state.pool()).reset().await?;

    tracing::warn!(
        notifications = counts.notifications,
        order_items = counts.order_items,
        orders = counts.orders,
        "Demo data reset"
    );
    Ok(Json(counts))
}
