//! Admin order handlers.

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::instrument;

use aneka_citra_core::{OrderId, OrderStatus};

use crate::db::OrderRepository;
use crate::error::AppError;
use crate::extract::{ApiJson, ApiPath};
use crate::models::AdminOrder;
use crate::services::orders::{OrderService, TransitionOutcome};
use crate::state::AppState;

/// Status change requested by an admin.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub payment_status: OrderStatus,
}

/// Every order with its customer, newest first.
///
/// GET /api/admin/orders
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<AdminOrder>>, AppError> {
    Ok(Json(OrderRepository::new(state.pool()).list_all().await?))
}

/// Move an order to a new status.
///
/// PUT /api/admin/orders/{id}
#[instrument(skip(state, request), fields(requested = %request.payment_status))]
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<OrderId>,
    ApiJson(request): ApiJson<UpdateOrderRequest>,
) -> Result<Json<TransitionOutcome>, AppError> {
    let outcome = OrderService::new(state.pool(), state.payments())
        .transition(id, request.payment_status)
        .await?;

    Ok(Json(outcome))
}

/// Cancel an order.
///
/// DELETE /api/admin/orders/{id}
#[instrument(skip(state))]
pub async fn cancel(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<Json<TransitionOutcome>, AppError> {
    let outcome = OrderService::new(state.pool(), state.payments())
        .cancel(id)
        .await?;

    Ok(Json(outcome))
}
