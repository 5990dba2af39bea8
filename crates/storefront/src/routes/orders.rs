//! Customer order route handlers and the payment callback.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::instrument;

use aneka_citra_core::pricing::CartLine;
use aneka_citra_core::{OrderId, OrderStatus};

use crate::db::OrderRepository;
use crate::error::AppError;
use crate::extract::ApiJson;
use crate::middleware::RequireAuth;
use crate::models::Order;
use crate::services::orders::{OrderService, PlacedOrder, TransitionOutcome};
use crate::state::AppState;

/// Header the payment simulator must echo back.
pub const CALLBACK_TOKEN_HEADER: &str = "x-callback-token";

/// Checkout request.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<CartLine>,
}

/// Payment simulator callback.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusRequest {
    pub order_id: OrderId,
    pub payment_status: OrderStatus,
}

/// Place an order for the signed-in user.
///
/// POST /api/orders
#[instrument(skip(state, current, request), fields(user_id = %current.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    ApiJson(request): ApiJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<PlacedOrder>), AppError> {
    let placed = OrderService::new(state.pool(), state.payments())
        .place(current.id, &request.items)
        .await?;

    Ok((StatusCode::CREATED, Json(placed)))
}

/// The signed-in user's orders, newest first.
///
/// GET /api/orders
#[instrument(skip(state, current), fields(user_id = %current.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(
        OrderRepository::new(state.pool())
            .list_for_user(current.id)
            .await?,
    ))
}

fn callback_token_matches(headers: &HeaderMap, expected: &str) -> bool {
    headers
        .get(CALLBACK_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|token| !expected.is_empty() && token == expected)
}

/// Payment result reported by the sandbox.
///
/// POST /api/orders/payment-status
#[instrument(skip(state, headers, request), fields(order_id = %request.order_id, status = %request.payment_status))]
pub async fn payment_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<PaymentStatusRequest>,
) -> Result<Json<TransitionOutcome>, AppError> {
    let expected = state.config().payment.callback_token.expose_secret();
    if !callback_token_matches(&headers, expected) {
        tracing::warn!("Payment callback with missing or wrong token");
        return Err(AppError::Unauthorized("Invalid callback token".to_string()));
    }

    let outcome = OrderService::new(state.pool(), state.payments())
        .transition(request.order_id, request.payment_status)
        .await?;

    Ok(Json(outcome))
}
