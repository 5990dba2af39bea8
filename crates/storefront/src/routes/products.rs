//! Public catalog route handlers.

use axum::{Json, extract::State};
use tracing::instrument;

use aneka_citra_core::ProductId;

use crate::db::ProductRepository;
use crate::error::AppError;
use crate::extract::ApiPath;
use crate::models::Product;
use crate::state::AppState;

/// All products, newest first.
///
/// GET /api/products
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(ProductRepository::new(state.pool()).list().await?))
}

/// One product.
///
/// GET /api/products/{id}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<Product>, AppError> {
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Product {id} not found")))
}
