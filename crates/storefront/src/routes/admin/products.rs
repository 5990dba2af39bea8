//! Admin catalog handlers.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use aneka_citra_core::ProductId;
use aneka_citra_core::catalog::ProductDraft;

use crate::db::{ProductRepository, RepositoryError};
use crate::error::AppError;
use crate::extract::{ApiJson, ApiPath};
use crate::models::Product;
use crate::state::AppState;

/// All products, newest first.
///
/// GET /api/admin/products
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(ProductRepository::new(state.pool()).list().await?))
}

/// Create a product.
///
/// POST /api/admin/products
#[instrument(skip(state, draft))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<ProductDraft>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let product = draft.validate()?;
    let created = ProductRepository::new(state.pool()).create(&product).await?;

    tracing::info!(product_id = %created.id, name = %created.name, "Product created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace every field of a product.
///
/// PUT /api/admin/products/{id}
#[instrument(skip(state, draft))]
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(draft): ApiJson<ProductDraft>,
) -> Result<Json<Product>, AppError> {
    let product = draft.validate()?;
    let updated = ProductRepository::new(state.pool())
        .update(id, &product)
        .await
        .map_err(|e| not_found_as(e, id))?;

    tracing::info!(product_id = %id, "Product updated");
    Ok(Json(updated))
}

/// Delete a product that no order references.
///
/// DELETE /api/admin/products/{id}
#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<StatusCode, AppError> {
    ProductRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(|e| not_found_as(e, id))?;

    tracing::info!(product_id = %id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn not_found_as(e: RepositoryError, id: ProductId) -> AppError {
    match e {
        RepositoryError::NotFound => AppError::NotFound(format!("Product {id} not found")),
        other => other.into(),
    }
}
