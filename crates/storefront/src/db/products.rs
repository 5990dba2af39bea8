//! Product repository for database operations.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use aneka_citra_core::catalog::ValidProduct;
use aneka_citra_core::pricing::CatalogEntry;
use aneka_citra_core::{Cents, ProductId, Specifications};

use super::{RepositoryError, map_constraint_error};
use crate::models::Product;

const PRODUCT_COLUMNS: &str = "id, name, brand, price_cents, stock, description, \
                               specifications, image_url, created_at, updated_at";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    brand: String,
    price_cents: i64,
    stock: i32,
    description: String,
    specifications: Option<String>,
    image_url: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Cents::new(row.price_cents).ok_or_else(|| {
            RepositoryError::DataCorruption(format!(
                "negative price on product {}: {}",
                row.id, row.price_cents
            ))
        })?;
        let specifications = Specifications::from_stored(row.specifications.as_deref())
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("product {}: {e}", row.id))
            })?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            brand: row.brand,
            price,
            stock: row.stock,
            description: row.description,
            specifications,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Internal row type for checkout price lookups.
#[derive(Debug, sqlx::FromRow)]
struct PriceRow {
    id: i32,
    name: String,
    price_cents: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Insert a validated product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, product: &ValidProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            INSERT INTO shop.product
                (name, brand, price_cents, stock, description, specifications, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&product.name)
        .bind(&product.brand)
        .bind(product.price.as_i64())
        .bind(product.stock)
        .bind(&product.description)
        .bind(product.specifications.to_stored())
        .bind(&product.image_url)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Replace every editable field of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ProductId,
        product: &ValidProduct,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            UPDATE shop.product
            SET name = $2, brand = $3, price_cents = $4, stock = $5,
                description = $6, specifications = $7, image_url = $8,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id.as_i32())
        .bind(&product.name)
        .bind(&product.brand)
        .bind(product.price.as_i64())
        .bind(product.stock)
        .bind(&product.description)
        .bind(product.specifications.to_stored())
        .bind(&product.image_url)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Conflict` if an order line still references it.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.product WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await
            .map_err(|e| map_constraint_error(e, "product is referenced by existing orders"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Number of products in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop.product")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Current name and price of each requested product, read inside the
    /// checkout transaction. Missing products are absent from the map.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored price is negative.
    pub async fn catalog_entries(
        conn: &mut PgConnection,
        ids: &[ProductId],
    ) -> Result<HashMap<ProductId, CatalogEntry>, RepositoryError> {
        let raw_ids: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
        let rows = sqlx::query_as::<_, PriceRow>(
            "SELECT id, name, price_cents FROM shop.product WHERE id = ANY($1)",
        )
        .bind(&raw_ids)
        .fetch_all(&mut *conn)
        .await?;

        rows.into_iter()
            .map(|row| {
                let price = Cents::new(row.price_cents).ok_or_else(|| {
                    RepositoryError::DataCorruption(format!("negative price on product {}", row.id))
                })?;
                Ok((
                    ProductId::new(row.id),
                    CatalogEntry {
                        name: row.name,
                        price,
                    },
                ))
            })
            .collect()
    }
}
