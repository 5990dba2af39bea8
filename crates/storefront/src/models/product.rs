//! Catalog product.

use chrono::{DateTime, Utc};
use serde::Serialize;

use aneka_citra_core::{Cents, ProductId, Specifications};

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    #[serde(rename = "priceCents")]
    pub price: Cents,
    pub stock: i32,
    pub description: String,
    pub specifications: Specifications,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
