//! Order pricing.
//!
//! Turns a submitted cart into priced line snapshots. Prices always come from
//! the catalog at the moment of checkout; whatever the client believes an item
//! costs is ignored.

use serde::{Deserialize, Serialize};

use crate::types::{Cents, ProductId};

/// One cart line as submitted by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Catalog data needed to price a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub price: Cents,
}

/// A line with its unit price frozen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Cents,
}

/// Priced lines plus their total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedOrder {
    pub lines: Vec<PricedLine>,
    pub total: Cents,
}

/// Reasons a cart cannot be priced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error("order must contain at least one item")]
    EmptyCart,

    #[error("quantity for product {0} must be at least 1")]
    InvalidQuantity(ProductId),

    #[error("product {0} not found")]
    UnknownProduct(ProductId),

    #[error("order total is too large")]
    Overflow,
}

/// Validate quantities and merge repeated products.
///
/// Lines for the same product are summed into one, keeping the position of
/// the first occurrence.
///
/// # Errors
///
/// `EmptyCart` for no lines, `InvalidQuantity` for a quantity below one and
/// `Overflow` when a merged quantity no longer fits the stored column.
pub fn merge_lines(lines: &[CartLine]) -> Result<Vec<(ProductId, i32)>, PricingError> {
    if lines.is_empty() {
        return Err(PricingError::EmptyCart);
    }

    let mut merged: Vec<(ProductId, i32)> = Vec::with_capacity(lines.len());
    for line in lines {
        let quantity = i32::try_from(line.quantity).map_err(|_| {
            if line.quantity < 1 {
                PricingError::InvalidQuantity(line.product_id)
            } else {
                PricingError::Overflow
            }
        })?;
        if quantity < 1 {
            return Err(PricingError::InvalidQuantity(line.product_id));
        }

        match merged.iter_mut().find(|(id, _)| *id == line.product_id) {
            Some((_, existing)) => {
                *existing = existing.checked_add(quantity).ok_or(PricingError::Overflow)?;
            }
            None => merged.push((line.product_id, quantity)),
        }
    }
    Ok(merged)
}

/// Price merged lines against the catalog.
///
/// `lookup` returns the current catalog entry for a product, or `None` if it
/// does not exist.
///
/// # Errors
///
/// `UnknownProduct` for the first missing product, `Overflow` if a line total
/// or the order total overflows.
pub fn price_lines<F>(lines: &[(ProductId, i32)], mut lookup: F) -> Result<PricedOrder, PricingError>
where
    F: FnMut(ProductId) -> Option<CatalogEntry>,
{
    if lines.is_empty() {
        return Err(PricingError::EmptyCart);
    }

    let mut total = Cents::ZERO;
    let mut priced = Vec::with_capacity(lines.len());
    for &(product_id, quantity) in lines {
        let entry = lookup(product_id).ok_or(PricingError::UnknownProduct(product_id))?;
        let multiplier = u32::try_from(quantity).map_err(|_| PricingError::InvalidQuantity(product_id))?;
        let line_total = entry
            .price
            .checked_mul(multiplier)
            .ok_or(PricingError::Overflow)?;
        total = total.checked_add(line_total).ok_or(PricingError::Overflow)?;
        priced.push(PricedLine {
            product_id,
            product_name: entry.name,
            quantity,
            unit_price: entry.price,
        });
    }

    Ok(PricedOrder {
        lines: priced,
        total,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn line(product: i32, quantity: i64) -> CartLine {
        CartLine {
            product_id: ProductId::new(product),
            quantity,
        }
    }

    fn catalog() -> HashMap<ProductId, CatalogEntry> {
        HashMap::from([
            (
                ProductId::new(1),
                CatalogEntry {
                    name: "Canon PIXMA G1020".to_owned(),
                    price: Cents::new(2_250_000).unwrap(),
                },
            ),
            (
                ProductId::new(2),
                CatalogEntry {
                    name: "Epson L3110".to_owned(),
                    price: Cents::new(2_100_000).unwrap(),
                },
            ),
        ])
    }

    #[test]
    fn test_single_line_total() {
        let merged = merge_lines(&[line(1, 2)]).unwrap();
        let catalog = catalog();
        let order = price_lines(&merged, |id| catalog.get(&id).cloned()).unwrap();

        assert_eq!(order.total.as_i64(), 4_500_000);
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines[0].quantity, 2);
        assert_eq!(order.lines[0].unit_price.as_i64(), 2_250_000);
        assert_eq!(order.lines[0].product_name, "Canon PIXMA G1020");
    }

    #[test]
    fn test_total_is_sum_of_lines() {
        let merged = merge_lines(&[line(1, 1), line(2, 3)]).unwrap();
        let catalog = catalog();
        let order = price_lines(&merged, |id| catalog.get(&id).cloned()).unwrap();

        let expected: i64 = order
            .lines
            .iter()
            .map(|l| l.unit_price.as_i64() * i64::from(l.quantity))
            .sum();
        assert_eq!(order.total.as_i64(), expected);
        assert_eq!(expected, 2_250_000 + 3 * 2_100_000);
    }

    #[test]
    fn test_merges_duplicate_products_in_first_seen_order() {
        let merged = merge_lines(&[line(2, 1), line(1, 1), line(2, 4)]).unwrap();
        assert_eq!(merged, vec![(ProductId::new(2), 5), (ProductId::new(1), 1)]);
    }

    #[test]
    fn test_rejects_empty_cart_and_bad_quantities() {
        assert_eq!(merge_lines(&[]), Err(PricingError::EmptyCart));
        assert_eq!(
            merge_lines(&[line(1, 0)]),
            Err(PricingError::InvalidQuantity(ProductId::new(1)))
        );
        assert_eq!(
            merge_lines(&[line(3, -2)]),
            Err(PricingError::InvalidQuantity(ProductId::new(3)))
        );
        assert_eq!(
            merge_lines(&[line(1, i64::MAX)]),
            Err(PricingError::Overflow)
        );
    }

    #[test]
    fn test_unknown_product() {
        let merged = merge_lines(&[line(1, 1), line(99, 1)]).unwrap();
        let catalog = catalog();
        assert_eq!(
            price_lines(&merged, |id| catalog.get(&id).cloned()),
            Err(PricingError::UnknownProduct(ProductId::new(99)))
        );
    }

    #[test]
    fn test_total_overflow() {
        let merged = merge_lines(&[line(1, i64::from(i32::MAX))]).unwrap();
        let result = price_lines(&merged, |_| {
            Some(CatalogEntry {
                name: "Gold plated".to_owned(),
                price: Cents::new(i64::MAX / 2).unwrap(),
            })
        });
        assert_eq!(result, Err(PricingError::Overflow));
    }
}
