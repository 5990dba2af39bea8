//! Order repository for database operations.
//!
//! Reads go through the pool. Writes that belong to a larger unit of work
//! (checkout, status transitions) take a `&mut PgConnection` so the caller
//! can run them inside its own transaction.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgConnection, PgPool};

use aneka_citra_core::pricing::PricedOrder;
use aneka_citra_core::{Cents, Email, OrderId, OrderItemId, OrderStatus, ProductId, UserId};

use super::RepositoryError;
use crate::models::{AdminOrder, Order, OrderCustomer, OrderItem};

const ORDER_COLUMNS: &str =
    "id, user_id, total_cents, status, invoice_id, payment_url, paid_at, created_at, updated_at";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    total_cents: i64,
    status: OrderStatus,
    invoice_id: Option<String>,
    payment_url: Option<String>,
    paid_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, RepositoryError> {
        let total = Cents::new(self.total_cents).ok_or_else(|| {
            RepositoryError::DataCorruption(format!("negative total on order {}", self.id))
        })?;

        Ok(Order {
            id: OrderId::new(self.id),
            user_id: UserId::new(self.user_id),
            items,
            total,
            status: self.status,
            invoice_id: self.invoice_id,
            payment_url: self.payment_url,
            paid_at: self.paid_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Internal row type for order line queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    order_id: i32,
    product_id: i32,
    product_name: String,
    quantity: i32,
    price_cents: i64,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        let unit_price = Cents::new(row.price_cents).ok_or_else(|| {
            RepositoryError::DataCorruption(format!("negative price on order item {}", row.id))
        })?;

        Ok(Self {
            id: OrderItemId::new(row.id),
            product_id: ProductId::new(row.product_id),
            product_name: row.product_name,
            quantity: row.quantity,
            unit_price,
        })
    }
}

/// Internal row type for the admin order list.
#[derive(Debug, sqlx::FromRow)]
struct AdminOrderRow {
    #[sqlx(flatten)]
    order: OrderRow,
    customer_email: String,
    customer_name: Option<String>,
}

/// Rows removed by a demo reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetCounts {
    pub notifications: u64,
    pub order_items: u64,
    pub orders: u64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an order with its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.order WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(&mut *conn)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(attach_items(&mut conn, vec![row]).await?.into_iter().next())
    }

    /// Orders placed by one user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.order WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id.as_i32())
        .fetch_all(&mut *conn)
        .await?;

        attach_items(&mut conn, rows).await
    }

    /// Every order with its owner, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list_all(&self) -> Result<Vec<AdminOrder>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, AdminOrderRow>(
            r"
            SELECT o.id, o.user_id, o.total_cents, o.status, o.invoice_id, o.payment_url,
                   o.paid_at, o.created_at, o.updated_at,
                   u.email AS customer_email, u.name AS customer_name
            FROM shop.order o
            JOIN shop.user u ON u.id = o.user_id
            ORDER BY o.created_at DESC, o.id DESC
            ",
        )
        .fetch_all(&mut *conn)
        .await?;

        let mut customers = Vec::with_capacity(rows.len());
        let mut order_rows = Vec::with_capacity(rows.len());
        for row in rows {
            let email = Email::parse(&row.customer_email).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
            })?;
            customers.push(OrderCustomer {
                id: UserId::new(row.order.user_id),
                email,
                name: row.customer_name,
            });
            order_rows.push(row.order);
        }

        let orders = attach_items(&mut conn, order_rows).await?;
        Ok(orders
            .into_iter()
            .zip(customers)
            .map(|(order, customer)| AdminOrder { order, customer })
            .collect())
    }

    /// Insert a `PENDING` order and its line snapshots.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if an insert fails.
    pub async fn insert(
        conn: &mut PgConnection,
        user_id: UserId,
        priced: &PricedOrder,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO shop.order (user_id, total_cents, status) \
             VALUES ($1, $2, $3) RETURNING {ORDER_COLUMNS}"
        ))
        .bind(user_id.as_i32())
        .bind(priced.total.as_i64())
        .bind(OrderStatus::Pending)
        .fetch_one(&mut *conn)
        .await?;

        let mut items = Vec::with_capacity(priced.lines.len());
        for line in &priced.lines {
            let item = sqlx::query_as::<_, OrderItemRow>(
                r"
                INSERT INTO shop.order_item (order_id, product_id, product_name, quantity, price_cents)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, order_id, product_id, product_name, quantity, price_cents
                ",
            )
            .bind(row.id)
            .bind(line.product_id.as_i32())
            .bind(&line.product_name)
            .bind(line.quantity)
            .bind(line.unit_price.as_i64())
            .fetch_one(&mut *conn)
            .await?;
            items.push(item.try_into()?);
        }

        row.into_order(items)
    }

    /// Record the invoice issued for an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn set_invoice(
        conn: &mut PgConnection,
        id: OrderId,
        invoice_id: &str,
        payment_url: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.order
            SET invoice_id = $2, payment_url = $3, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .bind(invoice_id)
        .bind(payment_url)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Load an order and lock its row until the transaction ends.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lock(
        conn: &mut PgConnection,
        id: OrderId,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.order WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.as_i32())
        .fetch_optional(&mut *conn)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(attach_items(conn, vec![row]).await?.into_iter().next())
    }

    /// Whether the order exists, holding a share lock on the row until the
    /// caller's transaction ends.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lock_shared(conn: &mut PgConnection, id: OrderId) -> Result<bool, RepositoryError> {
        let found =
            sqlx::query_scalar::<_, i32>("SELECT id FROM shop.order WHERE id = $1 FOR SHARE")
                .bind(id.as_i32())
                .fetch_optional(&mut *conn)
                .await?;
        Ok(found.is_some())
    }

    /// Store a new status. `paid` also stamps `paid_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn set_status(
        conn: &mut PgConnection,
        id: OrderId,
        status: OrderStatus,
        paid: bool,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.order
            SET status = $2,
                paid_at = CASE WHEN $3 THEN NOW() ELSE paid_at END,
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .bind(status)
        .bind(paid)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete every notification, order line and order.
    ///
    /// Users and products are kept.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a delete fails; nothing is
    /// removed in that case.
    pub async fn reset(&self) -> Result<ResetCounts, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let notifications = sqlx::query("DELETE FROM shop.notification")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let order_items = sqlx::query("DELETE FROM shop.order_item")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let orders = sqlx::query("DELETE FROM shop.order")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        Ok(ResetCounts {
            notifications,
            order_items,
            orders,
        })
    }
}

/// Load the lines of `rows` and build the orders, keeping row order.
async fn attach_items(
    conn: &mut PgConnection,
    rows: Vec<OrderRow>,
) -> Result<Vec<Order>, RepositoryError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
    let item_rows = sqlx::query_as::<_, OrderItemRow>(
        r"
        SELECT id, order_id, product_id, product_name, quantity, price_cents
        FROM shop.order_item
        WHERE order_id = ANY($1)
        ORDER BY id
        ",
    )
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await?;

    let mut by_order: HashMap<i32, Vec<OrderItem>> = HashMap::new();
    for item in item_rows {
        let order_id = item.order_id;
        by_order.entry(order_id).or_default().push(item.try_into()?);
    }

    rows.into_iter()
        .map(|row| {
            let items = by_order.remove(&row.id).unwrap_or_default();
            row.into_order(items)
        })
        .collect()
}
