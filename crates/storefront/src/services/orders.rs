//! Order service.
//!
//! Checkout and status transitions. Each public operation is one database
//! transaction: a checkout either stores the order, its lines and its invoice
//! reference together or stores nothing, and a transition writes the status
//! and its customer notice together while holding the order's row lock.

use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use aneka_citra_core::lifecycle::{self, IllegalTransition, TransitionPlan};
use aneka_citra_core::pricing::{self, CartLine, PricingError};
use aneka_citra_core::{OrderId, OrderStatus, UserId};

use crate::db::notifications::NewNotification;
use crate::db::{NotificationRepository, OrderRepository, ProductRepository, RepositoryError};
use crate::models::{Notification, Order};
use crate::services::payments::{Invoice, PaymentError, PaymentGateway};

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The cart could not be priced.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The requested status may not follow the current one.
    #[error(transparent)]
    IllegalTransition(#[from] IllegalTransition),

    /// No such order.
    #[error("order {0} not found")]
    NotFound(OrderId),

    /// The payment gateway refused to issue an invoice.
    #[error("payment error: {0}")]
    Payment(#[from] PaymentError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for OrderError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// Result of a successful checkout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub order: Order,
    pub invoice: Invoice,
}

/// Result of a status transition.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionOutcome {
    pub order: Order,
    /// The notice sent to the customer; `None` when nothing changed.
    pub notification: Option<Notification>,
}

/// Order service.
pub struct OrderService<'a> {
    pool: &'a PgPool,
    payments: &'a dyn PaymentGateway,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, payments: &'a dyn PaymentGateway) -> Self {
        Self { pool, payments }
    }

    /// Place an order for `user_id`.
    ///
    /// Lines are priced from the catalog inside the transaction; the stored
    /// total is the sum of the line snapshots. No notification is sent.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Pricing` for an empty cart, a bad quantity, an
    /// unknown product or an overflowing total.
    /// Returns `OrderError::Payment` if no invoice could be issued; the order
    /// is not stored in that case.
    #[instrument(skip(self, lines), fields(user_id = %user_id, lines = lines.len()))]
    pub async fn place(&self, user_id: UserId, lines: &[CartLine]) -> Result<PlacedOrder, OrderError> {
        let merged = pricing::merge_lines(lines)?;
        let product_ids: Vec<_> = merged.iter().map(|(id, _)| *id).collect();

        let mut tx = self.pool.begin().await?;

        let mut catalog = ProductRepository::catalog_entries(&mut tx, &product_ids).await?;
        let priced = pricing::price_lines(&merged, |id| catalog.remove(&id))?;

        let mut order = OrderRepository::insert(&mut tx, user_id, &priced).await?;
        let invoice = self.payments.create_invoice(order.id, order.total)?;
        OrderRepository::set_invoice(&mut tx, order.id, &invoice.invoice_id, &invoice.payment_url)
            .await?;

        tx.commit().await?;

        order.invoice_id = Some(invoice.invoice_id.clone());
        order.payment_url = Some(invoice.payment_url.clone());

        tracing::info!(
            order_id = %order.id,
            total = order.total.as_i64(),
            invoice_id = %invoice.invoice_id,
            "Order placed"
        );

        Ok(PlacedOrder {
            order_id: order.id,
            order,
            invoice,
        })
    }

    /// Move an order to `requested`.
    ///
    /// Requesting the current status changes nothing and sends nothing.
    /// Requesting `PAID` stores `PROCESSING`, stamps `paid_at` and sends the
    /// payment notice.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order doesn't exist.
    /// Returns `OrderError::IllegalTransition` if the move is not allowed.
    #[instrument(skip(self), fields(order_id = %order_id, requested = %requested))]
    pub async fn transition(
        &self,
        order_id: OrderId,
        requested: OrderStatus,
    ) -> Result<TransitionOutcome, OrderError> {
        let mut tx = self.pool.begin().await?;

        let order = OrderRepository::lock(&mut tx, order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))?;

        let (status, notice, records_payment) = match lifecycle::plan_transition(order.status, requested)? {
            TransitionPlan::Unchanged => {
                tx.rollback().await?;
                tracing::debug!(status = %order.status, "Order already in requested status");
                return Ok(TransitionOutcome {
                    order,
                    notification: None,
                });
            }
            TransitionPlan::Move {
                status,
                notice,
                records_payment,
            } => (status, notice, records_payment),
        };

        OrderRepository::set_status(&mut tx, order_id, status, records_payment).await?;

        let notification = match lifecycle::notice_for(notice, order_id) {
            Some(notice) => Some(
                NotificationRepository::insert(
                    &mut tx,
                    &NewNotification {
                        user_id: order.user_id,
                        order_id: Some(order_id),
                        title: notice.title,
                        message: notice.message,
                        severity: notice.severity,
                    },
                )
                .await?,
            ),
            None => None,
        };

        let updated = OrderRepository::lock(&mut tx, order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))?;

        tx.commit().await?;

        tracing::info!(from = %order.status, to = %updated.status, "Order status changed");

        Ok(TransitionOutcome {
            order: updated,
            notification,
        })
    }

    /// Cancel an order. Same rules as any other transition.
    ///
    /// # Errors
    ///
    /// See [`transition`](Self::transition).
    pub async fn cancel(&self, order_id: OrderId) -> Result<TransitionOutcome, OrderError> {
        self.transition(order_id, OrderStatus::Cancelled).await
    }
}
