//! Payment gateway.
//!
//! Checkout asks a [`PaymentGateway`] for an invoice. The only implementation
//! is [`SandboxGateway`], which mints invoice ids locally and points the
//! customer at the sandbox payment page; the sandbox later reports the result
//! through `POST /api/orders/payment-status`.

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use aneka_citra_core::{Cents, OrderId};

/// Errors raised by a payment gateway.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The gateway refused to issue an invoice.
    #[error("invoice rejected: {0}")]
    Rejected(String),
}

/// Status of a freshly issued invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Pending,
}

/// An invoice the customer can pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub invoice_id: String,
    pub payment_url: String,
    pub status: InvoiceStatus,
}

/// Something that can issue invoices for orders.
pub trait PaymentGateway: Send + Sync {
    /// Issue an invoice for `amount` on `order_id`.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError` if the gateway refuses.
    fn create_invoice(&self, order_id: OrderId, amount: Cents) -> Result<Invoice, PaymentError>;
}

/// Local stand-in for a hosted payment page.
#[derive(Debug, Clone)]
pub struct SandboxGateway {
    base_url: String,
}

impl SandboxGateway {
    /// Create a gateway that links invoices under `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl PaymentGateway for SandboxGateway {
    fn create_invoice(&self, order_id: OrderId, amount: Cents) -> Result<Invoice, PaymentError> {
        // Hosted payment pages cannot collect nothing.
        if amount == Cents::ZERO {
            tracing::warn!(order_id = %order_id, "Refusing invoice for zero amount");
            return Err(PaymentError::Rejected(format!(
                "order {order_id} has nothing to pay"
            )));
        }

        let invoice_id = format!("inv_{order_id}_{}", Utc::now().timestamp_millis());
        let payment_url = format!("{}/{invoice_id}", self.base_url);

        tracing::info!(
            order_id = %order_id,
            invoice_id = %invoice_id,
            amount = amount.as_i64(),
            "Sandbox invoice issued"
        );

        Ok(Invoice {
            invoice_id,
            payment_url,
            status: InvoiceStatus::Pending,
        })
    }
}
