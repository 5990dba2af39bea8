//! Order domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use aneka_citra_core::{Cents, Email, OrderId, OrderItemId, OrderStatus, ProductId, UserId};

/// A placed order with its line snapshots.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    /// Sum of the line totals at checkout; never recomputed.
    #[serde(rename = "totalCents")]
    pub total: Cents,
    #[serde(rename = "paymentStatus")]
    pub status: OrderStatus,
    /// Invoice issued by the payment gateway.
    pub invoice_id: Option<String>,
    /// Where the customer pays the invoice.
    pub payment_url: Option<String>,
    /// When the payment was confirmed.
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One immutable order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    /// Product name at checkout.
    pub product_name: String,
    pub quantity: i32,
    /// Unit price at checkout.
    #[serde(rename = "priceCents")]
    pub unit_price: Cents,
}

/// The customer an order belongs to, as shown in the admin order list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCustomer {
    pub id: UserId,
    pub email: Email,
    pub name: Option<String>,
}

/// An order together with its owner.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrder {
    #[serde(flatten)]
    pub order: Order,
    pub customer: OrderCustomer,
}
