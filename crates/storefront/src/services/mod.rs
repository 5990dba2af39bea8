//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Password accounts and signed session tokens
//! - `orders` - Checkout and the order status lifecycle
//! - `notifications` - Customer inbox
//! - `payments` - Invoice issuing (sandbox gateway)

pub mod auth;
pub mod notifications;
pub mod orders;
pub mod payments;
