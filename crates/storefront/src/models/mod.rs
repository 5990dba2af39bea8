//! Domain models for the storefront.
//!
//! These are validated domain objects, separate from the database row types
//! in [`crate::db`]. They serialize to the JSON shapes the API returns.

pub mod notification;
pub mod order;
pub mod product;
pub mod user;

pub use notification::{Notification, NotificationList};
pub use order::{AdminOrder, Order, OrderCustomer, OrderItem};
pub use product::Product;
pub use user::User;
