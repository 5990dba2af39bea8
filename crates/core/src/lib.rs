//! Aneka Citra Core - Shared domain library.
//!
//! This crate provides the types and rules used across the Aneka Citra
//! components:
//! - `storefront` - Customer and admin JSON API
//! - `cli` - Command-line tools for migrations, seeding and admin accounts
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Everything that decides *what* happens to an order lives
//! here so it can be tested without a running database; the storefront crate
//! only decides *how* it is persisted.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, money, status enums, specification lists
//! - [`catalog`] - Product input validation
//! - [`pricing`] - Turning a cart into priced order lines
//! - [`lifecycle`] - Order status transition table and customer notices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod lifecycle;
pub mod pricing;
pub mod types;

pub use types::*;
