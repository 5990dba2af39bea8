//! Aneka Citra storefront library.
//!
//! JSON API for the printer shop: catalog, orders with their payment
//! lifecycle, customer notifications and the admin back office. The binary
//! in `main.rs` only wires configuration, telemetry and the listener.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
