//! Core types for Aneka Citra.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod specification;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::Cents;
pub use specification::{SpecEntry, Specifications, SpecificationsError};
pub use status::*;
