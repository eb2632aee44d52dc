//! Shared types and models for the Inventory Back Office
//!
//! This crate contains domain models, common types, and validation
//! helpers used by the backend service and its tests.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
