//! HTTP handlers for the Inventory Back Office

pub mod auth;
pub mod health;
pub mod products;
pub mod purchases;
pub mod reports;
pub mod sales;
pub mod suppliers;
pub mod users;

pub use auth::*;
pub use health::*;
pub use products::*;
pub use purchases::*;
pub use reports::*;
pub use sales::*;
pub use suppliers::*;
pub use users::*;
