//! Domain models for the Inventory Back Office

mod finance;
mod product;
mod purchase;
mod sales;
mod supplier;
mod transaction;
mod user;

pub use finance::*;
pub use product::*;
pub use purchase::*;
pub use sales::*;
pub use supplier::*;
pub use transaction::*;
pub use user::*;
