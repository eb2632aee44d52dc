//! Business logic services for the Inventory Back Office

pub mod auth;
pub mod finance;
pub mod product;
pub mod purchase;
pub mod sales;
pub mod supplier;
pub mod user;

pub use auth::AuthService;
pub use finance::FinanceService;
pub use product::ProductService;
pub use purchase::PurchaseService;
pub use sales::SalesService;
pub use supplier::SupplierService;
pub use user::UserService;
