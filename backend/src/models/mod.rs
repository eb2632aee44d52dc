//! Domain models, shared with any future API clients

pub use shared::models::*;
