//! Validation helpers for the Inventory Back Office
//!
//! Business-rule checks shared between the backend services and tests.

use rust_decimal::Decimal;

// ============================================================================
// Catalog validations
// ============================================================================

/// Validate the product code format: `PRD-` followed by 3-10 uppercase
/// letters or digits.
pub fn validate_product_code(code: &str) -> Result<(), &'static str> {
    let Some(suffix) = code.strip_prefix("PRD-") else {
        return Err("Product code must start with PRD-");
    };
    if suffix.len() < 3 || suffix.len() > 10 {
        return Err("Product code suffix must be 3-10 characters");
    }
    if !suffix
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    {
        return Err("Product code suffix must be uppercase letters or digits");
    }
    Ok(())
}

/// Prices used for buying or selling must be strictly positive.
pub fn validate_positive_price(price: Decimal) -> Result<(), &'static str> {
    if price <= Decimal::ZERO {
        return Err("Price must be greater than zero");
    }
    Ok(())
}

/// The selling price must exceed the last purchase price. Checked at
/// product create/update time only, not continuously enforced.
pub fn validate_margin(
    selling_price: Decimal,
    last_purchase_price: Decimal,
) -> Result<(), &'static str> {
    if selling_price <= last_purchase_price {
        return Err("Selling price must be higher than the purchase price");
    }
    Ok(())
}

/// Quantities on transaction lines must be strictly positive.
pub fn validate_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be greater than zero");
    }
    Ok(())
}

// ============================================================================
// Account validations
// ============================================================================

/// Validate email format (basic shape check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Passwords must be at least 6 characters.
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 6 {
        return Err("Password must be at least 6 characters");
    }
    Ok(())
}

/// Validate a phone number: digits with optional leading `+`, 7-15 digits.
pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if digits.len() < 7 || digits.len() > 15 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err("Invalid phone number");
    }
    Ok(())
}
