//! Product catalog tests
//!
//! Tests for catalog rules including:
//! - Product code format
//! - Margin rule (selling price above purchase price)
//! - Visibility states and list sorting

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::models::ProductStatus;
use shared::types::ProductSort;
use shared::validation::{validate_margin, validate_positive_price, validate_product_code};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Valid product codes
    #[test]
    fn test_valid_product_codes() {
        for code in ["PRD-ABC", "PRD-001", "PRD-A1B2C3", "PRD-ABCDEFGHIJ"] {
            assert!(validate_product_code(code).is_ok(), "{} should be valid", code);
        }
    }

    /// Invalid product codes
    #[test]
    fn test_invalid_product_codes() {
        for code in [
            "PRD-AB",          // too short
            "PRD-ABCDEFGHIJK", // too long
            "PRD-abc",         // lowercase
            "PRD_ABC",         // wrong separator
            "ABC-PRD",         // wrong prefix
            "PRD-AB!",         // punctuation
            "",                // empty
        ] {
            assert!(validate_product_code(code).is_err(), "{} should be invalid", code);
        }
    }

    /// The selling price must be strictly above the purchase price
    #[test]
    fn test_margin_rule() {
        assert!(validate_margin(dec("120.00"), dec("100.00")).is_ok());
        assert!(validate_margin(dec("100.00"), dec("100.00")).is_err());
        assert!(validate_margin(dec("99.99"), dec("100.00")).is_err());
    }

    /// The margin rule is not applied against a zero purchase price
    /// baseline in any special way: any positive selling price passes
    #[test]
    fn test_margin_with_no_purchase_history() {
        assert!(validate_margin(dec("0.01"), Decimal::ZERO).is_ok());
    }

    /// Prices must be strictly positive
    #[test]
    fn test_positive_price() {
        assert!(validate_positive_price(dec("0.01")).is_ok());
        assert!(validate_positive_price(Decimal::ZERO).is_err());
        assert!(validate_positive_price(dec("-1")).is_err());
    }

    /// A negative purchase price slips past the margin comparison on
    /// its own, so supplied prices are checked for positivity first
    #[test]
    fn test_negative_prices_rejected_before_margin() {
        assert!(validate_margin(dec("5"), dec("-3")).is_ok());
        assert!(validate_positive_price(dec("-3")).is_err());

        assert!(validate_margin(dec("-1"), dec("-2")).is_ok());
        assert!(validate_positive_price(dec("-1")).is_err());
    }

    /// Hidden products stay in the catalog but out of default listings
    #[test]
    fn test_visibility_states() {
        assert_eq!(ProductStatus::Active.as_str(), "active");
        assert_eq!(ProductStatus::Hidden.as_str(), "hidden");
        assert_ne!(ProductStatus::Active, ProductStatus::Hidden);
    }

    /// List sort parameter parsing with name-ascending fallback
    #[test]
    fn test_product_sort_parsing() {
        assert_eq!(ProductSort::from_param("name_desc"), ProductSort::NameDesc);
        assert_eq!(ProductSort::from_param("stock_asc"), ProductSort::StockAsc);
        assert_eq!(ProductSort::from_param("stock_desc"), ProductSort::StockDesc);
        assert_eq!(ProductSort::from_param("unknown"), ProductSort::NameAsc);
    }

    /// Product codes are compared case-insensitively for uniqueness
    #[test]
    fn test_code_uniqueness_case_insensitive() {
        let existing = "PRD-ABC";
        let candidate = "prd-abc";
        assert_eq!(existing.to_lowercase(), candidate.to_lowercase());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for valid code suffixes
    fn suffix_strategy() -> impl Strategy<Value = String> {
        proptest::collection::vec(
            prop_oneof![
                proptest::char::range('A', 'Z'),
                proptest::char::range('0', '9'),
            ],
            3..=10,
        )
        .prop_map(|chars| chars.into_iter().collect())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Every PRD- code with a 3-10 char uppercase alphanumeric
        /// suffix validates
        #[test]
        fn prop_valid_codes_accepted(suffix in suffix_strategy()) {
            let code = format!("PRD-{}", suffix);
            prop_assert!(validate_product_code(&code).is_ok());
        }

        /// Codes without the PRD- prefix never validate
        #[test]
        fn prop_wrong_prefix_rejected(suffix in suffix_strategy()) {
            let code = format!("XYZ-{}", suffix);
            prop_assert!(validate_product_code(&code).is_err());
        }

        /// The margin rule is a strict comparison: equal prices always
        /// fail, any positive delta passes
        #[test]
        fn prop_margin_strictness(
            purchase in (0i64..=100000i64).prop_map(|n| Decimal::new(n, 2)),
            delta in (1i64..=10000i64).prop_map(|n| Decimal::new(n, 2))
        ) {
            prop_assert!(validate_margin(purchase, purchase).is_err());
            prop_assert!(validate_margin(purchase + delta, purchase).is_ok());
        }
    }
}
