//! Authentication and account lifecycle tests
//!
//! Tests for registration validation and the approval workflow:
//! - Email and password rules
//! - Account status gating at login
//! - Role semantics

use proptest::prelude::*;

use shared::models::{Role, UserStatus};
use shared::validation::{validate_email, validate_password};

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Email shape validation
    #[test]
    fn test_email_validation() {
        assert!(validate_email("staff@example.com").is_ok());
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("no-dot@domain").is_err());
        assert!(validate_email("a@b").is_err());
    }

    /// Password minimum length
    #[test]
    fn test_password_length() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("123456").is_ok());
        assert!(validate_password("12345").is_err());
        assert!(validate_password("").is_err());
    }

    /// New registrations start pending
    #[test]
    fn test_registration_starts_pending() {
        let status = UserStatus::Pending;
        assert_eq!(status.as_str(), "pending");
    }

    /// Only active accounts can log in
    #[test]
    fn test_login_gating() {
        let can_login = |status: UserStatus| status == UserStatus::Active;

        assert!(can_login(UserStatus::Active));
        assert!(!can_login(UserStatus::Pending));
        assert!(!can_login(UserStatus::Rejected));
        assert!(!can_login(UserStatus::Banned));
    }

    /// Approval moves pending to active; rejection to rejected
    #[test]
    fn test_approval_workflow() {
        assert_eq!(UserStatus::Active.as_str(), "active");
        assert_eq!(UserStatus::Rejected.as_str(), "rejected");
        assert_eq!(UserStatus::Banned.as_str(), "banned");
    }

    /// Role string mapping matches the database enum
    #[test]
    fn test_role_strings() {
        assert_eq!(Role::Admin.as_str(), "admin");
        assert_eq!(Role::Staff.as_str(), "staff");
    }

    /// Only staff can be banned; the check is a role comparison
    #[test]
    fn test_only_staff_bannable() {
        let bannable = |role: Role| role == Role::Staff;

        assert!(bannable(Role::Staff));
        assert!(!bannable(Role::Admin));
    }

    /// Deletion requires a prior ban
    #[test]
    fn test_delete_requires_ban() {
        let deletable = |status: UserStatus| status == UserStatus::Banned;

        assert!(deletable(UserStatus::Banned));
        assert!(!deletable(UserStatus::Active));
        assert!(!deletable(UserStatus::Pending));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Any password shorter than 6 characters is rejected, anything
        /// at or above passes
        #[test]
        fn prop_password_boundary(len in 0usize..=30) {
            let password = "x".repeat(len);
            prop_assert_eq!(validate_password(&password).is_ok(), len >= 6);
        }

        /// Exactly one status permits login
        #[test]
        fn prop_single_login_status(idx in 0usize..4) {
            let statuses = [
                UserStatus::Pending,
                UserStatus::Active,
                UserStatus::Rejected,
                UserStatus::Banned,
            ];
            let can_login = statuses[idx] == UserStatus::Active;
            prop_assert_eq!(can_login, idx == 1);
        }
    }
}
