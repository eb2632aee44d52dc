//! Transaction lifecycle shared by purchase orders and sales invoices

use serde::{Deserialize, Serialize};

/// Lifecycle status of a purchase order or sales invoice.
///
/// Catalog effects (stock and price changes) are applied at completion,
/// never at creation, and reversed on cancellation of a completed
/// transaction. `Cancelled` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Created,
    Completed,
    Cancelled,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Created => "created",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Cancelled => "cancelled",
        }
    }

    /// Whether the state machine permits moving from `self` to `next`.
    ///
    /// Allowed transitions: Created → Completed, Created → Cancelled,
    /// Completed → Cancelled (rollback).
    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        use TransactionStatus::*;
        matches!(
            (self, next),
            (Created, Completed) | (Created, Cancelled) | (Completed, Cancelled)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::TransactionStatus::*;

    #[test]
    fn allowed_transitions() {
        assert!(Created.can_transition_to(Completed));
        assert!(Created.can_transition_to(Cancelled));
        assert!(Completed.can_transition_to(Cancelled));
    }

    #[test]
    fn cancelled_is_terminal() {
        assert!(!Cancelled.can_transition_to(Created));
        assert!(!Cancelled.can_transition_to(Completed));
        assert!(!Cancelled.can_transition_to(Cancelled));
    }

    #[test]
    fn no_backwards_or_repeat_transitions() {
        assert!(!Completed.can_transition_to(Created));
        assert!(!Completed.can_transition_to(Completed));
        assert!(!Created.can_transition_to(Created));
    }
}
