use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use dukaan_core::CustomerId;

/// Direction of a khata entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KhataAction {
    /// Customer paid the store; balance goes down.
    PaymentReceived,
    /// Store extended credit; balance goes up.
    CreditGiven,
}

/// One parsed ledger update ("Rajveer paid 200", "100 credit to Pratul").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KhataEntry {
    pub customer_id: CustomerId,
    pub action: KhataAction,
    pub amount: Decimal,
    pub recorded_at: DateTime<Utc>,
}

/// Running balance of a customer's khata (1:1 with the customer).
///
/// Positive balance means the customer owes the store. The lead score is a
/// derived cached value, recomputed after every mutation (last-write-wins, no
/// history kept).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerBalance {
    pub customer_id: CustomerId,
    pub balance: Decimal,
    pub last_payment_at: Option<DateTime<Utc>>,
    pub lead_score: Option<Decimal>,
}

impl LedgerBalance {
    pub fn opening(customer_id: CustomerId) -> Self {
        Self {
            customer_id,
            balance: Decimal::ZERO,
            last_payment_at: None,
            lead_score: None,
        }
    }

    /// Apply a khata entry.
    ///
    /// The payment timestamp is stamped on every entry (payment or credit),
    /// matching how the ledger has always behaved; the overdue sweep keys off
    /// this field.
    pub fn apply(&self, entry: &KhataEntry) -> Self {
        let balance = match entry.action {
            KhataAction::PaymentReceived => self.balance - entry.amount,
            KhataAction::CreditGiven => self.balance + entry.amount,
        };

        Self {
            customer_id: self.customer_id,
            balance,
            last_payment_at: Some(entry.recorded_at),
            lead_score: self.lead_score,
        }
    }

    pub fn with_lead_score(mut self, score: Decimal) -> Self {
        self.lead_score = Some(score);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(action: KhataAction, amount: i64) -> KhataEntry {
        KhataEntry {
            customer_id: CustomerId::new(),
            action,
            amount: Decimal::from(amount),
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn payment_decreases_balance() {
        let ledger = LedgerBalance {
            balance: Decimal::from(500),
            ..LedgerBalance::opening(CustomerId::new())
        };

        let updated = ledger.apply(&entry(KhataAction::PaymentReceived, 200));
        assert_eq!(updated.balance, Decimal::from(300));
        assert!(updated.last_payment_at.is_some());
    }

    #[test]
    fn credit_increases_balance() {
        let ledger = LedgerBalance::opening(CustomerId::new());
        let updated = ledger.apply(&entry(KhataAction::CreditGiven, 150));
        assert_eq!(updated.balance, Decimal::from(150));
    }

    #[test]
    fn balance_may_go_negative_on_overpayment() {
        let ledger = LedgerBalance::opening(CustomerId::new());
        let updated = ledger.apply(&entry(KhataAction::PaymentReceived, 50));
        assert_eq!(updated.balance, Decimal::from(-50));
    }
}
