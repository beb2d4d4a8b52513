//! Lead scoring: customer reliability/value from transaction history.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use dukaan_core::{CustomerId, TransactionId};

/// A completed customer transaction (sale), as read from history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub customer_id: CustomerId,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Nominal window the transaction count is spread over.
///
/// No windowing filter is applied to the transaction set itself:
/// `frequency` divides the full history passed in by 30. Callers wanting a
/// true last-30-days frequency must pre-filter, and changing the divisor
/// here would silently shift every persisted score.
const NOMINAL_WINDOW_DAYS: i64 = 30;

/// Average order value treated as saturating ("high AOV").
const AOV_SATURATION: i64 = 5000;

/// Compute the lead score in [0, 1], rounded to 2 decimal places.
///
/// `0.3·frequency + 0.4·normalized_aov + 0.3·reliability`, where reliability
/// falls as the outstanding balance exceeds 5x the average order value.
/// A customer with no transaction history scores 0.
pub fn lead_score(transactions: &[Transaction], balance: Decimal) -> Decimal {
    if transactions.is_empty() {
        return Decimal::ZERO;
    }

    let count = Decimal::from(transactions.len() as i64);
    let mean: Decimal = transactions
        .iter()
        .map(|t| t.total_amount)
        .sum::<Decimal>()
        / count;

    let frequency = count / Decimal::from(NOMINAL_WINDOW_DAYS);
    let norm_aov = (mean / Decimal::from(AOV_SATURATION)).min(Decimal::ONE);

    let exposure_cap = mean * Decimal::from(5) + Decimal::ONE;
    let risk = (balance / exposure_cap).min(Decimal::ONE);
    let reliability = Decimal::ONE - risk;

    let weighted = frequency * Decimal::new(3, 1)
        + norm_aov * Decimal::new(4, 1)
        + reliability * Decimal::new(3, 1);

    weighted.clamp(Decimal::ZERO, Decimal::ONE).round_dp(2)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn tx(amount: i64) -> Transaction {
        Transaction {
            id: TransactionId::new(),
            customer_id: CustomerId::new(),
            total_amount: Decimal::from(amount),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn no_history_scores_zero() {
        assert_eq!(lead_score(&[], Decimal::from(1000)), Decimal::ZERO);
    }

    #[test]
    fn regular_low_balance_customer_scores_well() {
        // 6 transactions of 2500, nothing outstanding.
        let txs: Vec<_> = (0..6).map(|_| tx(2500)).collect();
        let score = lead_score(&txs, Decimal::ZERO);

        // frequency 6/30=0.2, aov 0.5, reliability 1.0
        // => 0.3*0.2 + 0.4*0.5 + 0.3*1.0 = 0.56
        assert_eq!(score, Decimal::new(56, 2));
    }

    #[test]
    fn heavy_balance_erodes_reliability() {
        let txs: Vec<_> = (0..3).map(|_| tx(1000)).collect();
        // Balance well past 5x AOV: reliability bottoms out at 0.
        let heavy = lead_score(&txs, Decimal::from(100_000));
        let clean = lead_score(&txs, Decimal::ZERO);
        assert!(heavy < clean);
    }

    #[test]
    fn negative_balance_does_not_push_score_past_one() {
        let txs: Vec<_> = (0..60).map(|_| tx(10_000)).collect();
        let score = lead_score(&txs, Decimal::from(-50_000));
        assert_eq!(score, Decimal::ONE);
    }

    proptest! {
        #[test]
        fn score_is_always_in_unit_interval(
            amounts in proptest::collection::vec(0i64..50_000, 0..40),
            balance in -100_000i64..500_000,
        ) {
            let txs: Vec<_> = amounts.into_iter().map(tx).collect();
            let score = lead_score(&txs, Decimal::from(balance));
            prop_assert!(score >= Decimal::ZERO);
            prop_assert!(score <= Decimal::ONE);
        }
    }
}
