use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dukaan_core::SkuId;

/// Default alert threshold for the reorder nudge.
pub const DEFAULT_ALERT_THRESHOLD: f64 = 2.5;

/// Component weights; the defaults sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemandWeights {
    pub velocity: f64,
    pub lost_sales: f64,
    pub seasonality: f64,
}

impl Default for DemandWeights {
    fn default() -> Self {
        Self {
            velocity: 0.4,
            lost_sales: 0.4,
            seasonality: 0.2,
        }
    }
}

/// One lost-sale observation, reduced to what the decay needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LostSaleSample {
    pub requested_qty: f64,
    /// Fractional days between detection and evaluation; clamped to >= 0.
    pub age_days: f64,
}

impl LostSaleSample {
    /// Build a sample from timestamps. Future-dated events decay as age 0.
    pub fn at(requested_qty: f64, detected_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let age_days = (now - detected_at).num_seconds() as f64 / 86_400.0;
        Self {
            requested_qty,
            age_days: age_days.max(0.0),
        }
    }
}

/// Deterministic demand scoring model.
///
/// `score = w_v·velocity + w_l·normalize(decayed_lost_sales) + w_s·seasonality`
///
/// - decayed lost sales: half-life decay over event age;
/// - `normalize` divides by a fixed saturation constant and clamps to [0, 1];
/// - the result is rounded to 2 decimal places and capped.
#[derive(Debug, Clone)]
pub struct DemandModel {
    weights: DemandWeights,
    /// Half-life of a lost-sale observation, in days.
    half_life_days: f64,
    /// Decayed-quantity level treated as saturated demand.
    saturation: f64,
    cap: f64,
}

impl Default for DemandModel {
    fn default() -> Self {
        Self {
            weights: DemandWeights::default(),
            half_life_days: 7.0,
            saturation: 10.0,
            cap: 5.0,
        }
    }
}

impl DemandModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(mut self, weights: DemandWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_half_life_days(mut self, half_life_days: f64) -> Self {
        self.half_life_days = half_life_days;
        self
    }

    pub fn with_saturation(mut self, saturation: f64) -> Self {
        self.saturation = saturation;
        self
    }

    /// Sum of requested quantities, each decayed by
    /// `exp(-ln(2) · age_days / half_life)`.
    pub fn decayed_lost_sales(&self, samples: &[LostSaleSample]) -> f64 {
        samples
            .iter()
            .map(|s| {
                let age = s.age_days.max(0.0);
                s.requested_qty * (-std::f64::consts::LN_2 * age / self.half_life_days).exp()
            })
            .sum()
    }

    /// Compute the demand score from a velocity scalar, the item's lost-sale
    /// history and a seasonality signal (each expected in [0, 1] for the
    /// externally supplied inputs).
    pub fn score(
        &self,
        velocity: f64,
        lost_sales: &[LostSaleSample],
        seasonality: f64,
    ) -> DemandScore {
        let decayed = self.decayed_lost_sales(lost_sales);
        let lost_normalized = (decayed / self.saturation).clamp(0.0, 1.0);

        let raw = self.weights.velocity * velocity
            + self.weights.lost_sales * lost_normalized
            + self.weights.seasonality * seasonality;

        let score = round2(raw.clamp(0.0, self.cap));

        DemandScore {
            score,
            breakdown: DemandBreakdown {
                velocity,
                lost_decayed: round2(decayed),
                lost_normalized: round2(lost_normalized),
                seasonality,
            },
        }
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Scoring output: the capped score plus its component breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemandScore {
    pub score: f64,
    pub breakdown: DemandBreakdown,
}

impl DemandScore {
    pub fn exceeds(&self, threshold: f64) -> bool {
        self.score > threshold
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemandBreakdown {
    pub velocity: f64,
    pub lost_decayed: f64,
    pub lost_normalized: f64,
    pub seasonality: f64,
}

/// Append-only audit record of one scoring run.
///
/// This is history for auditability, not the authoritative current score:
/// every computation appends a new record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandSignal {
    pub sku_id: SkuId,
    pub score: f64,
    pub breakdown: DemandBreakdown,
    pub computed_at: DateTime<Utc>,
}

impl DemandSignal {
    pub fn record(sku_id: SkuId, result: &DemandScore, computed_at: DateTime<Utc>) -> Self {
        Self {
            sku_id,
            score: result.score,
            breakdown: result.breakdown,
            computed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn half_life_old_event_contributes_half_its_quantity() {
        // qty=10 detected exactly one half-life ago => decayed value 5.0.
        let model = DemandModel::new();
        let samples = [LostSaleSample {
            requested_qty: 10.0,
            age_days: 7.0,
        }];

        let decayed = model.decayed_lost_sales(&samples);
        assert!((decayed - 5.0).abs() < 1e-9);
    }

    #[test]
    fn fresh_event_contributes_full_quantity() {
        let model = DemandModel::new();
        let samples = [LostSaleSample {
            requested_qty: 4.0,
            age_days: 0.0,
        }];
        assert!((model.decayed_lost_sales(&samples) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn future_dated_event_is_clamped_to_age_zero() {
        let now = Utc::now();
        let sample = LostSaleSample::at(3.0, now + chrono::Duration::hours(6), now);
        assert_eq!(sample.age_days, 0.0);
    }

    #[test]
    fn score_combines_weighted_components() {
        let model = DemandModel::new();
        let samples = [LostSaleSample {
            requested_qty: 10.0,
            age_days: 7.0,
        }];

        // decayed 5.0, normalized 0.5; 0.4*0.5 + 0.4*0.5 + 0.2*0.0 = 0.4
        let result = model.score(0.5, &samples, 0.0);
        assert!((result.score - 0.4).abs() < 1e-9);
        assert!((result.breakdown.lost_decayed - 5.0).abs() < 1e-9);
    }

    #[test]
    fn normalization_saturates() {
        let model = DemandModel::new();
        let flood: Vec<_> = (0..50)
            .map(|_| LostSaleSample {
                requested_qty: 100.0,
                age_days: 0.0,
            })
            .collect();

        let result = model.score(0.0, &flood, 0.0);
        assert!((result.breakdown.lost_normalized - 1.0).abs() < 1e-9);
        assert!((result.score - 0.4).abs() < 1e-9);
    }

    #[test]
    fn threshold_check_is_strictly_greater() {
        let score = DemandScore {
            score: 2.5,
            breakdown: DemandBreakdown {
                velocity: 0.0,
                lost_decayed: 0.0,
                lost_normalized: 0.0,
                seasonality: 0.0,
            },
        };
        assert!(!score.exceeds(2.5));
        assert!(score.exceeds(2.49));
    }

    proptest! {
        #[test]
        fn score_is_monotone_in_lost_sales_and_capped(
            qty_a in 0.0f64..200.0,
            qty_b in 0.0f64..200.0,
            velocity in 0.0f64..1.0,
            seasonality in 0.0f64..1.0,
        ) {
            let model = DemandModel::new();
            let lo = qty_a.min(qty_b);
            let hi = qty_a.max(qty_b);

            let s_lo = model.score(velocity, &[LostSaleSample { requested_qty: lo, age_days: 1.0 }], seasonality);
            let s_hi = model.score(velocity, &[LostSaleSample { requested_qty: hi, age_days: 1.0 }], seasonality);

            prop_assert!(s_hi.score >= s_lo.score);
            prop_assert!(s_hi.score <= 5.0);
            prop_assert!(s_lo.score >= 0.0);
        }
    }
}
