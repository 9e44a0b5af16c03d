use serde::Deserialize;

use crate::features::{FeatureSet, ProductFeatures};

/// Whether a markdown is evaluated at all for a record. `Hold` keeps the
/// candidate at the latest observed price without touching the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerDecision {
    Hold,
    Evaluate,
}

/// Shape of the live decision branch. The two variants disagree exactly when
/// stock is near expiry but still selling at a healthy rate: `Strict` falls
/// through to the rate check and may hold, `Flattened` always evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiveStrategy {
    Strict,
    Flattened,
}

/// Inference-time trigger. Compares the trailing sales average against 60%
/// of the product's own lifetime per-day sales rate.
pub struct LiveTriggerPolicy {
    strategy: LiveStrategy,
}

impl LiveTriggerPolicy {
    pub fn new(strategy: LiveStrategy) -> Self {
        Self { strategy }
    }

    pub fn decide(&self, set: &FeatureSet) -> TriggerDecision {
        let rate_baseline = set.total_units_sold as f64 / set.days_since_mfg as f64;
        let selling_slow = set.features.avg_sales < 0.6 * rate_baseline;

        match self.strategy {
            LiveStrategy::Strict => {
                if set.features.days_left > 2 {
                    TriggerDecision::Hold
                } else if selling_slow {
                    TriggerDecision::Evaluate
                } else {
                    TriggerDecision::Hold
                }
            }
            LiveStrategy::Flattened => {
                if set.features.days_left <= 2 || selling_slow {
                    TriggerDecision::Evaluate
                } else {
                    TriggerDecision::Hold
                }
            }
        }
    }
}

/// Backfill-time trigger. The baseline here is the dataset-wide mean of
/// observed sale prices, not a sales rate; the deployed model was backfilled
/// against exactly this comparison, so it is kept literal.
pub struct BatchTriggerPolicy {
    price_mean: f64,
}

impl BatchTriggerPolicy {
    pub fn from_latest_prices(latest_prices: &[f64]) -> Self {
        let price_mean = if latest_prices.is_empty() {
            0.0
        } else {
            latest_prices.iter().sum::<f64>() / latest_prices.len() as f64
        };
        Self { price_mean }
    }

    pub fn decide(&self, features: &ProductFeatures) -> TriggerDecision {
        if features.days_left <= 2 || features.avg_sales < 0.6 * self.price_mean {
            TriggerDecision::Evaluate
        } else {
            TriggerDecision::Hold
        }
    }
}
