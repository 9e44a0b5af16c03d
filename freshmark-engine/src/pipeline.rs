use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use freshmark_core::recommendation::DiscountRecommendation;
use freshmark_core::records::{InventoryRecord, SaleRecord};

use crate::decision::Guardrail;
use crate::features::{DaysLeftMode, FeatureBuilder, FeatureSet};
use crate::predictor::PricePredictor;
use crate::trigger::{BatchTriggerPolicy, LiveStrategy, LiveTriggerPolicy, TriggerDecision};

/// Which pipeline flavor a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineMode {
    Live,
    Backfill,
}

/// Orchestrates feature derivation, triggering, prediction and guardrails
/// over one immutable snapshot of inventory and sales. Runs are synchronous
/// and side-effect free; persisting the output is the caller's concern.
pub struct PricingPipeline {
    predictor: PricePredictor,
    live_strategy: LiveStrategy,
}

impl PricingPipeline {
    pub fn new(predictor: PricePredictor, live_strategy: LiveStrategy) -> Self {
        Self {
            predictor,
            live_strategy,
        }
    }

    pub fn run(
        &self,
        mode: PipelineMode,
        inventory: &[InventoryRecord],
        sales: &[SaleRecord],
    ) -> Vec<DiscountRecommendation> {
        match mode {
            PipelineMode::Live => self.run_live(inventory, sales),
            PipelineMode::Backfill => self.run_backfill(inventory, sales),
        }
    }

    /// Per-record inference over a current snapshot. Records without sales
    /// history are skipped; holds re-quote the latest sale price, which the
    /// strict guardrail then drops, so only genuine markdowns come out.
    /// Output preserves inventory iteration order.
    pub fn run_live(
        &self,
        inventory: &[InventoryRecord],
        sales: &[SaleRecord],
    ) -> Vec<DiscountRecommendation> {
        let run_id = Uuid::new_v4();
        let builder = FeatureBuilder::new(DaysLeftMode::Unclamped);
        let policy = LiveTriggerPolicy::new(self.live_strategy);
        let mut recommendations = Vec::new();

        for record in inventory {
            let Some(set) = builder.build(record, sales) else {
                tracing::debug!(%run_id, barcode = %record.barcode, "no sales history, skipped");
                continue;
            };

            let predicted = match policy.decide(&set) {
                TriggerDecision::Evaluate => self.predictor.predict(&set.features),
                TriggerDecision::Hold => set.latest_price,
            };

            if Guardrail::LatestSale.admits(predicted, set.latest_price, record.mrp) {
                recommendations.push(DiscountRecommendation {
                    product_id: record.barcode.clone(),
                    product_name: record.product_name.clone(),
                    predicted_price: predicted,
                    original_price: None,
                    mfg_date: None,
                    expiry_date: record.expiry_date,
                    days_left: None,
                });
            } else {
                tracing::debug!(
                    %run_id,
                    barcode = %record.barcode,
                    predicted,
                    latest = set.latest_price,
                    "candidate does not undercut the latest sale, dropped"
                );
            }
        }

        tracing::info!(
            %run_id,
            records = inventory.len(),
            recommended = recommendations.len(),
            "live pricing run complete"
        );
        recommendations
    }

    /// Training-time discount backfill. Records are grouped by
    /// (product_name, expiry_date) in first-seen order; a group is priced
    /// once, from its first member's features, when any member trips the
    /// batch trigger. Every member whose list price beats the prediction
    /// gets a recommendation.
    pub fn run_backfill(
        &self,
        inventory: &[InventoryRecord],
        sales: &[SaleRecord],
    ) -> Vec<DiscountRecommendation> {
        let run_id = Uuid::new_v4();
        let builder = FeatureBuilder::new(DaysLeftMode::Clamped);

        let rows: Vec<(&InventoryRecord, FeatureSet)> = inventory
            .iter()
            .filter_map(|record| builder.build(record, sales).map(|set| (record, set)))
            .collect();

        let latest_prices: Vec<f64> = rows.iter().map(|(_, set)| set.latest_price).collect();
        let policy = BatchTriggerPolicy::from_latest_prices(&latest_prices);

        let mut groups: Vec<Vec<&(&InventoryRecord, FeatureSet)>> = Vec::new();
        let mut index: HashMap<(&str, NaiveDate), usize> = HashMap::new();
        for row in &rows {
            let key = (row.0.product_name.as_str(), row.0.expiry_date);
            match index.get(&key) {
                Some(&slot) => groups[slot].push(row),
                None => {
                    index.insert(key, groups.len());
                    groups.push(vec![row]);
                }
            }
        }

        let mut recommendations = Vec::new();
        for members in &groups {
            let triggered = members
                .iter()
                .any(|(_, set)| policy.decide(&set.features) == TriggerDecision::Evaluate);
            if !triggered {
                continue;
            }

            // One prediction per lot, taken from its first observed row.
            let predicted = self.predictor.predict(&members[0].1.features);

            for (record, set) in members.iter().copied() {
                if Guardrail::ListPrice.admits(predicted, set.latest_price, record.mrp) {
                    recommendations.push(DiscountRecommendation {
                        product_id: record.barcode.clone(),
                        product_name: record.product_name.clone(),
                        predicted_price: predicted,
                        original_price: Some(record.mrp),
                        mfg_date: Some(record.mfg_date),
                        expiry_date: record.expiry_date,
                        days_left: Some(set.features.days_left),
                    });
                }
            }
        }

        tracing::info!(
            %run_id,
            records = inventory.len(),
            groups = groups.len(),
            recommended = recommendations.len(),
            "backfill pricing run complete"
        );
        recommendations
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use freshmark_core::records::{InventoryRecord, SaleRecord};

    use super::*;
    use crate::predictor::PriceModel;

    /// Model that always answers the same price, recording nothing.
    struct FixedModel(f64);

    impl PriceModel for FixedModel {
        fn predict(&self, _input: &[f64; 4]) -> f64 {
            self.0
        }
    }

    fn pipeline(price: f64) -> PricingPipeline {
        PricingPipeline::new(
            PricePredictor::new(Arc::new(FixedModel(price)), None),
            LiveStrategy::Strict,
        )
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(
        barcode: &str,
        name: &str,
        mfg: NaiveDate,
        expiry: NaiveDate,
        current: NaiveDate,
        mrp: f64,
    ) -> InventoryRecord {
        InventoryRecord {
            barcode: barcode.into(),
            product_name: name.into(),
            mfg_date: mfg,
            expiry_date: expiry,
            current_date: current,
            inventory_left: 50,
            mrp,
        }
    }

    fn sale(barcode: &str, day: NaiveDate, units: i64, price: f64) -> SaleRecord {
        SaleRecord {
            barcode: barcode.into(),
            sale_date: day,
            units_sold: units,
            price,
        }
    }

    // One day of shelf life left, a single healthy sale at 100.
    fn near_expiry_fixture() -> (Vec<InventoryRecord>, Vec<SaleRecord>) {
        let inventory = vec![record(
            "X",
            "Greek Yogurt 400g",
            date(2024, 1, 1),
            date(2024, 1, 10),
            date(2024, 1, 9),
            100.0,
        )];
        let sales = vec![sale("X", date(2024, 1, 2), 10, 100.0)];
        (inventory, sales)
    }

    // Three trailing zero-unit days push the average under 60% of the
    // lifetime rate, so the strict branch evaluates.
    fn slow_tail(sales: &mut Vec<SaleRecord>) {
        sales.push(sale("X", date(2024, 1, 7), 0, 100.0));
        sales.push(sale("X", date(2024, 1, 8), 0, 100.0));
        sales.push(sale("X", date(2024, 1, 9), 0, 100.0));
    }

    #[test]
    fn flattened_near_expiry_end_to_end() {
        // With one sale the trailing average (10) is the lifetime rate, so
        // only the flattened branch marks this down, on days_left alone.
        let (inventory, sales) = near_expiry_fixture();
        let pipeline = PricingPipeline::new(
            PricePredictor::new(Arc::new(FixedModel(71.25)), None),
            LiveStrategy::Flattened,
        );

        let out = pipeline.run_live(&inventory, &sales);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].predicted_price, 71.25);
        assert_eq!(out[0].product_id, "X");
        assert_eq!(out[0].expiry_date, date(2024, 1, 10));
        assert!(out[0].original_price.is_none());
        // Live recommendations carry no provenance fields.
        assert!(out[0].days_left.is_none());
        assert!(out[0].mfg_date.is_none());
    }

    #[test]
    fn strict_emits_a_markdown_when_the_model_undercuts() {
        let (inventory, mut sales) = near_expiry_fixture();
        slow_tail(&mut sales);

        let out = pipeline(71.25).run_live(&inventory, &sales);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].predicted_price, 71.25);
        assert!(out[0].days_left.is_none());
    }

    #[test]
    fn live_drops_predictions_at_or_above_the_latest_price() {
        let (inventory, mut sales) = near_expiry_fixture();
        slow_tail(&mut sales);

        // Model predicts above the latest sale: nothing comes out.
        assert!(pipeline(120.0).run_live(&inventory, &sales).is_empty());
        // Exactly the latest price is not a markdown either.
        assert!(pipeline(100.0).run_live(&inventory, &sales).is_empty());
    }

    #[test]
    fn live_holds_far_from_expiry_without_calling_the_model() {
        struct PanicModel;
        impl PriceModel for PanicModel {
            fn predict(&self, _input: &[f64; 4]) -> f64 {
                panic!("model must not be called for held records");
            }
        }

        let inventory = vec![record(
            "X",
            "Greek Yogurt 400g",
            date(2024, 1, 1),
            date(2024, 1, 10),
            date(2024, 1, 3),
            100.0,
        )];
        let sales = vec![sale("X", date(2024, 1, 2), 1, 100.0)];

        let pipeline = PricingPipeline::new(
            PricePredictor::new(Arc::new(PanicModel), None),
            LiveStrategy::Strict,
        );
        // Held at the latest price, which can never undercut itself.
        assert!(pipeline.run_live(&inventory, &sales).is_empty());
    }

    #[test]
    fn live_skips_records_without_history() {
        let inventory = vec![
            record(
                "X",
                "Greek Yogurt 400g",
                date(2024, 1, 1),
                date(2024, 1, 10),
                date(2024, 1, 9),
                100.0,
            ),
            record(
                "Y",
                "Paneer 200g",
                date(2024, 1, 1),
                date(2024, 1, 10),
                date(2024, 1, 9),
                80.0,
            ),
        ];
        // Y has no sales at all.
        let mut sales = vec![sale("X", date(2024, 1, 2), 10, 100.0)];
        slow_tail(&mut sales);

        let out = pipeline(50.0).run_live(&inventory, &sales);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].product_id, "X");
    }

    #[test]
    fn backfill_prices_each_lot_once_and_rails_against_mrp() {
        // Two records of the same lot (name + expiry), one sibling lot that
        // sells fine. mrp differs inside the lot so only one member passes.
        let inventory = vec![
            record(
                "A1",
                "Greek Yogurt 400g",
                date(2024, 1, 1),
                date(2024, 1, 10),
                date(2024, 1, 9),
                100.0,
            ),
            record(
                "A2",
                "Greek Yogurt 400g",
                date(2024, 1, 1),
                date(2024, 1, 10),
                date(2024, 1, 9),
                70.0,
            ),
            record(
                "B1",
                "Orange Juice 1L",
                date(2024, 1, 1),
                date(2024, 1, 20),
                date(2024, 1, 9),
                100.0,
            ),
        ];
        let sales = vec![
            sale("A1", date(2024, 1, 2), 10, 100.0),
            sale("A2", date(2024, 1, 2), 10, 90.0),
            // High-velocity sibling: keeps the batch trigger quiet for B.
            sale("B1", date(2024, 1, 2), 500, 100.0),
        ];

        let out = pipeline(71.25).run_backfill(&inventory, &sales);
        // Yogurt lot triggers on days_left <= 2; 71.25 < 100 passes for A1,
        // 71.25 >= 70 fails for A2. Juice lot holds: 11 days out and its
        // trailing average beats 60% of the mean latest price.
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].product_id, "A1");
        assert_eq!(out[0].original_price, Some(100.0));
        assert_eq!(out[0].mfg_date, Some(date(2024, 1, 1)));
        assert_eq!(out[0].days_left, Some(1));
    }

    #[test]
    fn backfill_floors_days_left_for_expired_stock() {
        let inventory = vec![record(
            "X",
            "Greek Yogurt 400g",
            date(2024, 1, 1),
            date(2024, 1, 5),
            date(2024, 1, 9),
            100.0,
        )];
        let sales = vec![sale("X", date(2024, 1, 2), 10, 100.0)];

        let out = pipeline(50.0).run_backfill(&inventory, &sales);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].days_left, Some(0));
    }

    #[test]
    fn backfill_keeps_first_seen_group_order() {
        let inventory = vec![
            record(
                "Z1",
                "Paneer 200g",
                date(2024, 1, 1),
                date(2024, 1, 10),
                date(2024, 1, 9),
                100.0,
            ),
            record(
                "A1",
                "Greek Yogurt 400g",
                date(2024, 1, 1),
                date(2024, 1, 10),
                date(2024, 1, 9),
                100.0,
            ),
        ];
        let sales = vec![
            sale("Z1", date(2024, 1, 2), 10, 100.0),
            sale("A1", date(2024, 1, 2), 10, 100.0),
        ];

        let out = pipeline(50.0).run_backfill(&inventory, &sales);
        let ids: Vec<&str> = out.iter().map(|r| r.product_id.as_str()).collect();
        assert_eq!(ids, vec!["Z1", "A1"]);
    }

    #[test]
    fn run_dispatches_on_mode() {
        let (inventory, mut sales) = near_expiry_fixture();
        slow_tail(&mut sales);

        let pipeline = pipeline(71.25);
        let live = pipeline.run(PipelineMode::Live, &inventory, &sales);
        let backfill = pipeline.run(PipelineMode::Backfill, &inventory, &sales);

        assert_eq!(live.len(), 1);
        assert!(live[0].original_price.is_none());
        assert_eq!(backfill.len(), 1);
        assert_eq!(backfill[0].original_price, Some(100.0));
    }
}
