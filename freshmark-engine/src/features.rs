use freshmark_core::records::{InventoryRecord, SaleRecord};

/// Numeric inputs to the price model, derived per inventory record. Owned by
/// a single pipeline run, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFeatures {
    pub inventory_left: i64,
    /// Total days between manufacture and expiry.
    pub shelf_life: i64,
    /// Days to expiry from the observation date. Negative for expired stock
    /// in live runs; floored at zero in backfill runs.
    pub days_left: i64,
    /// Mean units sold over the last three known sales.
    pub avg_sales: f64,
}

impl ProductFeatures {
    /// Model input layout. The order is fixed by the training artifact.
    pub fn as_input(&self) -> [f64; 4] {
        [
            self.inventory_left as f64,
            self.shelf_life as f64,
            self.days_left as f64,
            self.avg_sales,
        ]
    }
}

/// Features plus the sales-history context the trigger policies and
/// guardrails need.
#[derive(Debug, Clone)]
pub struct FeatureSet {
    pub features: ProductFeatures,
    /// Price of the chronologically last sale up to the observation date.
    pub latest_price: f64,
    /// Lifetime units sold up to the observation date.
    pub total_units_sold: i64,
    /// Days since manufacture, clamped to at least 1 so per-day rates never
    /// divide by zero on same-day stock.
    pub days_since_mfg: i64,
}

/// How days-to-expiry treats already-expired stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaysLeftMode {
    /// Live scoring keeps negative values.
    Unclamped,
    /// Backfill floors at zero, matching the data the model was fitted on.
    Clamped,
}

/// Joins one inventory record with its sales history and derives the
/// feature vector.
pub struct FeatureBuilder {
    days_left_mode: DaysLeftMode,
}

impl FeatureBuilder {
    pub fn new(days_left_mode: DaysLeftMode) -> Self {
        Self { days_left_mode }
    }

    /// Derive features from the sales that happened for this barcode up to
    /// the observation date. Returns `None` when the product has no usable
    /// history, which excludes the record from the run entirely.
    pub fn build(&self, record: &InventoryRecord, sales: &[SaleRecord]) -> Option<FeatureSet> {
        let mut matching: Vec<&SaleRecord> = sales
            .iter()
            .filter(|s| s.barcode == record.barcode && s.sale_date <= record.current_date)
            .collect();
        if matching.is_empty() {
            return None;
        }
        // Input files are not trusted to be pre-sorted. "Latest price" and
        // the trailing average are only meaningful in chronological order;
        // the sort is stable, so same-day sales keep their ledger order.
        matching.sort_by_key(|s| s.sale_date);

        let days_since_mfg = (record.current_date - record.mfg_date).num_days().max(1);
        let days_left = match self.days_left_mode {
            DaysLeftMode::Unclamped => (record.expiry_date - record.current_date).num_days(),
            DaysLeftMode::Clamped => (record.expiry_date - record.current_date)
                .num_days()
                .max(0),
        };
        let shelf_life = (record.expiry_date - record.mfg_date).num_days();

        let tail = &matching[matching.len().saturating_sub(3)..];
        let avg_sales = tail.iter().map(|s| s.units_sold as f64).sum::<f64>() / tail.len() as f64;
        let latest_price = matching[matching.len() - 1].price;
        let total_units_sold = matching.iter().map(|s| s.units_sold).sum();

        Some(FeatureSet {
            features: ProductFeatures {
                inventory_left: record.inventory_left,
                shelf_life,
                days_left,
                avg_sales,
            },
            latest_price,
            total_units_sold,
            days_since_mfg,
        })
    }
}
