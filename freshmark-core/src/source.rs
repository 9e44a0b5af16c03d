use crate::recommendation::DiscountRecommendation;
use crate::records::{InventoryRecord, SaleRecord};

/// Source of inventory snapshots.
pub trait InventorySource: Send + Sync {
    fn load_inventory(
        &self,
    ) -> Result<Vec<InventoryRecord>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Source of the historical sales ledger.
pub trait SalesSource: Send + Sync {
    fn load_sales(&self) -> Result<Vec<SaleRecord>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Materialized view of the last pricing run.
///
/// `persist` replaces the whole stored set; `load_last` re-reads it without
/// recomputation, yielding an empty set when nothing was ever persisted.
pub trait ResultSink: Send + Sync {
    fn persist(
        &self,
        recommendations: &[DiscountRecommendation],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    fn load_last(
        &self,
    ) -> Result<Vec<DiscountRecommendation>, Box<dyn std::error::Error + Send + Sync>>;
}
