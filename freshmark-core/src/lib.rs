pub mod records;
pub mod recommendation;
pub mod source;

pub use records::{InventoryRecord, SaleRecord};
pub use recommendation::DiscountRecommendation;
pub use source::{InventorySource, ResultSink, SalesSource};
