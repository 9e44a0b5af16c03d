use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One observation of a perishable product on the shelf.
///
/// `mfg_date <= current_date <= expiry_date` is expected from upstream data
/// but not enforced here; `current_date` may equal `mfg_date` for stock
/// observed on its manufacturing day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryRecord {
    /// Product identifier, shared with the sales history.
    pub barcode: String,
    pub product_name: String,
    pub mfg_date: NaiveDate,
    pub expiry_date: NaiveDate,
    /// The date this snapshot was taken.
    pub current_date: NaiveDate,
    pub inventory_left: i64,
    /// Maximum retail price, the undiscounted list price.
    pub mrp: f64,
}

/// A single historical sale of a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleRecord {
    pub barcode: String,
    pub sale_date: NaiveDate,
    pub units_sold: i64,
    pub price: f64,
}
