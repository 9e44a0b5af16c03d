use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A markdown recommendation for one inventory record.
///
/// Live runs emit the four-field short form (product, price, expiry only);
/// backfill runs carry the full provenance of the discount. Serialized as an
/// element of the persisted JSON array, with `expiry_date` under the wire key
/// `expiry` as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountRecommendation {
    pub product_id: String,
    pub product_name: String,
    /// Recommended price, always rounded to cents.
    pub predicted_price: f64,
    /// The undiscounted list price, when the run tracked it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mfg_date: Option<NaiveDate>,
    #[serde(rename = "expiry")]
    pub expiry_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_left: Option<i64>,
}
