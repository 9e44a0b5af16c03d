use std::path::PathBuf;

use freshmark_core::records::{InventoryRecord, SaleRecord};
use freshmark_core::source::{InventorySource, SalesSource};

use crate::StoreError;

/// Inventory snapshot backed by a CSV file with a header row. Malformed
/// rows, dates included, fail the whole load; the dataset is assumed
/// pre-validated upstream.
pub struct CsvInventorySource {
    path: PathBuf,
}

impl CsvInventorySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn read(&self) -> Result<Vec<InventoryRecord>, StoreError> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut records = Vec::new();
        for row in reader.deserialize() {
            let record: InventoryRecord = row?;
            records.push(record);
        }
        Ok(records)
    }
}

impl InventorySource for CsvInventorySource {
    fn load_inventory(
        &self,
    ) -> Result<Vec<InventoryRecord>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.read()?)
    }
}

/// Sales ledger backed by a CSV file. Rows are returned in file order; the
/// engine orders them chronologically itself.
pub struct CsvSalesSource {
    path: PathBuf,
}

impl CsvSalesSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn read(&self) -> Result<Vec<SaleRecord>, StoreError> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut records = Vec::new();
        for row in reader.deserialize() {
            let record: SaleRecord = row?;
            records.push(record);
        }
        Ok(records)
    }
}

impl SalesSource for CsvSalesSource {
    fn load_sales(&self) -> Result<Vec<SaleRecord>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.read()?)
    }
}
