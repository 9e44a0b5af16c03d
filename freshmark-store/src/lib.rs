pub mod app_config;
pub mod csv_source;
pub mod model_store;
pub mod result_sink;

pub use csv_source::{CsvInventorySource, CsvSalesSource};
pub use model_store::JsonModelStore;
pub use result_sink::JsonResultSink;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("price model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed record: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}
