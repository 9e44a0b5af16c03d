use std::fs::File;
use std::io::ErrorKind;
use std::path::PathBuf;

use freshmark_core::recommendation::DiscountRecommendation;
use freshmark_core::source::ResultSink;

use crate::StoreError;

/// Persists the result set of a pricing run as one JSON array, fully
/// replacing whatever the previous run wrote.
pub struct JsonResultSink {
    path: PathBuf,
}

impl JsonResultSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn write(&self, recommendations: &[DiscountRecommendation]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(&self.path)?;
        serde_json::to_writer_pretty(file, recommendations)?;
        tracing::debug!(
            path = %self.path.display(),
            count = recommendations.len(),
            "recommendations persisted"
        );
        Ok(())
    }

    /// Re-read the last persisted run. A file that was never written, or was
    /// written empty, reads as an empty result set.
    pub fn read_last(&self) -> Result<Vec<DiscountRecommendation>, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }
}

impl ResultSink for JsonResultSink {
    fn persist(
        &self,
        recommendations: &[DiscountRecommendation],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.write(recommendations)?)
    }

    fn load_last(
        &self,
    ) -> Result<Vec<DiscountRecommendation>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.read_last()?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn rec(product_id: &str, price: f64) -> DiscountRecommendation {
        DiscountRecommendation {
            product_id: product_id.into(),
            product_name: "Greek Yogurt 400g".into(),
            predicted_price: price,
            original_price: None,
            mfg_date: None,
            expiry_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            days_left: None,
        }
    }

    #[test]
    fn unwritten_sink_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonResultSink::new(dir.path().join("updated_discounts.json"));
        assert!(sink.read_last().unwrap().is_empty());
    }

    #[test]
    fn empty_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("updated_discounts.json");
        std::fs::write(&path, "").unwrap();
        assert!(JsonResultSink::new(&path).read_last().unwrap().is_empty());
    }

    #[test]
    fn persist_overwrites_the_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonResultSink::new(dir.path().join("updates/updated_discounts.json"));

        sink.write(&[rec("A", 71.25), rec("B", 12.5)]).unwrap();
        assert_eq!(sink.read_last().unwrap().len(), 2);

        // A later, smaller run replaces the earlier content entirely.
        sink.write(&[rec("C", 40.0)]).unwrap();
        let last = sink.read_last().unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].product_id, "C");
    }

    #[test]
    fn garbage_content_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("updated_discounts.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(JsonResultSink::new(&path).read_last().is_err());
    }
}
