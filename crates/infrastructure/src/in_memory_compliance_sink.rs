use async_trait::async_trait;
use ppecheck_application::ComplianceRecordSink;
use ppecheck_core::AppResult;
use ppecheck_domain::ComplianceRecord;
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory compliance table for local development and tests.
#[derive(Debug, Default)]
pub struct InMemoryComplianceSink {
    records: RwLock<Vec<ComplianceRecord>>,
}

impl InMemoryComplianceSink {
    /// Creates an empty in-memory table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all appended records in insertion order.
    pub async fn records(&self) -> Vec<ComplianceRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl ComplianceRecordSink for InMemoryComplianceSink {
    async fn append(&self, record: &ComplianceRecord) -> AppResult<()> {
        let mut records = self.records.write().await;
        records.push(record.clone());
        debug!(
            file_name = record.file_name(),
            rows = records.len(),
            "compliance record appended in memory"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ppecheck_application::ComplianceRecordSink;
    use ppecheck_domain::{ComplianceRecord, ComplianceVerdicts};

    use super::InMemoryComplianceSink;

    #[tokio::test]
    async fn append_keeps_duplicates_in_order() {
        let sink = InMemoryComplianceSink::new();
        let Ok(record) =
            ComplianceRecord::new("uploads/photo.jpg", ComplianceVerdicts::all_uncertain())
        else {
            panic!("record should be valid");
        };

        assert!(sink.append(&record).await.is_ok());
        assert!(sink.append(&record).await.is_ok());

        let records = sink.records().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], records[1]);
    }
}
