use async_trait::async_trait;
use ppecheck_core::AppResult;
use ppecheck_domain::ComplianceRecord;

/// Port for the append-only analytic table of compliance records.
///
/// Writes are at-least-once: a redelivered event appends a second row.
#[async_trait]
pub trait ComplianceRecordSink: Send + Sync {
    /// Appends one row for the record.
    async fn append(&self, record: &ComplianceRecord) -> AppResult<()>;
}
