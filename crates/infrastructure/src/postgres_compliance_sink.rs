use async_trait::async_trait;
use sqlx::PgPool;

use ppecheck_application::ComplianceRecordSink;
use ppecheck_core::{AppError, AppResult};
use ppecheck_domain::ComplianceRecord;

/// PostgreSQL-backed append-only compliance table.
#[derive(Clone)]
pub struct PostgresComplianceSink {
    pool: PgPool,
}

impl PostgresComplianceSink {
    /// Creates a sink with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ComplianceRecordSink for PostgresComplianceSink {
    async fn append(&self, record: &ComplianceRecord) -> AppResult<()> {
        let verdicts = record.verdicts();

        sqlx::query(
            r#"
            INSERT INTO compliance_records (
                file_name,
                helmet,
                hair,
                work_clothes,
                safety_vest
            )
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(record.file_name())
        .bind(verdicts.helmet.as_str())
        .bind(verdicts.hair.as_str())
        .bind(verdicts.work_clothes.as_str())
        .bind(verdicts.safety_vest.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to append compliance record for '{}': {error}",
                record.file_name()
            ))
        })?;

        Ok(())
    }
}
