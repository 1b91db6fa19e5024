use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use ppecheck_application::ComplianceRecordSink;
use ppecheck_core::{AppError, AppResult};
use ppecheck_domain::ComplianceRecord;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::AccessTokenProvider;
use crate::compliance_row::compliance_row;

/// Public BigQuery REST API endpoint.
pub const DEFAULT_BIGQUERY_BASE_URL: &str = "https://bigquery.googleapis.com";

/// Fully qualified BigQuery table identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigQueryTableRef {
    project_id: String,
    dataset_id: String,
    table_id: String,
}

impl BigQueryTableRef {
    /// Creates a table reference from its parts.
    pub fn new(
        project_id: impl Into<String>,
        dataset_id: impl Into<String>,
        table_id: impl Into<String>,
    ) -> AppResult<Self> {
        let table = Self {
            project_id: project_id.into(),
            dataset_id: dataset_id.into(),
            table_id: table_id.into(),
        };

        if [&table.project_id, &table.dataset_id, &table.table_id]
            .iter()
            .any(|part| part.trim().is_empty())
        {
            return Err(AppError::Validation(format!(
                "bigquery table '{table}' must name a project, dataset and table"
            )));
        }

        Ok(table)
    }

    /// Returns the project id.
    #[must_use]
    pub fn project_id(&self) -> &str {
        self.project_id.as_str()
    }

    /// Returns the dataset id.
    #[must_use]
    pub fn dataset_id(&self) -> &str {
        self.dataset_id.as_str()
    }

    /// Returns the table id.
    #[must_use]
    pub fn table_id(&self) -> &str {
        self.table_id.as_str()
    }
}

impl FromStr for BigQueryTableRef {
    type Err = AppError;

    /// Accepts `project.dataset.table` and the legacy `project:dataset.table`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        let (project_id, rest) = value
            .split_once(':')
            .or_else(|| value.split_once('.'))
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "bigquery table '{value}' must have the form project.dataset.table"
                ))
            })?;
        let (dataset_id, table_id) = rest.split_once('.').ok_or_else(|| {
            AppError::Validation(format!(
                "bigquery table '{value}' must have the form project.dataset.table"
            ))
        })?;

        if table_id.contains('.') {
            return Err(AppError::Validation(format!(
                "bigquery table '{value}' has too many components"
            )));
        }

        Self::new(project_id, dataset_id, table_id)
    }
}

impl fmt::Display for BigQueryTableRef {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "{}.{}.{}",
            self.project_id, self.dataset_id, self.table_id
        )
    }
}

#[derive(Debug, Serialize)]
struct InsertAllRequest {
    rows: Vec<InsertAllRow>,
}

#[derive(Debug, Serialize)]
struct InsertAllRow {
    json: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertAllResponse {
    #[serde(default)]
    insert_errors: Vec<Value>,
}

/// BigQuery streaming-insert implementation of the record sink port.
pub struct BigQueryComplianceSink {
    http_client: reqwest::Client,
    base_url: Url,
    table: BigQueryTableRef,
    token_provider: Arc<dyn AccessTokenProvider>,
}

impl BigQueryComplianceSink {
    /// Creates a sink appending to the given table.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        base_url: Url,
        table: BigQueryTableRef,
        token_provider: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        Self {
            http_client,
            base_url,
            table,
            token_provider,
        }
    }

    fn insert_all_url(&self) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                AppError::Validation(format!(
                    "bigquery base url '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend([
                "bigquery",
                "v2",
                "projects",
                self.table.project_id(),
                "datasets",
                self.table.dataset_id(),
                "tables",
                self.table.table_id(),
                "insertAll",
            ]);

        Ok(url)
    }
}

#[async_trait]
impl ComplianceRecordSink for BigQueryComplianceSink {
    async fn append(&self, record: &ComplianceRecord) -> AppResult<()> {
        let url = self.insert_all_url()?;
        let token = self.token_provider.access_token().await?;
        let payload = InsertAllRequest {
            rows: vec![InsertAllRow {
                json: compliance_row(record),
            }],
        };

        let response = self
            .http_client
            .post(url)
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                AppError::Unavailable(format!(
                    "failed to call bigquery insertAll for {}: {error}",
                    self.table
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_owned());
            return Err(AppError::Unavailable(format!(
                "bigquery insertAll for {} returned status {}: {body}",
                self.table,
                status.as_u16()
            )));
        }

        let result = response
            .json::<InsertAllResponse>()
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to parse bigquery insertAll response: {error}"
                ))
            })?;

        if !result.insert_errors.is_empty() {
            return Err(AppError::Internal(format!(
                "bigquery rejected row for '{}': {}",
                record.file_name(),
                Value::Array(result.insert_errors)
            )));
        }

        debug!(table = %self.table, "compliance row streamed to bigquery");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mockito::Matcher;
    use ppecheck_application::ComplianceRecordSink;
    use ppecheck_core::AppError;
    use ppecheck_domain::{ComplianceRecord, ComplianceVerdicts, Verdict};
    use serde_json::json;
    use url::Url;

    use super::{BigQueryComplianceSink, BigQueryTableRef};
    use crate::StaticAccessTokenProvider;

    const ENDPOINT: &str = "/bigquery/v2/projects/sharelabai-hackathon/datasets/safety/tables/analysis_results/insertAll";

    fn sink(base_url: &str) -> BigQueryComplianceSink {
        let Ok(base_url) = Url::parse(base_url) else {
            panic!("mock server url should parse");
        };
        let Ok(table) = "sharelabai-hackathon.safety.analysis_results".parse::<BigQueryTableRef>()
        else {
            panic!("table reference should parse");
        };

        BigQueryComplianceSink::new(
            reqwest::Client::new(),
            base_url,
            table,
            Arc::new(StaticAccessTokenProvider::new("bq-token")),
        )
    }

    fn record() -> ComplianceRecord {
        let record = ComplianceRecord::new(
            "uploads/captured_photo.jpg",
            ComplianceVerdicts {
                helmet: Verdict::Yes,
                hair: Verdict::Yes,
                work_clothes: Verdict::No,
                safety_vest: Verdict::Yes,
            },
        );
        let Ok(record) = record else {
            panic!("record should be valid");
        };
        record
    }

    #[test]
    fn table_reference_accepts_dotted_and_legacy_forms() {
        let dotted = "p.d.t".parse::<BigQueryTableRef>();
        let legacy = "p:d.t".parse::<BigQueryTableRef>();

        assert_eq!(dotted.as_ref().ok(), legacy.as_ref().ok());
        assert_eq!(
            dotted.map(|table| table.to_string()).ok().as_deref(),
            Some("p.d.t")
        );
    }

    #[test]
    fn table_reference_rejects_incomplete_names() {
        for invalid in ["", "project", "project.dataset", "p.d.t.x", "p..t"] {
            assert!(
                matches!(
                    invalid.parse::<BigQueryTableRef>(),
                    Err(AppError::Validation(_))
                ),
                "'{invalid}' should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn append_streams_one_row() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", ENDPOINT)
            .match_header("authorization", "Bearer bq-token")
            .match_body(Matcher::Json(json!({
                "rows": [{
                    "json": {
                        "file_name": "uploads/captured_photo.jpg",
                        "helmet": "YES",
                        "hair": "YES",
                        "work_clothes": "NO",
                        "safety_vest": "YES"
                    }
                }]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"kind":"bigquery#tableDataInsertAllResponse"}"#)
            .create_async()
            .await;

        let result = sink(&server.url()).append(&record()).await;

        mock.assert_async().await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn insert_errors_fail_the_append() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", ENDPOINT)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "insertErrors": [{
                        "index": 0,
                        "errors": [{ "reason": "invalid", "message": "no such field: helmet" }]
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let result = sink(&server.url()).append(&record()).await;

        assert!(matches!(
            result,
            Err(AppError::Internal(message)) if message.contains("no such field")
        ));
    }

    #[tokio::test]
    async fn missing_table_is_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", ENDPOINT)
            .with_status(404)
            .with_body(r#"{"error":{"code":404,"message":"Not found: Table"}}"#)
            .create_async()
            .await;

        let result = sink(&server.url()).append(&record()).await;

        assert!(matches!(result, Err(AppError::Unavailable(_))));
    }
}
