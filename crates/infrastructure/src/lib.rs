//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod bigquery_compliance_sink;
mod compliance_row;
mod console_compliance_notifier;
mod gcp_access_token;
mod gcs_object_fetcher;
mod in_memory_compliance_sink;
mod postgres_compliance_sink;
mod vertex_gemini_vision_analyzer;
mod webhook_compliance_notifier;

pub use bigquery_compliance_sink::{
    BigQueryComplianceSink, BigQueryTableRef, DEFAULT_BIGQUERY_BASE_URL,
};
pub use console_compliance_notifier::ConsoleComplianceNotifier;
pub use gcp_access_token::{
    AccessTokenProvider, DEFAULT_METADATA_TOKEN_URL, MetadataServerAccessTokenProvider,
    StaticAccessTokenProvider,
};
pub use gcs_object_fetcher::{DEFAULT_STORAGE_BASE_URL, GcsObjectFetcher};
pub use in_memory_compliance_sink::InMemoryComplianceSink;
pub use postgres_compliance_sink::PostgresComplianceSink;
pub use vertex_gemini_vision_analyzer::{VertexAiConfig, VertexGeminiVisionAnalyzer};
pub use webhook_compliance_notifier::WebhookComplianceNotifier;
