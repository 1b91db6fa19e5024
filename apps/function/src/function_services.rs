use std::sync::Arc;

use ppecheck_application::{ComplianceNotifier, ComplianceRecordSink, InspectionService};
use ppecheck_core::{AppError, AppResult};
use ppecheck_infrastructure::{
    AccessTokenProvider, BigQueryComplianceSink, ConsoleComplianceNotifier, GcsObjectFetcher,
    InMemoryComplianceSink, MetadataServerAccessTokenProvider, PostgresComplianceSink,
    StaticAccessTokenProvider, VertexAiConfig, VertexGeminiVisionAnalyzer,
    WebhookComplianceNotifier,
};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::function_config::{FunctionConfig, NotificationProvider, PersistenceBackend};

/// Wires the configured adapters into the inspection service.
pub async fn build_inspection_service(config: &FunctionConfig) -> AppResult<InspectionService> {
    let http_client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build http client: {error}")))?;

    let token_provider: Arc<dyn AccessTokenProvider> = match config.access_token.as_ref() {
        Some(token) => {
            info!("using access token from GCP_ACCESS_TOKEN");
            Arc::new(StaticAccessTokenProvider::new(token.clone()))
        }
        None => Arc::new(MetadataServerAccessTokenProvider::new(http_client.clone())),
    };

    let fetcher = Arc::new(GcsObjectFetcher::new(
        http_client.clone(),
        config.storage_base_url.clone(),
        token_provider.clone(),
    ));

    let mut vertex_config =
        VertexAiConfig::new(config.project_id.as_str(), config.vertex_location.as_str())?;
    if let Some(model) = config.vertex_model.as_ref() {
        vertex_config = vertex_config.with_model(model.as_str());
    }
    if let Some(base_url) = config.vertex_base_url.as_ref() {
        vertex_config = vertex_config.with_base_url(base_url.clone());
    }
    info!(
        model = vertex_config.model(),
        location = %config.vertex_location,
        "vision model configured"
    );
    let analyzer = Arc::new(VertexGeminiVisionAnalyzer::new(
        http_client.clone(),
        vertex_config,
        token_provider.clone(),
    ));

    let sink = build_sink(config, http_client.clone(), token_provider).await?;
    let notifier = build_notifier(config, http_client);

    Ok(InspectionService::new(
        fetcher,
        analyzer,
        sink,
        notifier,
        config.inspection.clone(),
    ))
}

async fn build_sink(
    config: &FunctionConfig,
    http_client: reqwest::Client,
    token_provider: Arc<dyn AccessTokenProvider>,
) -> AppResult<Arc<dyn ComplianceRecordSink>> {
    match &config.persistence {
        PersistenceBackend::BigQuery { table, base_url } => {
            info!(%table, "persistence backend: bigquery");
            Ok(Arc::new(BigQueryComplianceSink::new(
                http_client,
                base_url.clone(),
                table.clone(),
                token_provider,
            )))
        }
        PersistenceBackend::Postgres { database_url } => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to connect to database: {error}"))
                })?;

            sqlx::migrate!("../../crates/infrastructure/migrations")
                .run(&pool)
                .await
                .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

            info!("persistence backend: postgres");
            Ok(Arc::new(PostgresComplianceSink::new(pool)))
        }
        PersistenceBackend::Memory => {
            info!("persistence backend: memory, records are lost on restart");
            Ok(Arc::new(InMemoryComplianceSink::new()))
        }
    }
}

fn build_notifier(
    config: &FunctionConfig,
    http_client: reqwest::Client,
) -> Arc<dyn ComplianceNotifier> {
    match &config.notification {
        NotificationProvider::Webhook { url } => {
            info!(configured = url.is_some(), "notification provider: webhook");
            Arc::new(WebhookComplianceNotifier::new(http_client, url.clone()))
        }
        NotificationProvider::Console => {
            info!("notification provider: console");
            Arc::new(ConsoleComplianceNotifier::new())
        }
    }
}
