use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use ppecheck_application::{GenerationSettings, InspectionSettings};
use ppecheck_core::{AppError, AppResult};
use ppecheck_infrastructure::{
    BigQueryTableRef, DEFAULT_BIGQUERY_BASE_URL, DEFAULT_STORAGE_BASE_URL,
};
use url::Url;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_VERTEX_LOCATION: &str = "us-central1";
const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 60;

/// Where compliance records are appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceBackend {
    /// BigQuery streaming inserts.
    BigQuery {
        /// Target table.
        table: BigQueryTableRef,
        /// REST API base URL.
        base_url: Url,
    },
    /// PostgreSQL `compliance_records` table.
    Postgres {
        /// Connection string.
        database_url: String,
    },
    /// Process-local list, lost on restart.
    Memory,
}

/// How compliance alerts are delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationProvider {
    /// Chat incoming webhook; deliveries are skipped without a URL.
    Webhook {
        /// Webhook endpoint.
        url: Option<Url>,
    },
    /// Log output only.
    Console,
}

/// Deployment configuration read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionConfig {
    pub host: IpAddr,
    pub port: u16,
    pub project_id: String,
    pub vertex_location: String,
    pub vertex_model: Option<String>,
    pub vertex_base_url: Option<Url>,
    pub storage_base_url: Url,
    pub access_token: Option<String>,
    pub persistence: PersistenceBackend,
    pub notification: NotificationProvider,
    pub http_timeout: Duration,
    pub inspection: InspectionSettings,
}

impl FunctionConfig {
    /// Reads the configuration from process environment variables.
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let vars = EnvVars { lookup };

        let host = vars.parse_or("FUNCTION_HOST", || Ok(IpAddr::V4(Ipv4Addr::UNSPECIFIED)))?;
        let port = vars.parse_or("PORT", || Ok(DEFAULT_PORT))?;
        let project_id = vars.required_non_empty("GCP_PROJECT_ID")?;
        let vertex_location = vars
            .optional("VERTEX_LOCATION")
            .unwrap_or_else(|| DEFAULT_VERTEX_LOCATION.to_owned());
        let vertex_model = vars.optional("VERTEX_MODEL");
        let vertex_base_url = vars.optional_url("VERTEX_BASE_URL")?;
        let storage_base_url = vars
            .optional_url("STORAGE_BASE_URL")?
            .map_or_else(|| default_url(DEFAULT_STORAGE_BASE_URL), Ok)?;
        let access_token = vars.optional("GCP_ACCESS_TOKEN");

        let persistence = match vars
            .optional("PERSISTENCE_BACKEND")
            .unwrap_or_else(|| "bigquery".to_owned())
            .to_ascii_lowercase()
            .as_str()
        {
            "bigquery" => PersistenceBackend::BigQuery {
                table: vars.required_non_empty("BIGQUERY_TABLE")?.parse()?,
                base_url: vars
                    .optional_url("BIGQUERY_BASE_URL")?
                    .map_or_else(|| default_url(DEFAULT_BIGQUERY_BASE_URL), Ok)?,
            },
            "postgres" => PersistenceBackend::Postgres {
                database_url: vars.required_non_empty("DATABASE_URL")?,
            },
            "memory" => PersistenceBackend::Memory,
            other => {
                return Err(AppError::Validation(format!(
                    "PERSISTENCE_BACKEND must be one of bigquery, postgres, memory, got '{other}'"
                )));
            }
        };

        let notification = match vars
            .optional("NOTIFICATION_PROVIDER")
            .unwrap_or_else(|| "webhook".to_owned())
            .to_ascii_lowercase()
            .as_str()
        {
            "webhook" => NotificationProvider::Webhook {
                url: vars.optional_url("SLACK_WEBHOOK_URL")?,
            },
            "console" => NotificationProvider::Console,
            other => {
                return Err(AppError::Validation(format!(
                    "NOTIFICATION_PROVIDER must be one of webhook, console, got '{other}'"
                )));
            }
        };

        let http_timeout = Duration::from_secs(
            vars.parse_or("HTTP_TIMEOUT_SECONDS", || Ok(DEFAULT_HTTP_TIMEOUT_SECONDS))?,
        );
        if http_timeout.is_zero() {
            return Err(AppError::Validation(
                "HTTP_TIMEOUT_SECONDS must be greater than zero".to_owned(),
            ));
        }

        let generation = GenerationSettings::new(
            vars.parse_or("MODEL_MAX_OUTPUT_TOKENS", || {
                Ok(GenerationSettings::DEFAULT_MAX_OUTPUT_TOKENS)
            })?,
            vars.parse_or("MODEL_TEMPERATURE", || {
                Ok(GenerationSettings::DEFAULT_TEMPERATURE)
            })?,
        )?;
        let scratch_root = vars
            .optional("SCRATCH_DIR")
            .map_or_else(env::temp_dir, PathBuf::from);

        Ok(Self {
            host,
            port,
            project_id,
            vertex_location,
            vertex_model,
            vertex_base_url,
            storage_base_url,
            access_token,
            persistence,
            notification,
            http_timeout,
            inspection: InspectionSettings::new(scratch_root).with_generation(generation),
        })
    }
}

struct EnvVars<F> {
    lookup: F,
}

impl<F> EnvVars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|value| !value.trim().is_empty())
    }

    fn required_non_empty(&self, name: &str) -> AppResult<String> {
        self.optional(name)
            .ok_or_else(|| AppError::Validation(format!("{name} is required")))
    }

    fn optional_url(&self, name: &str) -> AppResult<Option<Url>> {
        self.optional(name)
            .map(|value| {
                Url::parse(value.as_str()).map_err(|error| {
                    AppError::Validation(format!("invalid {name} value '{value}': {error}"))
                })
            })
            .transpose()
    }

    fn parse_or<T>(&self, name: &str, default: impl FnOnce() -> AppResult<T>) -> AppResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(name) {
            Some(value) => value.trim().parse::<T>().map_err(|error| {
                AppError::Validation(format!("invalid {name} value '{value}': {error}"))
            }),
            None => default(),
        }
    }
}

fn default_url(value: &str) -> AppResult<Url> {
    Url::parse(value)
        .map_err(|error| AppError::Internal(format!("invalid built-in url '{value}': {error}")))
}
