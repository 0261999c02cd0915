use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default number of archives processed concurrently.
pub const DEFAULT_WORKER_COUNT: usize = 3;
/// Default number of records submitted per bulk request.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the PubMed indexer.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Hostname of the OpenSearch cluster.
    pub opensearch_host: String,
    /// Port of the OpenSearch HTTP endpoint.
    pub opensearch_port: u16,
    /// Whether requests use `https`.
    pub opensearch_use_tls: bool,
    /// Basic-auth username; credentials are skipped when empty.
    pub opensearch_username: String,
    /// Basic-auth password.
    pub opensearch_password: String,
    /// Whether the server certificate is verified.
    pub opensearch_verify_certs: bool,
    /// Optional per-request timeout in seconds. `None` leaves requests unbounded.
    pub opensearch_timeout_secs: Option<u64>,
    /// Index receiving the PubMed documents.
    pub index_name: String,
    /// Directory scanned for `*.xml.gz` archives.
    pub source_dir: PathBuf,
    /// Directory that successfully indexed archives are moved into.
    pub processed_dir: PathBuf,
    /// Size of the concurrent worker pool.
    pub worker_count: usize,
    /// Number of records per bulk request.
    pub batch_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            opensearch_host: "localhost".into(),
            opensearch_port: 9200,
            opensearch_use_tls: true,
            opensearch_username: String::new(),
            opensearch_password: String::new(),
            opensearch_verify_certs: false,
            opensearch_timeout_secs: None,
            index_name: "pubmed".into(),
            source_dir: PathBuf::from("./pubmed_update/"),
            processed_dir: PathBuf::from("./pubmed_update/processed"),
            worker_count: DEFAULT_WORKER_COUNT,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults for unset keys.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            opensearch_host: load_env_optional("OPENSEARCH_HOST")
                .unwrap_or(defaults.opensearch_host),
            opensearch_port: parse_optional("OPENSEARCH_PORT")?
                .unwrap_or(defaults.opensearch_port),
            opensearch_use_tls: parse_bool_optional("OPENSEARCH_USE_TLS")?
                .unwrap_or(defaults.opensearch_use_tls),
            opensearch_username: env::var("OPENSEARCH_USERNAME").unwrap_or_default(),
            opensearch_password: env::var("OPENSEARCH_PASSWORD").unwrap_or_default(),
            opensearch_verify_certs: parse_bool_optional("OPENSEARCH_VERIFY_CERTS")?
                .unwrap_or(defaults.opensearch_verify_certs),
            opensearch_timeout_secs: parse_optional("OPENSEARCH_TIMEOUT_SECS")?,
            index_name: load_env_optional("PUBMED_INDEX_NAME").unwrap_or(defaults.index_name),
            source_dir: load_env_optional("PUBMED_SOURCE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.source_dir),
            processed_dir: load_env_optional("PUBMED_PROCESSED_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.processed_dir),
            worker_count: parse_optional("INDEXER_WORKERS")?.unwrap_or(defaults.worker_count),
            batch_size: parse_optional("INDEXER_BATCH_SIZE")?.unwrap_or(defaults.batch_size),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would stall or break the pipeline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 {
            return Err(ConfigError::InvalidValue("INDEXER_WORKERS".into()));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidValue("INDEXER_BATCH_SIZE".into()));
        }
        if self.index_name.trim().is_empty() {
            return Err(ConfigError::MissingVariable("PUBMED_INDEX_NAME".into()));
        }
        Ok(())
    }

    /// Base URL of the OpenSearch endpoint derived from host, port, and scheme.
    pub fn opensearch_url(&self) -> String {
        let scheme = if self.opensearch_use_tls {
            "https"
        } else {
            "http"
        };
        format!(
            "{scheme}://{}:{}",
            self.opensearch_host, self.opensearch_port
        )
    }

    /// Per-request timeout, if one was configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.opensearch_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_optional<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

fn parse_bool_optional(key: &str) -> Result<Option<bool>, ConfigError> {
    load_env_optional(key)
        .map(|value| match value.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue(key.to_string())),
        })
        .transpose()
}
