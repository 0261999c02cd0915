//! HTTP client wrapper for interacting with OpenSearch.

use crate::config::Config;
use crate::opensearch::{
    payload::{build_bulk_body, index_definition},
    types::{BulkResponse, IndexSummary, OpenSearchError},
};
use crate::pubmed::PubmedRecord;
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, header};
use serde_json::Value;

/// Index operations the ingestion pipeline depends on.
///
/// [`OpenSearchService`] is the production implementation; tests substitute in-memory doubles.
#[async_trait]
pub trait DocumentIndex: Send + Sync {
    /// Create the index when it is missing. Returns `true` when it was created by this call.
    async fn ensure_index(&self, index: &str) -> Result<bool, OpenSearchError>;

    /// Write `records` in one bulk request, keyed by PMID.
    async fn bulk_index(
        &self,
        index: &str,
        records: &[PubmedRecord],
    ) -> Result<IndexSummary, OpenSearchError>;
}

/// Lightweight HTTP client for OpenSearch operations.
pub struct OpenSearchService {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) credentials: Option<(String, String)>,
}

impl OpenSearchService {
    /// Construct a client from the endpoint, credential, and TLS settings in `config`.
    pub fn new(config: &Config) -> Result<Self, OpenSearchError> {
        let mut builder = Client::builder()
            .user_agent(concat!("pubmed-indexer/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(!config.opensearch_verify_certs);
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let base_url =
            normalize_base_url(&config.opensearch_url()).map_err(OpenSearchError::InvalidUrl)?;
        let credentials = (!config.opensearch_username.is_empty()).then(|| {
            (
                config.opensearch_username.clone(),
                config.opensearch_password.clone(),
            )
        });
        tracing::debug!(
            url = %base_url,
            has_credentials = credentials.is_some(),
            verify_certs = config.opensearch_verify_certs,
            timeout = ?config.request_timeout(),
            "Initialized OpenSearch HTTP client"
        );

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    /// Check whether an index exists.
    pub async fn index_exists(&self, index: &str) -> Result<bool, OpenSearchError> {
        let response = self.request(Method::HEAD, index).send().await?;

        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => {
                let body = response.text().await.unwrap_or_default();
                let error = OpenSearchError::UnexpectedStatus { status, body };
                tracing::error!(index, error = %error, "Index existence check failed");
                Err(error)
            }
        }
    }

    /// Create an index with the PubMed settings and mappings.
    pub async fn create_index(&self, index: &str) -> Result<Value, OpenSearchError> {
        let response = self
            .request(Method::PUT, index)
            .json(&index_definition())
            .send()
            .await?;

        let response = self.ensure_success(response).await?;
        let acknowledgement: Value = response.json().await?;
        tracing::info!(index, response = %acknowledgement, "Index created");
        Ok(acknowledgement)
    }

    /// Create the index only when it is missing.
    pub async fn create_index_if_not_exists(&self, index: &str) -> Result<bool, OpenSearchError> {
        if self.index_exists(index).await? {
            tracing::debug!(index, "Index already exists");
            return Ok(false);
        }
        self.create_index(index).await?;
        Ok(true)
    }

    /// Submit records through the `_bulk` endpoint.
    pub async fn bulk(
        &self,
        index: &str,
        records: &[PubmedRecord],
    ) -> Result<IndexSummary, OpenSearchError> {
        if records.is_empty() {
            return Ok(IndexSummary::default());
        }

        let body = build_bulk_body(index, records)?;
        let response = self
            .request(Method::POST, "_bulk")
            .header(header::CONTENT_TYPE, "application/x-ndjson")
            .body(body)
            .send()
            .await?;

        let response = self.ensure_success(response).await?;
        let payload: BulkResponse = response.json().await?;
        let summary = payload.into_summary()?;
        tracing::debug!(
            index,
            documents = records.len(),
            created = summary.created,
            updated = summary.updated,
            "Bulk request applied"
        );
        Ok(summary)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format_endpoint(&self.base_url, path);
        let req = self.client.request(method, url);
        match &self.credentials {
            Some((username, password)) => req.basic_auth(username, Some(password)),
            None => req,
        }
    }

    async fn ensure_success(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, OpenSearchError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = OpenSearchError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "OpenSearch request failed");
            Err(error)
        }
    }
}

#[async_trait]
impl DocumentIndex for OpenSearchService {
    async fn ensure_index(&self, index: &str) -> Result<bool, OpenSearchError> {
        self.create_index_if_not_exists(index).await
    }

    async fn bulk_index(
        &self,
        index: &str,
        records: &[PubmedRecord],
    ) -> Result<IndexSummary, OpenSearchError> {
        self.bulk(index, records).await
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
