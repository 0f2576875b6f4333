//! [`SearchService`] over the Elasticsearch REST API.
//!
//! - `GET /{index}/_mapping`
//! - `GET /{index}/_doc/{id}`
//! - `POST /{index}/_analyze`
//!
//! The same endpoints exist on OpenSearch.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Certificate, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::{XrayConfig, DEFAULT_TIMEOUT_SECS};
use crate::error::{Error, Result, ServiceError};
use crate::service::{AnalyzeRequest, SearchService};

/// Connection settings for [`EsClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Root CA certificate (PEM) to trust. When set, certificate
    /// verification is relaxed so self-signed clusters are reachable.
    pub ca: Option<PathBuf>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            ca: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientOptions {
    /// Take CA path and timeout from a loaded config.
    #[must_use]
    pub fn from_config(config: &XrayConfig) -> Self {
        Self {
            ca: config.ca.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// HTTP client for one cluster.
#[derive(Debug, Clone)]
pub struct EsClient {
    http: reqwest::Client,
    base_url: Url,
}

impl EsClient {
    /// Create a client for `cluster` with default options.
    ///
    /// # Errors
    ///
    /// Returns an error if `cluster` is not a usable base URL or the HTTP
    /// client cannot be built.
    pub fn new(cluster: &str) -> Result<Self> {
        Self::with_options(cluster, &ClientOptions::default())
    }

    /// Create a client for `cluster`.
    ///
    /// # Errors
    ///
    /// Returns an error if `cluster` is not a usable base URL, the CA file
    /// cannot be read or parsed, or the HTTP client cannot be built.
    pub fn with_options(cluster: &str, options: &ClientOptions) -> Result<Self> {
        let base_url = Url::parse(cluster).map_err(|e| Error::InvalidCluster {
            url: cluster.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidCluster {
                url: cluster.to_string(),
                reason: "not a hierarchical URL".to_string(),
            });
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(format!("elastixray/{}", env!("CARGO_PKG_VERSION")))
            .timeout(options.timeout);

        if let Some(path) = &options.ca {
            let pem = std::fs::read(path)?;
            let cert = Certificate::from_pem(&pem).map_err(|source| Error::Certificate {
                path: path.clone(),
                source,
            })?;
            builder = builder
                .add_root_certificate(cert)
                .danger_accept_invalid_certs(true);
        }

        let http = builder.build().map_err(Error::Client)?;
        Ok(Self { http, base_url })
    }

    /// Base URL of the cluster.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `{base}/{segments...}`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send a request and decode a successful JSON body.
    ///
    /// `what` names the looked-up resource in [`ServiceError::NotFound`].
    async fn send(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> std::result::Result<Value, ServiceError> {
        let response = request.send().await?;
        let status = response.status();
        debug!(%status, url = %response.url(), "search service responded");

        if status.is_success() {
            return response.json().await.map_err(|e| ServiceError::Decode {
                reason: e.to_string(),
            });
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, &body, what))
    }
}

/// Map a non-success response to a [`ServiceError`].
fn status_error(status: StatusCode, body: &str, what: &str) -> ServiceError {
    let reason = error_reason(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    });

    match status {
        StatusCode::NOT_FOUND => ServiceError::NotFound {
            what: format!("{what} ({reason})"),
        },
        StatusCode::BAD_REQUEST => ServiceError::InvalidConfig { reason },
        _ => ServiceError::Status {
            status: status.as_u16(),
            reason,
        },
    }
}

/// Extract `error.reason` (or a plain string `error`) from an error body.
fn error_reason(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("error")? {
        Value::String(reason) => Some(reason.clone()),
        error => error
            .get("reason")
            .and_then(Value::as_str)
            .map(ToString::to_string),
    }
}

#[derive(Deserialize)]
struct GetResponse {
    #[serde(default)]
    found: Option<bool>,
    #[serde(rename = "_source")]
    source: Option<Value>,
}

#[derive(Deserialize)]
struct AnalyzeResponse {
    tokens: Vec<AnalyzeToken>,
}

#[derive(Deserialize)]
struct AnalyzeToken {
    token: String,
}

#[async_trait]
impl SearchService for EsClient {
    async fn get_mapping(&self, index: &str) -> std::result::Result<Value, ServiceError> {
        let what = format!("index '{index}'");
        let url = self.endpoint(&[index, "_mapping"]);
        let body = self.send(self.http.get(url), &what).await?;

        let Value::Object(indices) = body else {
            return Err(ServiceError::Decode {
                reason: "mapping response is not an object".to_string(),
            });
        };

        // Keyed by concrete index name; an alias resolves to a single other key.
        let entry = match indices.get(index) {
            Some(entry) => entry,
            None if indices.len() == 1 => indices.values().next().unwrap_or(&Value::Null),
            None => return Err(ServiceError::NotFound { what }),
        };

        Ok(entry
            .pointer("/mappings/properties")
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new())))
    }

    async fn get_document(
        &self,
        index: &str,
        id: &str,
    ) -> std::result::Result<Value, ServiceError> {
        let what = format!("document '{id}' in index '{index}'");
        let url = self.endpoint(&[index, "_doc", id]);
        let body = self.send(self.http.get(url), &what).await?;

        let response: GetResponse =
            serde_json::from_value(body).map_err(|e| ServiceError::Decode {
                reason: e.to_string(),
            })?;

        if response.found == Some(false) {
            return Err(ServiceError::NotFound { what });
        }
        response.source.ok_or_else(|| ServiceError::Decode {
            reason: format!("{what} has no _source"),
        })
    }

    async fn analyze(
        &self,
        index: &str,
        request: &AnalyzeRequest,
    ) -> std::result::Result<Vec<String>, ServiceError> {
        let what = format!("index '{index}'");
        let url = self.endpoint(&[index, "_analyze"]);
        let body = self.send(self.http.post(url).json(request), &what).await?;

        let response: AnalyzeResponse =
            serde_json::from_value(body).map_err(|e| ServiceError::Decode {
                reason: e.to_string(),
            })?;

        Ok(response.tokens.into_iter().map(|t| t.token).collect())
    }
}
