//! Typed errors for the `elastixray` library API.
//!
//! Library consumers can match on specific variants. The CLI (`main.rs`)
//! converts these to `anyhow::Error` at the binary boundary for richer
//! context messages.

use std::path::PathBuf;

use elastixray_core::AnalysisKind;

/// Errors produced by `elastixray` library operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The index mapping could not be retrieved. Fatal to the run.
    #[error("failed to retrieve the mapping for index '{index}'")]
    SchemaFetch {
        /// Index whose mapping was requested.
        index: String,
        /// What the search service reported.
        source: ServiceError,
    },

    /// The sample document could not be retrieved. Fatal to the run.
    #[error("failed to retrieve document '{id}' from index '{index}'")]
    DocumentFetch {
        /// Index the document was requested from.
        index: String,
        /// Requested document ID.
        id: String,
        /// What the search service reported.
        source: ServiceError,
    },

    /// A required startup parameter is missing.
    #[error("no {parameter} given; {hint}")]
    Config {
        /// Name of the missing parameter.
        parameter: &'static str,
        /// How to supply it.
        hint: &'static str,
    },

    /// The cluster URL cannot be used as a base for API paths.
    #[error("invalid cluster URL '{url}': {reason}")]
    InvalidCluster {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The root CA certificate could not be loaded.
    #[error("failed to load CA certificate from {}", path.display())]
    Certificate {
        /// Certificate file path.
        path: PathBuf,
        /// Underlying TLS error.
        source: reqwest::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    /// File I/O failure (reading config or certificate files).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML config parsing failure.
    #[error(transparent)]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON report serialization failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Failure reported by the search service for a single operation.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ServiceError {
    /// The index or document does not exist.
    #[error("not found: {what}")]
    NotFound {
        /// What was looked up.
        what: String,
    },

    /// The request named an analyzer or normalizer the index does not know.
    #[error("invalid analysis configuration: {reason}")]
    InvalidConfig {
        /// Reason given by the engine.
        reason: String,
    },

    /// The request never got a response.
    #[error("search service unavailable: {0}")]
    Transport(#[from] reqwest::Error),

    /// The engine answered with an unexpected HTTP status.
    #[error("search service returned HTTP {status}: {reason}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Reason given by the engine, or the status text.
        reason: String,
    },

    /// The response body did not have the expected shape.
    #[error("unexpected response from search service: {reason}")]
    Decode {
        /// What was wrong with the body.
        reason: String,
    },

    /// The task names a field missing from the field map; no call was made.
    #[error("no field '{field}' to record tokens on")]
    UnknownField {
        /// Dotted name the task targeted.
        field: String,
    },
}

/// A single analyze call that failed. Local to its task; the run goes on.
#[derive(Debug, thiserror::Error)]
#[error("failed to run {kind} '{analyzer}' on field '{field}'")]
pub struct AnalyzeError {
    /// Dotted name of the field being analyzed.
    pub field: String,
    /// Which of the field's analyzers was requested.
    pub kind: AnalysisKind,
    /// Analyzer or normalizer name.
    pub analyzer: String,
    /// What the search service reported.
    pub source: ServiceError,
}

/// Convenience alias used throughout the library's public API.
pub type Result<T> = std::result::Result<T, Error>;
