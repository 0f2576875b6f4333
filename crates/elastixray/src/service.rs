//! The search-index service seam: the three remote operations the pipeline
//! needs from a cluster.

use async_trait::async_trait;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use elastixray_core::{AnalysisKind, InputText};

use crate::error::ServiceError;

/// Remote operations against an index.
///
/// [`EsClient`](crate::EsClient) talks to a real cluster over HTTP; tests
/// substitute in-memory fakes.
#[async_trait]
pub trait SearchService: Send + Sync {
    /// Fetch the field definitions of `index` (the `mappings.properties` tree).
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] if the index does not exist, or any
    /// transport/decoding failure.
    async fn get_mapping(&self, index: &str) -> Result<Value, ServiceError>;

    /// Fetch the stored `_source` of document `id` in `index`.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] if the document does not exist, or any
    /// transport/decoding failure.
    async fn get_document(&self, index: &str, id: &str) -> Result<Value, ServiceError>;

    /// Run one analyzer or normalizer over literal text.
    ///
    /// Returns token strings in emission order.
    ///
    /// # Errors
    ///
    /// [`ServiceError::InvalidConfig`] if the analyzer is unknown, or any
    /// transport/decoding failure.
    async fn analyze(&self, index: &str, request: &AnalyzeRequest)
        -> Result<Vec<String>, ServiceError>;
}

/// Body of an `_analyze` call.
///
/// Serializes to `{"text": ..., "analyzer": name}`, or `"normalizer"` for
/// [`AnalysisKind::Normalize`]. The API has no search-analyzer parameter:
/// a search analyzer is exercised by name through `analyzer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeRequest {
    /// Text to analyze.
    pub text: InputText,
    /// Which analyzer of the field this exercises.
    pub kind: AnalysisKind,
    /// Analyzer or normalizer name.
    pub analyzer: String,
}

impl AnalyzeRequest {
    /// Request parameter that carries the analyzer name.
    #[must_use]
    pub const fn parameter(&self) -> &'static str {
        match self.kind {
            AnalysisKind::Index | AnalysisKind::Search => "analyzer",
            AnalysisKind::Normalize => "normalizer",
        }
    }
}

impl Serialize for AnalyzeRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("text", &self.text)?;
        map.serialize_entry(self.parameter(), &self.analyzer)?;
        map.end()
    }
}
