//! The inspection run: fetch, discover, plan, analyze.
//!
//! Stages run strictly forward. A failed fetch ends the run with an error;
//! a failed analyze call only costs that one token list.

use std::fmt;

use tracing::{debug, info};

use elastixray_core::{build_pipeline, discover, FieldMap, PLACEHOLDER_TEXT};

use crate::config::XrayConfig;
use crate::error::{AnalyzeError, Error, Result};
use crate::runner::AnalysisRunner;
use crate::service::SearchService;

/// Steps of an inspection run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Retrieve the index mapping.
    FetchSchema,
    /// Retrieve the sample document.
    FetchDocument,
    /// Walk the mapping and collect analyzable fields.
    DiscoverFields,
    /// Turn fields into analysis tasks.
    BuildPipeline,
    /// Call the analyzer for every task.
    RunAnalysis,
    /// Hand the enriched fields to a reporter.
    Report,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FetchSchema => "fetch-schema",
            Self::FetchDocument => "fetch-document",
            Self::DiscoverFields => "discover-fields",
            Self::BuildPipeline => "build-pipeline",
            Self::RunAnalysis => "run-analysis",
            Self::Report => "report",
        })
    }
}

/// Tuning for the analysis stage.
///
/// # Example
///
/// ```
/// use elastixray::RunOptions;
///
/// let options = RunOptions::new()
///     .concurrency(4)
///     .placeholder_text("quick brown fox");
/// ```
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Maximum number of analyze calls in flight.
    concurrency: usize,

    /// Text analyzed when a field has no usable value.
    placeholder_text: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            placeholder_text: PLACEHOLDER_TEXT.to_string(),
        }
    }
}

impl RunOptions {
    /// Sequential analysis with the default placeholder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply settings from an [`XrayConfig`]. Builder methods called after
    /// this override config values.
    #[must_use]
    pub fn with_config(mut self, config: &XrayConfig) -> Self {
        self.concurrency = config.concurrency.max(1);
        self.placeholder_text.clone_from(&config.placeholder_text);
        self
    }

    /// Set the maximum number of analyze calls in flight (minimum one).
    #[must_use]
    pub fn concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit.max(1);
        self
    }

    /// Set the text analyzed when a field has no usable value.
    #[must_use]
    pub fn placeholder_text(mut self, text: &str) -> Self {
        self.placeholder_text = text.to_string();
        self
    }
}

/// Result of inspecting one document.
#[derive(Debug)]
pub struct Inspection {
    /// Inspected index.
    pub index: String,
    /// Inspected document ID.
    pub id: String,
    /// Analyzable fields with their sample values and tokens.
    pub fields: FieldMap,
    /// Analyze calls that failed.
    pub failures: Vec<AnalyzeError>,
}

/// Inspect document `id` of `index`.
///
/// Fetches the mapping and the document, discovers analyzable fields,
/// plans one analyze call per configured analyzer with a sample value, and
/// runs them. The returned [`Inspection`] is ready for reporting.
///
/// # Errors
///
/// Returns [`Error::SchemaFetch`] or [`Error::DocumentFetch`] when either
/// fetch fails. Analyze failures are not errors; they are collected in
/// [`Inspection::failures`].
pub async fn inspect<S: SearchService + ?Sized>(
    service: &S,
    index: &str,
    id: &str,
    options: &RunOptions,
) -> Result<Inspection> {
    enter(Stage::FetchSchema, index, id);
    let mapping = service
        .get_mapping(index)
        .await
        .map_err(|source| Error::SchemaFetch {
            index: index.to_string(),
            source,
        })?;

    enter(Stage::FetchDocument, index, id);
    let document = service
        .get_document(index, id)
        .await
        .map_err(|source| Error::DocumentFetch {
            index: index.to_string(),
            id: id.to_string(),
            source,
        })?;

    enter(Stage::DiscoverFields, index, id);
    let mut fields = discover(&mapping, &document);

    enter(Stage::BuildPipeline, index, id);
    let queue = build_pipeline(&fields);
    info!(
        fields = fields.len(),
        tasks = queue.len(),
        "analysis pipeline ready"
    );

    enter(Stage::RunAnalysis, index, id);
    let summary = AnalysisRunner::new(service, index)
        .document_id(id)
        .placeholder(&options.placeholder_text)
        .concurrency(options.concurrency)
        .run(queue, &mut fields)
        .await;
    info!(
        analyzed = summary.analyzed,
        failed = summary.failures.len(),
        "analysis finished"
    );

    enter(Stage::Report, index, id);
    Ok(Inspection {
        index: index.to_string(),
        id: id.to_string(),
        fields,
        failures: summary.failures,
    })
}

fn enter(stage: Stage, index: &str, id: &str) {
    debug!(%stage, index, id, "entering stage");
}
