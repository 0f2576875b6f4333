//! Executes the analysis queue against the search service.

use futures::future;
use futures::stream::{self, StreamExt};
use tracing::{debug, error};

use elastixray_core::{AnalysisTask, FieldMap, InputText, PLACEHOLDER_TEXT};

use crate::error::{AnalyzeError, ServiceError};
use crate::service::{AnalyzeRequest, SearchService};

/// Outcome of draining an analysis queue.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Tasks whose tokens were recorded.
    pub analyzed: usize,
    /// Tasks that failed, in completion order.
    pub failures: Vec<AnalyzeError>,
}

/// Runs analysis tasks and writes the tokens back onto field descriptors.
///
/// Calls go out at most `concurrency` at a time (one by default). A failing
/// call is logged and recorded in the [`RunSummary`]; it never stops the
/// remaining tasks, and nothing is retried.
#[derive(Debug)]
pub struct AnalysisRunner<'a, S: ?Sized> {
    service: &'a S,
    index: &'a str,
    document_id: &'a str,
    placeholder: &'a str,
    concurrency: usize,
}

impl<'a, S: SearchService + ?Sized> AnalysisRunner<'a, S> {
    /// Create a sequential runner for `index`.
    #[must_use]
    pub fn new(service: &'a S, index: &'a str) -> Self {
        Self {
            service,
            index,
            document_id: "",
            placeholder: PLACEHOLDER_TEXT,
            concurrency: 1,
        }
    }

    /// Document the sample values came from, for error reports.
    #[must_use]
    pub fn document_id(mut self, id: &'a str) -> Self {
        self.document_id = id;
        self
    }

    /// Text analyzed when a task has no input.
    #[must_use]
    pub fn placeholder(mut self, text: &'a str) -> Self {
        self.placeholder = text;
        self
    }

    /// Maximum number of analyze calls in flight. Zero is treated as one.
    #[must_use]
    pub fn concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit.max(1);
        self
    }

    /// Drain `queue`, recording tokens on the matching entries of `fields`.
    ///
    /// Every task is executed exactly once and ends up either counted in
    /// [`RunSummary::analyzed`] or listed in [`RunSummary::failures`].
    /// Results are keyed by field and analysis kind, so completion order
    /// does not matter. Tasks for fields missing from `fields` fail without
    /// a remote call.
    pub async fn run(&self, queue: Vec<AnalysisTask>, fields: &mut FieldMap) -> RunSummary {
        let mut summary = RunSummary::default();

        let (queue, orphans): (Vec<_>, Vec<_>) = queue
            .into_iter()
            .partition(|task| fields.contains_key(&task.target_field));
        for task in orphans {
            let source = ServiceError::UnknownField {
                field: task.target_field.clone(),
            };
            self.record(task, Err(source), fields, &mut summary);
        }

        stream::iter(queue)
            .map(|task| async move {
                let result = self.analyze(&task).await;
                (task, result)
            })
            .buffer_unordered(self.concurrency)
            .for_each(|(task, result)| {
                self.record(task, result, fields, &mut summary);
                future::ready(())
            })
            .await;

        summary
    }

    async fn analyze(&self, task: &AnalysisTask) -> Result<Vec<String>, ServiceError> {
        let text = if task.input_text.is_blank() {
            InputText::new(self.placeholder)
        } else {
            task.input_text.clone()
        };

        let request = AnalyzeRequest {
            text,
            kind: task.kind,
            analyzer: task.analyzer_name.clone(),
        };

        debug!(
            field = %task.target_field,
            kind = %task.kind,
            analyzer = %task.analyzer_name,
            "analyzing",
        );
        self.service.analyze(self.index, &request).await
    }

    fn record(
        &self,
        task: AnalysisTask,
        result: Result<Vec<String>, ServiceError>,
        fields: &mut FieldMap,
        summary: &mut RunSummary,
    ) {
        let result = result.and_then(|tokens| match fields.get_mut(&task.target_field) {
            Some(field) => {
                field.tokens.set(task.kind, tokens);
                Ok(())
            }
            None => Err(ServiceError::UnknownField {
                field: task.target_field.clone(),
            }),
        });

        match result {
            Ok(()) => summary.analyzed += 1,
            Err(source) => {
                error!(
                    index = self.index,
                    id = self.document_id,
                    field = %task.target_field,
                    kind = %task.kind,
                    analyzer = %task.analyzer_name,
                    error = %source,
                    "analysis failed",
                );
                summary.failures.push(AnalyzeError {
                    field: task.target_field,
                    kind: task.kind,
                    analyzer: task.analyzer_name,
                    source,
                });
            }
        }
    }
}
